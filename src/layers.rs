//! Toggleable map layers and paintable color roles.
//!
//! A lot's layer is derived from its zone type and wealth; terrain is a
//! layer of its own. Layer toggling in a UI maps to stable string keys
//! through [`MapObjectLayer::ui_key`], and grouped checkboxes are derived
//! on demand from the visible set via [`group_state`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lots::{Lot, ZoneType, ZoneWealth};

/// A category the user can show or hide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapObjectLayer {
    TerrainMap,
    ResidentialLowZone,
    ResidentialMidZone,
    ResidentialHighZone,
    CommercialLowZone,
    CommercialMidZone,
    CommercialHighZone,
    IndustrialLowZone,
    IndustrialMidZone,
    IndustrialHighZone,
    PloppedBuildingZone,
    MilitaryZone,
    AirportZone,
    SeaportZone,
    SpaceportZone,
}

/// Layer <-> UI identifier table. Both directions read from here.
const LAYER_UI_KEYS: [(MapObjectLayer, &str); 15] = [
    (MapObjectLayer::TerrainMap, "terrain"),
    (MapObjectLayer::ResidentialLowZone, "zones.residential.low"),
    (MapObjectLayer::ResidentialMidZone, "zones.residential.mid"),
    (MapObjectLayer::ResidentialHighZone, "zones.residential.high"),
    (MapObjectLayer::CommercialLowZone, "zones.commercial.low"),
    (MapObjectLayer::CommercialMidZone, "zones.commercial.mid"),
    (MapObjectLayer::CommercialHighZone, "zones.commercial.high"),
    (MapObjectLayer::IndustrialLowZone, "zones.industrial.low"),
    (MapObjectLayer::IndustrialMidZone, "zones.industrial.mid"),
    (MapObjectLayer::IndustrialHighZone, "zones.industrial.high"),
    (MapObjectLayer::PloppedBuildingZone, "zones.other.plopped"),
    (MapObjectLayer::MilitaryZone, "zones.other.military"),
    (MapObjectLayer::AirportZone, "zones.other.airport"),
    (MapObjectLayer::SeaportZone, "zones.other.seaport"),
    (MapObjectLayer::SpaceportZone, "zones.other.spaceport"),
];

impl MapObjectLayer {
    pub const ALL: [Self; 15] = [
        Self::TerrainMap,
        Self::ResidentialLowZone,
        Self::ResidentialMidZone,
        Self::ResidentialHighZone,
        Self::CommercialLowZone,
        Self::CommercialMidZone,
        Self::CommercialHighZone,
        Self::IndustrialLowZone,
        Self::IndustrialMidZone,
        Self::IndustrialHighZone,
        Self::PloppedBuildingZone,
        Self::MilitaryZone,
        Self::AirportZone,
        Self::SeaportZone,
        Self::SpaceportZone,
    ];

    /// Every layer except terrain.
    pub fn zone_layers() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|l| *l != Self::TerrainMap)
    }

    /// Layer a lot is drawn on. Zone type `None` has no layer; wealthless
    /// residential/commercial/industrial lots fall into the low tier.
    pub fn for_zone(zone_type: ZoneType, wealth: ZoneWealth) -> Option<Self> {
        use MapObjectLayer::*;
        let tier = |low, mid, high| match wealth {
            ZoneWealth::None | ZoneWealth::Low => low,
            ZoneWealth::Medium => mid,
            ZoneWealth::High => high,
        };
        match zone_type {
            ZoneType::Residential => Some(tier(ResidentialLowZone, ResidentialMidZone, ResidentialHighZone)),
            ZoneType::Commercial => Some(tier(CommercialLowZone, CommercialMidZone, CommercialHighZone)),
            ZoneType::Industrial => Some(tier(IndustrialLowZone, IndustrialMidZone, IndustrialHighZone)),
            ZoneType::Military => Some(MilitaryZone),
            ZoneType::Airport => Some(AirportZone),
            ZoneType::Seaport => Some(SeaportZone),
            ZoneType::Spaceport => Some(SpaceportZone),
            ZoneType::PloppedBuilding => Some(PloppedBuildingZone),
            ZoneType::None => None,
        }
    }

    pub fn for_lot(lot: &Lot) -> Option<Self> {
        Self::for_zone(lot.zone_type, lot.wealth)
    }

    /// Color role used to paint this layer. Terrain is shaded from
    /// elevation and has no role.
    pub fn color_role(&self) -> Option<MapColorRole> {
        use MapObjectLayer::*;
        let role = match self {
            TerrainMap => return None,
            ResidentialLowZone => MapColorRole::ResidentialLow,
            ResidentialMidZone => MapColorRole::ResidentialMid,
            ResidentialHighZone => MapColorRole::ResidentialHigh,
            CommercialLowZone => MapColorRole::CommercialLow,
            CommercialMidZone => MapColorRole::CommercialMid,
            CommercialHighZone => MapColorRole::CommercialHigh,
            IndustrialLowZone => MapColorRole::IndustrialLow,
            IndustrialMidZone => MapColorRole::IndustrialMid,
            IndustrialHighZone => MapColorRole::IndustrialHigh,
            PloppedBuildingZone => MapColorRole::PloppedBuilding,
            MilitaryZone => MapColorRole::Military,
            AirportZone => MapColorRole::Airport,
            SeaportZone => MapColorRole::Seaport,
            SpaceportZone => MapColorRole::Spaceport,
        };
        Some(role)
    }

    pub fn ui_key(&self) -> &'static str {
        LAYER_UI_KEYS
            .iter()
            .find(|(layer, _)| layer == self)
            .map_or("", |(_, key)| key)
    }

    pub fn from_ui_key(key: &str) -> Option<Self> {
        LAYER_UI_KEYS
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(layer, _)| *layer)
    }

    pub fn group(&self) -> LayerGroup {
        use MapObjectLayer::*;
        match self {
            TerrainMap => LayerGroup::Terrain,
            ResidentialLowZone | ResidentialMidZone | ResidentialHighZone => LayerGroup::Residential,
            CommercialLowZone | CommercialMidZone | CommercialHighZone => LayerGroup::Commercial,
            IndustrialLowZone | IndustrialMidZone | IndustrialHighZone => LayerGroup::Industrial,
            PloppedBuildingZone | MilitaryZone | AirportZone | SeaportZone | SpaceportZone => {
                LayerGroup::Other
            }
        }
    }
}

impl fmt::Display for MapObjectLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ui_key())
    }
}

/// Checkbox groups in the layer tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerGroup {
    Terrain,
    Residential,
    Commercial,
    Industrial,
    Other,
}

impl LayerGroup {
    pub fn all() -> &'static [Self] {
        &[Self::Terrain, Self::Residential, Self::Commercial, Self::Industrial, Self::Other]
    }

    pub fn layers(&self) -> impl Iterator<Item = MapObjectLayer> + '_ {
        MapObjectLayer::ALL.into_iter().filter(move |l| l.group() == *self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriState {
    Checked,
    Unchecked,
    Mixed,
}

/// Summary checkbox state for a group, recomputed from set membership.
pub fn group_state(visible: &BTreeSet<MapObjectLayer>, group: LayerGroup) -> TriState {
    let (on, total) = group
        .layers()
        .fold((0, 0), |(on, total), l| (on + visible.contains(&l) as usize, total + 1));
    match on {
        0 => TriState::Unchecked,
        n if n == total => TriState::Checked,
        _ => TriState::Mixed,
    }
}

/// Show or hide every layer in a group.
pub fn set_group(visible: &mut BTreeSet<MapObjectLayer>, group: LayerGroup, show: bool) {
    for layer in group.layers() {
        if show {
            visible.insert(layer);
        } else {
            visible.remove(&layer);
        }
    }
}

/// Something on the map that gets its own color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapColorRole {
    Background,
    GridLines,
    ZoneOutline,
    PloppedBuilding,
    Military,
    Airport,
    Seaport,
    Spaceport,
    ResidentialLow,
    ResidentialMid,
    ResidentialHigh,
    CommercialLow,
    CommercialMid,
    CommercialHigh,
    IndustrialLow,
    IndustrialMid,
    IndustrialHigh,
}

impl MapColorRole {
    pub const COUNT: usize = 17;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Background,
        Self::GridLines,
        Self::ZoneOutline,
        Self::PloppedBuilding,
        Self::Military,
        Self::Airport,
        Self::Seaport,
        Self::Spaceport,
        Self::ResidentialLow,
        Self::ResidentialMid,
        Self::ResidentialHigh,
        Self::CommercialLow,
        Self::CommercialMid,
        Self::CommercialHigh,
        Self::IndustrialLow,
        Self::IndustrialMid,
        Self::IndustrialHigh,
    ];

    /// Position in [`ALL`](Self::ALL); the variants are declared in that order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Role used for a lot of the given zone and wealth.
    pub fn for_zone(zone_type: ZoneType, wealth: ZoneWealth) -> Option<Self> {
        MapObjectLayer::for_zone(zone_type, wealth).and_then(|layer| layer.color_role())
    }
}

impl fmt::Display for MapColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
