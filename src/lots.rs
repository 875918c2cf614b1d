//! Zoned and occupied lots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zone type of a lot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneType {
    Residential,
    Commercial,
    Industrial,
    Military,
    Airport,
    Seaport,
    Spaceport,
    PloppedBuilding,
    #[default]
    None,
}

impl ZoneType {
    pub fn all() -> &'static [Self] {
        &[
            Self::Residential,
            Self::Commercial,
            Self::Industrial,
            Self::Military,
            Self::Airport,
            Self::Seaport,
            Self::Spaceport,
            Self::PloppedBuilding,
            Self::None,
        ]
    }

    /// Whether the wealth tier means anything for this zone.
    pub fn has_wealth(&self) -> bool {
        matches!(self, Self::Residential | Self::Commercial | Self::Industrial)
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Residential => write!(f, "Residential"),
            Self::Commercial => write!(f, "Commercial"),
            Self::Industrial => write!(f, "Industrial"),
            Self::Military => write!(f, "Military"),
            Self::Airport => write!(f, "Airport"),
            Self::Seaport => write!(f, "Seaport"),
            Self::Spaceport => write!(f, "Spaceport"),
            Self::PloppedBuilding => write!(f, "Plopped Building"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Wealth tier. Only residential, commercial and industrial lots carry one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneWealth {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for ZoneWealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// A rectangular tile region tagged with zone type and wealth.
/// The bounding box is inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub zone_type: ZoneType,
    #[serde(default)]
    pub wealth: ZoneWealth,
    pub min_tile_x: u32,
    pub max_tile_x: u32,
    pub min_tile_z: u32,
    pub max_tile_z: u32,
}

impl Lot {
    pub fn new(zone_type: ZoneType, wealth: ZoneWealth, x: (u32, u32), z: (u32, u32)) -> Self {
        Self {
            zone_type,
            wealth,
            min_tile_x: x.0,
            max_tile_x: x.1,
            min_tile_z: z.0,
            max_tile_z: z.1,
        }
    }

    /// A single-tile lot.
    pub fn single(zone_type: ZoneType, wealth: ZoneWealth, x: u32, z: u32) -> Self {
        Self::new(zone_type, wealth, (x, x), (z, z))
    }

    pub fn contains(&self, x: i64, z: i64) -> bool {
        self.min_tile_x as i64 <= x
            && x <= self.max_tile_x as i64
            && self.min_tile_z as i64 <= z
            && z <= self.max_tile_z as i64
    }
}

/// First lot in list order whose bounding box contains the tile.
///
/// Overlapping lots resolve to the earliest one in the list; the save
/// reader's order is kept as is.
pub fn find_lot(lots: &[Lot], x: i64, z: i64) -> Option<&Lot> {
    lots.iter().find(|lot| lot.contains(x, z))
}

/// Tile extent `(width, depth)` needed to hold every lot.
pub fn lot_extent(lots: &[Lot]) -> (usize, usize) {
    lots.iter().fold((0, 0), |(w, d), lot| {
        (
            w.max(lot.max_tile_x as usize + 1),
            d.max(lot.max_tile_z as usize + 1),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let lot = Lot::new(ZoneType::Commercial, ZoneWealth::High, (2, 4), (1, 1));
        assert!(lot.contains(2, 1));
        assert!(lot.contains(4, 1));
        assert!(!lot.contains(5, 1));
        assert!(!lot.contains(3, 0));
        assert!(!lot.contains(-1, 1));
    }

    #[test]
    fn test_overlap_resolves_to_first_in_list() {
        let lots = vec![
            Lot::new(ZoneType::Industrial, ZoneWealth::Low, (0, 3), (0, 3)),
            Lot::new(ZoneType::Residential, ZoneWealth::High, (2, 5), (2, 5)),
        ];
        assert_eq!(find_lot(&lots, 2, 2).unwrap().zone_type, ZoneType::Industrial);
        assert_eq!(find_lot(&lots, 4, 4).unwrap().zone_type, ZoneType::Residential);
        assert!(find_lot(&lots, 6, 6).is_none());
    }

    #[test]
    fn test_lot_extent() {
        let lots = vec![
            Lot::single(ZoneType::Military, ZoneWealth::None, 7, 1),
            Lot::new(ZoneType::Airport, ZoneWealth::None, (0, 1), (0, 9)),
        ];
        assert_eq!(lot_extent(&lots), (8, 10));
        assert_eq!(lot_extent(&[]), (0, 0));
    }
}
