//! RGBA map colors and the total role -> color table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::layers::MapColorRole;

/// An 8-bit RGBA color. Painting overwrites pixels; alpha is carried into
/// PNG output but never blended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl MapColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// `#RRGGBBAA`
impl fmt::Display for MapColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}', expected #RRGGBB or #RRGGBBAA", self.0)
    }
}

impl std::error::Error for ParseColorError {}

/// Accepts `#RRGGBB` (opaque) and `#RRGGBBAA`.
impl FromStr for MapColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl Serialize for MapColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MapColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One color for every [`MapColorRole`]. Backed by a fixed array indexed
/// by role, so a lookup can never miss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTable {
    colors: [MapColor; MapColorRole::COUNT],
}

impl ColorTable {
    pub fn get(&self, role: MapColorRole) -> MapColor {
        self.colors[role.index()]
    }

    pub fn set(&mut self, role: MapColorRole, color: MapColor) {
        self.colors[role.index()] = color;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MapColorRole, MapColor)> + '_ {
        MapColorRole::ALL.iter().map(move |&role| (role, self.get(role)))
    }

    /// Build a table from `(role, color)` pairs. Returns the first role
    /// that has no entry when the pairs are not total.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (MapColorRole, MapColor)>,
    ) -> Result<Self, MapColorRole> {
        let mut slots: [Option<MapColor>; MapColorRole::COUNT] = [None; MapColorRole::COUNT];
        for (role, color) in pairs {
            slots[role.index()] = Some(color);
        }
        let mut table = Self::default();
        for role in MapColorRole::ALL {
            match slots[role.index()] {
                Some(color) => table.set(role, color),
                None => return Err(role),
            }
        }
        Ok(table)
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        let mut colors = [MapColor::rgb(0, 0, 0); MapColorRole::COUNT];
        for role in MapColorRole::ALL {
            colors[role.index()] = default_color(role);
        }
        Self { colors }
    }
}

/// Pristine palette.
fn default_color(role: MapColorRole) -> MapColor {
    use MapColorRole::*;
    match role {
        Background => MapColor::rgb(0x1E, 0x1E, 0x1E),
        GridLines => MapColor::rgb(0x3A, 0x3A, 0x3A),
        ZoneOutline => MapColor::rgb(0x0A, 0x0A, 0x0A),
        PloppedBuilding => MapColor::rgb(0xB4, 0xB4, 0xB4),
        Military => MapColor::rgb(0x8B, 0x8B, 0x55),
        Airport => MapColor::rgb(0x9A, 0x9A, 0xC8),
        Seaport => MapColor::rgb(0x55, 0x8B, 0xB4),
        Spaceport => MapColor::rgb(0xC8, 0x64, 0xC8),
        ResidentialLow => MapColor::rgb(0x8C, 0xE6, 0x8C),
        ResidentialMid => MapColor::rgb(0x3C, 0xC8, 0x3C),
        ResidentialHigh => MapColor::rgb(0x14, 0x82, 0x14),
        CommercialLow => MapColor::rgb(0x8C, 0x8C, 0xF0),
        CommercialMid => MapColor::rgb(0x46, 0x46, 0xDC),
        CommercialHigh => MapColor::rgb(0x1E, 0x1E, 0x96),
        IndustrialLow => MapColor::rgb(0xF0, 0xE6, 0x82),
        IndustrialMid => MapColor::rgb(0xDC, 0xBE, 0x32),
        IndustrialHigh => MapColor::rgb(0xB4, 0x8C, 0x14),
    }
}
