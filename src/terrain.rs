//! Terrain elevation grid and its elevation-to-shade ramp.

use crate::color::MapColor;
use crate::error::{CartographerError, Result};
use crate::tilemap::Tilemap;

/// Integer tile address on the city ground plane. Origin is top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoordinate {
    pub x: u32,
    pub z: u32,
}

impl TileCoordinate {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// Elevation per tile, as decoded from the save's terrain subfile.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGrid {
    heights: Tilemap<f32>,
}

impl TerrainGrid {
    pub fn new(heights: Tilemap<f32>) -> Self {
        Self { heights }
    }

    /// Build from rows indexed `[z][x]`, the layout the save reader exposes.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let depth = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((z, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CartographerError::invalid_city(format!(
                "terrain row {} has {} cells, expected {}",
                z,
                row.len(),
                width
            )));
        }
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        let heights = Tilemap::from_vec(width, depth, data)
            .ok_or_else(|| CartographerError::invalid_city("terrain size mismatch"))?;
        Ok(Self { heights })
    }

    pub fn width(&self) -> usize {
        self.heights.width
    }

    pub fn depth(&self) -> usize {
        self.heights.depth
    }

    /// Elevation at a tile, or `None` when the tile is outside the grid.
    pub fn height(&self, x: i64, z: i64) -> Option<f32> {
        self.heights.get_checked(x, z).copied()
    }

    /// Like [`height`](Self::height) but reports the miss as an error.
    pub fn try_height(&self, x: i64, z: i64) -> Result<f32> {
        self.height(x, z)
            .ok_or(CartographerError::OutOfBoundsLookup { x, z })
    }

    /// Lowest and highest finite elevation in the grid.
    pub fn elevation_range(&self) -> ElevationRange {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for (_, _, &h) in self.heights.iter() {
            if !h.is_finite() {
                continue;
            }
            if h < min_h {
                min_h = h;
            }
            if h > max_h {
                max_h = h;
            }
        }
        if min_h > max_h {
            return ElevationRange { min: 0.0, max: 0.0 };
        }
        ElevationRange { min: min_h, max: max_h }
    }
}

/// Elevation span used to normalise the terrain shade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationRange {
    pub min: f32,
    pub max: f32,
}

const LOW_GROUND: [u8; 3] = [46, 64, 42];
const HIGH_GROUND: [u8; 3] = [226, 222, 204];

impl ElevationRange {
    /// Terrain shade for an elevation. Every channel of the low color is
    /// below the high one, so the ramp never darkens as elevation rises.
    pub fn shade(&self, elevation: f32) -> MapColor {
        let span = self.max - self.min;
        let t = if span > f32::EPSILON && span.is_finite() && elevation.is_finite() {
            (elevation - self.min) / span
        } else {
            0.0
        };
        let t = if t.is_nan() { 0.0 } else { t };
        let [r, g, b] = lerp_color(LOW_GROUND, HIGH_GROUND, t);
        MapColor::rgb(r, g, b)
    }
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_indexes_by_z_then_x() {
        let grid = TerrainGrid::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.depth(), 2);
        assert_eq!(grid.height(2, 0), Some(3.0));
        assert_eq!(grid.height(0, 1), Some(4.0));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = TerrainGrid::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(CartographerError::InvalidCityData { .. })));
    }

    #[test]
    fn test_out_of_bounds_is_no_data() {
        let grid = TerrainGrid::from_rows(&vec![vec![0.0; 2]; 2]).unwrap();
        assert_eq!(grid.height(2, 0), None);
        assert_eq!(grid.height(-1, 0), None);
        assert!(matches!(
            grid.try_height(5, 5),
            Err(CartographerError::OutOfBoundsLookup { x: 5, z: 5 })
        ));
    }

    #[test]
    fn test_shade_is_order_preserving() {
        let range = ElevationRange { min: 100.0, max: 900.0 };
        let mut previous = range.shade(0.0);
        for step in 0..=100 {
            let shade = range.shade(step as f32 * 10.0);
            assert!(shade.r >= previous.r && shade.g >= previous.g && shade.b >= previous.b);
            previous = shade;
        }
        assert_eq!(range.shade(100.0), MapColor::rgb(46, 64, 42));
        assert_eq!(range.shade(900.0), MapColor::rgb(226, 222, 204));
    }

    #[test]
    fn test_flat_terrain_uses_low_shade() {
        let grid = TerrainGrid::from_rows(&vec![vec![0.0; 2]; 2]).unwrap();
        let range = grid.elevation_range();
        assert_eq!(range, ElevationRange { min: 0.0, max: 0.0 });
        assert_eq!(range.shade(0.0), MapColor::rgb(46, 64, 42));
    }

    #[test]
    fn test_infinite_heights_do_not_flatten_the_ramp() {
        let grid = TerrainGrid::from_rows(&[
            vec![f32::NEG_INFINITY, 100.0],
            vec![500.0, f32::INFINITY],
        ])
        .unwrap();
        let range = grid.elevation_range();
        assert_eq!(range, ElevationRange { min: 100.0, max: 500.0 });
        assert_eq!(range.shade(100.0), MapColor::rgb(46, 64, 42));
        assert_eq!(range.shade(500.0), MapColor::rgb(226, 222, 204));
        assert!(range.shade(300.0).r > range.shade(100.0).r);
    }

    #[test]
    fn test_unbounded_range_never_shades_black() {
        let range = ElevationRange {
            min: f32::NEG_INFINITY,
            max: 10.0,
        };
        assert_eq!(range.shade(5.0), MapColor::rgb(46, 64, 42));
        assert_eq!(range.shade(f32::NAN), MapColor::rgb(46, 64, 42));
    }
}
