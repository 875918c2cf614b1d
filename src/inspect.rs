//! Pixel inspection: what lies under the mouse on a rendered map.

use std::fmt;

use crate::appearance::AppearanceModel;
use crate::lots::{find_lot, Lot, ZoneType, ZoneWealth};
use crate::render::SegmentGeometry;
use crate::terrain::{TerrainGrid, TileCoordinate};

/// Description of the tile under a pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct TileInfo {
    pub pixel: (i64, i64),
    /// `None` for pixels left of or above the grid origin.
    pub tile: Option<TileCoordinate>,
    /// `None` when the tile has no terrain data.
    pub elevation: Option<f32>,
    pub zone: Option<(ZoneType, ZoneWealth)>,
}

impl fmt::Display for TileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mouse: {}, {}px", self.pixel.0, self.pixel.1)?;
        if let Some(tile) = self.tile {
            write!(f, " (tile: {}x, {}z)", tile.x, tile.z)?;
        }
        if let Some(h) = self.elevation {
            write!(f, "  (height: {})", h)?;
        }
        if let Some((zone, wealth)) = self.zone {
            write!(f, " (zone: {} [{}])", zone, wealth)?;
        }
        Ok(())
    }
}

/// Inspect a pixel of the bitmap currently on screen.
///
/// `zoomed` selects the zoomed preview's segment size instead of the
/// model's. Lookups outside the terrain grid or lot list degrade to
/// missing fields; this never fails.
pub fn inspect(
    pixel_x: i64,
    pixel_y: i64,
    model: &AppearanceModel,
    zoomed: bool,
    terrain: Option<&TerrainGrid>,
    lots: &[Lot],
) -> TileInfo {
    let geometry = if zoomed {
        SegmentGeometry::from_model(&model.zoomed())
    } else {
        SegmentGeometry::from_model(model)
    };

    let (tx, tz) = geometry.tile_for_pixel(pixel_x, pixel_y);
    let tile = match (u32::try_from(tx), u32::try_from(tz)) {
        (Ok(x), Ok(z)) => Some(TileCoordinate::new(x, z)),
        _ => None,
    };

    let (elevation, zone) = match tile {
        Some(_) => (
            terrain.and_then(|t| t.try_height(tx, tz).ok()),
            find_lot(lots, tx, tz).map(|lot| (lot.zone_type, lot.wealth)),
        ),
        None => (None, None),
    };

    TileInfo {
        pixel: (pixel_x, pixel_y),
        tile,
        elevation,
        zone,
    }
}
