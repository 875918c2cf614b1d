//! Map rasterizer: terrain grid + lots + appearance -> RGBA bitmap.
//!
//! Rendering happens in two passes. A per-tile plan resolves which layer
//! owns each tile, its fill color, and which of its edges border a
//! different zone. Rows of the output are then painted in parallel, each
//! pixel classified by its position inside its tile cell:
//!
//! - first row/column of a cell: grid line (when enabled)
//! - outside the padded rectangle: background
//! - first/last row/column of the padded rectangle on a zone border:
//!   zone outline (when enabled)
//! - otherwise: the tile's fill
//!
//! The result depends only on the inputs; painting order cannot change it.

use image::RgbaImage;
use rayon::prelude::*;

use crate::appearance::AppearanceModel;
use crate::color::MapColor;
use crate::error::{CartographerError, Result};
use crate::layers::{MapColorRole, MapObjectLayer};
use crate::lots::{lot_extent, Lot};
use crate::terrain::TerrainGrid;
use crate::tilemap::Tilemap;

/// A rendered map. Pixels are RGBA8, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedBitmap {
    image: RgbaImage,
}

impl RenderedBitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> MapColor {
        MapColor::from_rgba(self.image.get_pixel(x, y).0)
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Tile extent of the map: the larger of the terrain grid and the lots.
pub fn grid_dimensions(terrain: Option<&TerrainGrid>, lots: &[Lot]) -> (usize, usize) {
    let (lot_w, lot_d) = lot_extent(lots);
    let (ter_w, ter_d) = terrain.map_or((0, 0), |t| (t.width(), t.depth()));
    (lot_w.max(ter_w), lot_d.max(ter_d))
}

/// Forward and inverse pixel <-> tile mapping for one appearance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentGeometry {
    pub segment: i64,
    pub padding_x: i64,
    pub padding_y: i64,
    pub offset_x: i64,
    pub offset_y: i64,
}

impl SegmentGeometry {
    pub fn from_model(model: &AppearanceModel) -> Self {
        Self {
            segment: model.grid_segment_size.max(1) as i64,
            padding_x: model.segment_padding_x as i64,
            padding_y: model.segment_padding_y as i64,
            offset_x: model.segment_offset_x as i64,
            offset_y: model.segment_offset_y as i64,
        }
    }

    /// Bitmap size for a grid of `tiles` tiles, each axis clamped at zero.
    pub fn bitmap_size(&self, (tiles_x, tiles_z): (usize, usize)) -> Result<(u32, u32)> {
        let axis = |tiles: usize, offset: i64| -> Result<u32> {
            let span = (tiles as i64)
                .checked_mul(self.segment)
                .and_then(|px| px.checked_add(offset))
                .ok_or_else(|| CartographerError::render_failure("bitmap size overflows"))?;
            u32::try_from(span.max(0)).map_err(|_| {
                CartographerError::render_failure(format!("bitmap dimension {} is too large", span))
            })
        };
        Ok((axis(tiles_x, self.offset_x)?, axis(tiles_z, self.offset_y)?))
    }

    /// Pixel rectangle `(x, y, width, height)` a tile's content is drawn in.
    /// May lie partly outside the bitmap when offsets are negative.
    pub fn tile_rect(&self, x: usize, z: usize) -> (i64, i64, i64, i64) {
        (
            self.offset_x + x as i64 * self.segment + self.padding_x,
            self.offset_y + z as i64 * self.segment + self.padding_y,
            (self.segment - 2 * self.padding_x).max(0),
            (self.segment - 2 * self.padding_y).max(0),
        )
    }

    /// Tile containing a pixel, by floor division after removing the
    /// offset. Padding belongs to its tile. Pixels left of or above the
    /// grid origin give negative tiles.
    pub fn tile_for_pixel(&self, px: i64, py: i64) -> (i64, i64) {
        (
            (px - self.offset_x).div_euclid(self.segment),
            (py - self.offset_y).div_euclid(self.segment),
        )
    }

    /// Position of a pixel inside its cell.
    fn local(&self, px: i64, py: i64) -> (i64, i64) {
        (
            (px - self.offset_x).rem_euclid(self.segment),
            (py - self.offset_y).rem_euclid(self.segment),
        )
    }
}

const EDGE_LEFT: u8 = 1;
const EDGE_RIGHT: u8 = 2;
const EDGE_TOP: u8 = 4;
const EDGE_BOTTOM: u8 = 8;

/// Per-tile decisions made before any pixel is painted.
struct TilePlan {
    fill: Tilemap<MapColor>,
    /// Edges bordering a tile with a different resolved layer.
    outline_edges: Option<Tilemap<u8>>,
}

/// First visible lot layer covering each tile, in lot list order.
pub fn resolve_layers(
    lots: &[Lot],
    model: &AppearanceModel,
    (tiles_x, tiles_z): (usize, usize),
) -> Tilemap<Option<MapObjectLayer>> {
    let mut layers = Tilemap::new_with(tiles_x, tiles_z, None);
    for lot in lots {
        let Some(layer) = MapObjectLayer::for_lot(lot) else {
            continue;
        };
        if !model.is_visible(layer) {
            continue;
        }
        let max_x = (lot.max_tile_x as usize).min(tiles_x.saturating_sub(1));
        let max_z = (lot.max_tile_z as usize).min(tiles_z.saturating_sub(1));
        for z in lot.min_tile_z as usize..=max_z {
            for x in lot.min_tile_x as usize..=max_x {
                let cell = layers.get_mut(x, z);
                if cell.is_none() {
                    *cell = Some(layer);
                }
            }
        }
    }
    layers
}

fn plan_tiles(
    terrain: Option<&TerrainGrid>,
    lots: &[Lot],
    model: &AppearanceModel,
    tiles: (usize, usize),
) -> TilePlan {
    let layers = resolve_layers(lots, model, tiles);
    let background = model.color(MapColorRole::Background);

    let shaded_terrain = terrain
        .filter(|_| model.is_visible(MapObjectLayer::TerrainMap))
        .map(|t| (t, t.elevation_range()));

    let mut fill = Tilemap::new_with(tiles.0, tiles.1, background);
    for (x, z, layer) in layers.iter() {
        let color = match layer.and_then(|l| l.color_role()) {
            Some(role) => model.color(role),
            None => shaded_terrain
                .and_then(|(grid, range)| grid.height(x as i64, z as i64).map(|h| range.shade(h)))
                .unwrap_or(background),
        };
        fill.set(x, z, color);
    }

    let outline_edges = model.show_zone_outlines.then(|| {
        let mut edges = Tilemap::new_with(tiles.0, tiles.1, 0u8);
        for (x, z, layer) in layers.iter() {
            let mut mask = 0u8;
            for (neighbor, bit) in layers
                .neighbors_4(x, z)
                .into_iter()
                .zip([EDGE_LEFT, EDGE_RIGHT, EDGE_TOP, EDGE_BOTTOM])
            {
                if neighbor.is_some_and(|n| n != layer) {
                    mask |= bit;
                }
            }
            edges.set(x, z, mask);
        }
        edges
    });

    TilePlan { fill, outline_edges }
}

/// Colors that do not depend on the tile.
struct Palette {
    background: MapColor,
    grid: Option<MapColor>,
    outline: MapColor,
}

fn pixel_color(
    px: i64,
    py: i64,
    geometry: &SegmentGeometry,
    plan: &TilePlan,
    palette: &Palette,
) -> MapColor {
    let (tx, tz) = geometry.tile_for_pixel(px, py);
    let Some(&fill) = plan.fill.get_checked(tx, tz) else {
        return palette.background;
    };
    let (lx, ly) = geometry.local(px, py);

    if let Some(grid) = palette.grid {
        if lx == 0 || ly == 0 {
            return grid;
        }
    }

    let seg = geometry.segment;
    let (pad_x, pad_y) = (geometry.padding_x, geometry.padding_y);
    if lx < pad_x || lx >= seg - pad_x || ly < pad_y || ly >= seg - pad_y {
        return palette.background;
    }

    if let Some(edges) = &plan.outline_edges {
        let mask = edges.get_checked(tx, tz).copied().unwrap_or(0);
        let on_edge = (mask & EDGE_LEFT != 0 && lx == pad_x)
            || (mask & EDGE_RIGHT != 0 && lx == seg - pad_x - 1)
            || (mask & EDGE_TOP != 0 && ly == pad_y)
            || (mask & EDGE_BOTTOM != 0 && ly == seg - pad_y - 1);
        if on_edge {
            return palette.outline;
        }
    }

    fill
}

/// Render a map.
///
/// The model is validated first; an invalid model never reaches pixel
/// work. A map whose bitmap would have zero area is a render failure.
pub fn render_map(
    terrain: Option<&TerrainGrid>,
    lots: &[Lot],
    model: &AppearanceModel,
) -> Result<RenderedBitmap> {
    model.validate()?;

    let tiles = grid_dimensions(terrain, lots);
    let geometry = SegmentGeometry::from_model(model);
    let (width, height) = geometry.bitmap_size(tiles)?;
    if width == 0 || height == 0 {
        return Err(CartographerError::render_failure(format!(
            "map of {}x{} tiles renders to an empty {}x{} bitmap",
            tiles.0, tiles.1, width, height
        )));
    }

    let row_len = width as usize * 4;
    let total = row_len
        .checked_mul(height as usize)
        .ok_or_else(|| CartographerError::render_failure("pixel buffer size overflows"))?;
    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(total).map_err(|e| {
        CartographerError::render_failure(format!("cannot allocate {} bytes: {}", total, e))
    })?;
    buffer.resize(total, 0);

    let plan = plan_tiles(terrain, lots, model, tiles);
    let palette = Palette {
        background: model.color(MapColorRole::Background),
        grid: model.show_grid_lines.then(|| model.color(MapColorRole::GridLines)),
        outline: model.color(MapColorRole::ZoneOutline),
    };

    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let color = pixel_color(x as i64, y as i64, &geometry, &plan, &palette);
                px.copy_from_slice(&color.to_rgba());
            }
        });

    let image = RgbaImage::from_raw(width, height, buffer)
        .ok_or_else(|| CartographerError::render_failure("pixel buffer does not match bitmap size"))?;
    Ok(RenderedBitmap { image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lots::{ZoneType, ZoneWealth};

    fn plain_model(segment: u32) -> AppearanceModel {
        AppearanceModel {
            grid_segment_size: segment,
            segment_padding_x: 0,
            segment_padding_y: 0,
            show_grid_lines: false,
            show_zone_outlines: false,
            ..AppearanceModel::default()
        }
    }

    fn flat_terrain(width: usize, depth: usize) -> TerrainGrid {
        TerrainGrid::new(Tilemap::new_with(width, depth, 0.0))
    }

    #[test]
    fn test_bitmap_size_includes_offset() {
        let mut model = plain_model(4);
        model.segment_offset_x = 3;
        model.segment_offset_y = -2;
        let bitmap = render_map(Some(&flat_terrain(5, 3)), &[], &model).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (23, 10));
    }

    #[test]
    fn test_grid_extends_to_cover_lots() {
        let lots = [Lot::single(ZoneType::Military, ZoneWealth::None, 6, 1)];
        assert_eq!(grid_dimensions(Some(&flat_terrain(2, 4)), &lots), (7, 4));
        assert_eq!(grid_dimensions(None, &lots), (7, 2));
    }

    #[test]
    fn test_zero_segment_rejected_before_rendering() {
        let model = plain_model(0);
        let result = render_map(Some(&flat_terrain(2, 2)), &[], &model);
        assert!(matches!(result, Err(CartographerError::InvalidAppearance { .. })));
    }

    #[test]
    fn test_empty_map_is_render_failure() {
        let result = render_map(None, &[], &plain_model(5));
        assert!(matches!(result, Err(CartographerError::RenderFailure { .. })));

        let mut model = plain_model(2);
        model.segment_offset_x = -10;
        let result = render_map(Some(&flat_terrain(3, 3)), &[], &model);
        assert!(matches!(result, Err(CartographerError::RenderFailure { .. })));
    }

    #[test]
    fn test_padding_leaves_background_border() {
        let mut model = plain_model(6);
        model.segment_padding_x = 2;
        model.segment_padding_y = 1;
        let lots = [Lot::single(ZoneType::Airport, ZoneWealth::None, 0, 0)];
        let bitmap = render_map(None, &lots, &model).unwrap();
        let airport = model.color(MapColorRole::Airport);
        let background = model.color(MapColorRole::Background);

        assert_eq!(bitmap.pixel(1, 3), background);
        assert_eq!(bitmap.pixel(2, 3), airport);
        assert_eq!(bitmap.pixel(3, 4), airport);
        assert_eq!(bitmap.pixel(4, 3), background);
        assert_eq!(bitmap.pixel(3, 0), background);
        assert_eq!(bitmap.pixel(3, 5), background);
        assert_eq!(model.segment_padding_x, 2);
        assert_eq!(SegmentGeometry::from_model(&model).tile_rect(0, 0), (2, 1, 2, 4));
    }

    #[test]
    fn test_oversized_padding_draws_nothing() {
        let mut model = plain_model(4);
        model.segment_padding_x = 3;
        let lots = [Lot::single(ZoneType::Airport, ZoneWealth::None, 0, 0)];
        let bitmap = render_map(None, &lots, &model).unwrap();
        let background = model.color(MapColorRole::Background);
        assert!(bitmap.image().pixels().all(|p| MapColor::from_rgba(p.0) == background));
    }

    #[test]
    fn test_grid_lines_on_cell_boundaries() {
        let mut model = plain_model(4);
        model.show_grid_lines = true;
        let bitmap = render_map(Some(&flat_terrain(2, 2)), &[], &model).unwrap();
        let grid = model.color(MapColorRole::GridLines);
        for i in 0..8 {
            assert_eq!(bitmap.pixel(0, i), grid);
            assert_eq!(bitmap.pixel(4, i), grid);
            assert_eq!(bitmap.pixel(i, 4), grid);
        }
        assert_ne!(bitmap.pixel(1, 1), grid);
        assert_ne!(bitmap.pixel(7, 7), grid);
    }

    #[test]
    fn test_grid_lines_drawn_over_outlines() {
        let mut model = plain_model(4);
        model.show_grid_lines = true;
        model.show_zone_outlines = true;
        let lots = [Lot::single(ZoneType::Seaport, ZoneWealth::None, 1, 0)];
        let bitmap = render_map(Some(&flat_terrain(2, 1)), &lots, &model).unwrap();
        // Left edge of the seaport tile is both a grid line and a zone border.
        assert_eq!(bitmap.pixel(4, 2), model.color(MapColorRole::GridLines));
        // The terrain tile's right edge borders the seaport.
        assert_eq!(bitmap.pixel(3, 2), model.color(MapColorRole::ZoneOutline));
    }

    #[test]
    fn test_outlines_stay_inside_padded_rect() {
        let mut model = plain_model(8);
        model.segment_padding_x = 2;
        model.segment_padding_y = 2;
        model.show_zone_outlines = true;
        let lots = [Lot::single(ZoneType::Spaceport, ZoneWealth::None, 0, 0)];
        let bitmap = render_map(Some(&flat_terrain(2, 1)), &lots, &model).unwrap();
        let outline = model.color(MapColorRole::ZoneOutline);
        let background = model.color(MapColorRole::Background);

        // Right edge of tile 0 padded rect is x = 5.
        assert_eq!(bitmap.pixel(5, 3), outline);
        assert_eq!(bitmap.pixel(6, 3), background);
        // Left edge of tile 1 padded rect is x = 10.
        assert_eq!(bitmap.pixel(10, 3), outline);
        // No neighbour above or to the left: grid edges are not outlined.
        assert_eq!(bitmap.pixel(2, 3), model.color(MapColorRole::Spaceport));
        assert_eq!(bitmap.pixel(3, 2), model.color(MapColorRole::Spaceport));
    }

    #[test]
    fn test_hidden_lot_falls_through_to_terrain() {
        let mut model = plain_model(2);
        model.set_visible(MapObjectLayer::IndustrialHighZone, false);
        let terrain = flat_terrain(1, 1);
        let lots = [Lot::single(ZoneType::Industrial, ZoneWealth::High, 0, 0)];
        let bitmap = render_map(Some(&terrain), &lots, &model).unwrap();
        assert_eq!(bitmap.pixel(0, 0), terrain.elevation_range().shade(0.0));
    }

    #[test]
    fn test_overlapping_lots_paint_first_visible() {
        let model = plain_model(1);
        let lots = [
            Lot::new(ZoneType::Commercial, ZoneWealth::Low, (0, 1), (0, 0)),
            Lot::new(ZoneType::Residential, ZoneWealth::Medium, (1, 2), (0, 0)),
        ];
        let bitmap = render_map(None, &lots, &model).unwrap();
        assert_eq!(bitmap.pixel(1, 0), model.color(MapColorRole::CommercialLow));
        assert_eq!(bitmap.pixel(2, 0), model.color(MapColorRole::ResidentialMid));

        let mut hide_first = model.clone();
        hide_first.set_visible(MapObjectLayer::CommercialLowZone, false);
        let bitmap = render_map(None, &lots, &hide_first).unwrap();
        assert_eq!(bitmap.pixel(1, 0), model.color(MapColorRole::ResidentialMid));
    }

    #[test]
    fn test_lot_beyond_terrain_uses_background_for_missing_terrain() {
        let model = plain_model(1);
        let lots = [Lot::single(ZoneType::Military, ZoneWealth::None, 3, 0)];
        let bitmap = render_map(Some(&flat_terrain(1, 1)), &lots, &model).unwrap();
        assert_eq!(bitmap.pixel(2, 0), model.color(MapColorRole::Background));
        assert_eq!(bitmap.pixel(3, 0), model.color(MapColorRole::Military));
    }

    #[test]
    fn test_inverse_undoes_forward_mapping() {
        let mut model = plain_model(7);
        model.segment_offset_x = -3;
        model.segment_offset_y = 5;
        model.segment_padding_x = 1;
        let geometry = SegmentGeometry::from_model(&model);
        for z in 0..4 {
            for x in 0..4 {
                let (rx, ry, rw, rh) = geometry.tile_rect(x, z);
                for py in ry..ry + rh {
                    for px in rx..rx + rw {
                        assert_eq!(geometry.tile_for_pixel(px, py), (x as i64, z as i64));
                    }
                }
            }
        }
        assert_eq!(geometry.tile_for_pixel(0, 0), (0, -1));
    }
}
