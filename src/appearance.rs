//! Appearance parameters: everything that changes how a map is drawn.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{ColorTable, MapColor};
use crate::error::{CartographerError, Result};
use crate::layers::{MapColorRole, MapObjectLayer};

/// Segment size of the zoomed preview, in pixels per tile.
pub const ZOOM_SEGMENT_SIZE: u32 = 10;
/// Padding of the zoomed preview on both axes.
pub const ZOOM_SEGMENT_PADDING: u32 = 4;

/// Image format for exported maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Complete set of parameters controlling how tile data becomes pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct AppearanceModel {
    // =========================================================================
    // Segment geometry
    // =========================================================================

    /// Pixels per tile edge at full resolution (>= 1)
    pub grid_segment_size: u32,

    /// Empty border inside each tile cell, in pixels
    pub segment_padding_x: u32,
    pub segment_padding_y: u32,

    /// Pixel shift applied to the whole grid before tiles are drawn
    pub segment_offset_x: i32,
    pub segment_offset_y: i32,

    // =========================================================================
    // Overlays
    // =========================================================================

    pub show_grid_lines: bool,
    pub show_zone_outlines: bool,

    // =========================================================================
    // Colors and layers
    // =========================================================================

    pub colors: ColorTable,

    /// Layers drawn on the map. Empty means background (and grid) only.
    pub visible_layers: BTreeSet<MapObjectLayer>,

    // =========================================================================
    // Output
    // =========================================================================

    pub output_format: OutputFormat,

    /// Directory exported maps are written to. Not validated here.
    pub output_path: String,
}

impl Default for AppearanceModel {
    fn default() -> Self {
        Self {
            grid_segment_size: 5,
            segment_padding_x: 1,
            segment_padding_y: 1,
            segment_offset_x: 0,
            segment_offset_y: 0,
            show_grid_lines: true,
            show_zone_outlines: false,
            colors: ColorTable::default(),
            visible_layers: MapObjectLayer::ALL.into_iter().collect(),
            output_format: OutputFormat::Png,
            output_path: String::new(),
        }
    }
}

impl AppearanceModel {
    /// Check the invariants the rasterizer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.grid_segment_size == 0 {
            return Err(CartographerError::invalid_appearance(
                "grid segment size must be at least 1",
            ));
        }
        if i32::try_from(self.grid_segment_size).is_err() {
            return Err(CartographerError::invalid_appearance(format!(
                "grid segment size {} is too large",
                self.grid_segment_size
            )));
        }
        Ok(())
    }

    /// Independent copy used to derive preview variants.
    pub fn clone_for_preview(&self) -> Self {
        self.clone()
    }

    /// Copy with the fixed zoomed-preview geometry applied.
    pub fn zoomed(&self) -> Self {
        let mut zoomed = self.clone_for_preview();
        zoomed.grid_segment_size = ZOOM_SEGMENT_SIZE;
        zoomed.segment_padding_x = ZOOM_SEGMENT_PADDING;
        zoomed.segment_padding_y = ZOOM_SEGMENT_PADDING;
        zoomed
    }

    /// A zoomed preview only makes sense when it magnifies the map.
    pub fn zoom_available(&self) -> bool {
        self.grid_segment_size <= ZOOM_SEGMENT_SIZE
    }

    /// Pristine parameters, keeping the current output directory.
    pub fn restore_defaults(&self) -> Self {
        Self {
            output_path: self.output_path.clone(),
            ..Self::default()
        }
    }

    pub fn color(&self, role: MapColorRole) -> MapColor {
        self.colors.get(role)
    }

    pub fn is_visible(&self, layer: MapObjectLayer) -> bool {
        self.visible_layers.contains(&layer)
    }

    pub fn set_visible(&mut self, layer: MapObjectLayer, visible: bool) {
        if visible {
            self.visible_layers.insert(layer);
        } else {
            self.visible_layers.remove(&layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_and_shows_everything() {
        let model = AppearanceModel::default();
        assert!(model.validate().is_ok());
        assert_eq!(model.visible_layers.len(), MapObjectLayer::ALL.len());
        assert!(model.is_visible(MapObjectLayer::TerrainMap));
    }

    #[test]
    fn test_zero_segment_rejected() {
        let model = AppearanceModel {
            grid_segment_size: 0,
            ..AppearanceModel::default()
        };
        assert!(matches!(
            model.validate(),
            Err(CartographerError::InvalidAppearance { .. })
        ));
    }

    #[test]
    fn test_preview_clone_is_independent() {
        let original = AppearanceModel::default();
        let mut copy = original.clone_for_preview();
        copy.colors.set(MapColorRole::Airport, MapColor::rgb(1, 2, 3));
        copy.set_visible(MapObjectLayer::AirportZone, false);

        assert_ne!(original.color(MapColorRole::Airport), MapColor::rgb(1, 2, 3));
        assert!(original.is_visible(MapObjectLayer::AirportZone));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_zoomed_keeps_everything_but_geometry() {
        let base = AppearanceModel {
            grid_segment_size: 3,
            segment_offset_x: 2,
            show_zone_outlines: true,
            ..AppearanceModel::default()
        };
        let zoomed = base.zoomed();
        assert_eq!(zoomed.grid_segment_size, ZOOM_SEGMENT_SIZE);
        assert_eq!(zoomed.segment_padding_x, ZOOM_SEGMENT_PADDING);
        assert_eq!(zoomed.segment_padding_y, ZOOM_SEGMENT_PADDING);
        assert_eq!(zoomed.segment_offset_x, 2);
        assert!(zoomed.show_zone_outlines);
        assert_eq!(base.grid_segment_size, 3);
    }

    #[test]
    fn test_zoom_available_threshold() {
        let mut model = AppearanceModel::default();
        model.grid_segment_size = ZOOM_SEGMENT_SIZE;
        assert!(model.zoom_available());
        model.grid_segment_size = ZOOM_SEGMENT_SIZE + 1;
        assert!(!model.zoom_available());
    }

    #[test]
    fn test_restore_defaults_keeps_output_path() {
        let mut model = AppearanceModel::default();
        model.output_path = "/maps".to_string();
        model.grid_segment_size = 12;
        let restored = model.restore_defaults();
        assert_eq!(restored.output_path, "/maps");
        assert_eq!(restored.grid_segment_size, AppearanceModel::default().grid_segment_size);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert!("bmp".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }
}
