//! View state of the appearance editor.
//!
//! The editor works on plain widget values: numeric spinners, hex color
//! swatches and a tree of layer checkboxes keyed by their UI names.
//! [`AppearanceControls::from_model`] pushes a model into the view and
//! [`AppearanceControls::to_model`] reads the view back; nothing is shared
//! between the two.
//!
//! The editor has a single padding spinner and a single offset spinner, so
//! both axes are written from one value and the X axis is shown.

use std::collections::{BTreeMap, BTreeSet};

use crate::appearance::{AppearanceModel, OutputFormat};
use crate::color::{ColorTable, MapColor};
use crate::error::{CartographerError, Result};
use crate::layers::{group_state, LayerGroup, MapColorRole, MapObjectLayer, TriState};

#[derive(Clone, Debug, PartialEq)]
pub struct AppearanceControls {
    pub grid_segment_size: u32,
    pub segment_padding: u32,
    pub segment_offset: i32,
    pub show_grid_lines: bool,
    pub show_zone_outlines: bool,
    /// Hex swatch text per color role
    pub swatches: BTreeMap<MapColorRole, String>,
    /// UI keys of the checked layer boxes
    pub checked_layers: BTreeSet<String>,
    pub output_format: OutputFormat,
    pub output_path: String,
}

impl AppearanceControls {
    pub fn from_model(model: &AppearanceModel) -> Self {
        Self {
            grid_segment_size: model.grid_segment_size,
            segment_padding: model.segment_padding_x,
            segment_offset: model.segment_offset_x,
            show_grid_lines: model.show_grid_lines,
            show_zone_outlines: model.show_zone_outlines,
            swatches: model
                .colors
                .iter()
                .map(|(role, color)| (role, color.to_string()))
                .collect(),
            checked_layers: model
                .visible_layers
                .iter()
                .map(|layer| layer.ui_key().to_string())
                .collect(),
            output_format: model.output_format,
            output_path: model.output_path.clone(),
        }
    }

    /// Read the view into a new model. Unparseable swatches, unknown layer
    /// keys and missing roles are rejected as invalid appearance.
    pub fn to_model(&self) -> Result<AppearanceModel> {
        let mut pairs = Vec::with_capacity(self.swatches.len());
        for (role, text) in &self.swatches {
            let color: MapColor = text.parse().map_err(|e| {
                CartographerError::invalid_appearance(format!("{} color: {}", role, e))
            })?;
            pairs.push((*role, color));
        }
        let colors = ColorTable::from_pairs(pairs).map_err(|role| {
            CartographerError::invalid_appearance(format!("no color chosen for {}", role))
        })?;

        let visible_layers = self
            .checked_layers
            .iter()
            .map(|key| {
                MapObjectLayer::from_ui_key(key).ok_or_else(|| {
                    CartographerError::invalid_appearance(format!("unknown layer '{}'", key))
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        let model = AppearanceModel {
            grid_segment_size: self.grid_segment_size,
            segment_padding_x: self.segment_padding,
            segment_padding_y: self.segment_padding,
            segment_offset_x: self.segment_offset,
            segment_offset_y: self.segment_offset,
            show_grid_lines: self.show_grid_lines,
            show_zone_outlines: self.show_zone_outlines,
            colors,
            visible_layers,
            output_format: self.output_format,
            output_path: self.output_path.clone(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn is_checked(&self, layer: MapObjectLayer) -> bool {
        self.checked_layers.contains(layer.ui_key())
    }

    pub fn set_checked(&mut self, layer: MapObjectLayer, checked: bool) {
        if checked {
            self.checked_layers.insert(layer.ui_key().to_string());
        } else {
            self.checked_layers.remove(layer.ui_key());
        }
    }

    /// State of a group's parent checkbox.
    pub fn group_state(&self, group: LayerGroup) -> TriState {
        let visible: BTreeSet<_> = self
            .checked_layers
            .iter()
            .filter_map(|key| MapObjectLayer::from_ui_key(key))
            .collect();
        group_state(&visible, group)
    }

    /// Clicking a parent checkbox checks or clears every child.
    pub fn set_group(&mut self, group: LayerGroup, checked: bool) {
        for layer in group.layers() {
            self.set_checked(layer, checked);
        }
    }
}
