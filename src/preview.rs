//! Preview orchestration
//!
//! Owns the decoded city data for the loaded save and re-renders the
//! preview bitmaps whenever the appearance changes. Decoding a save is the
//! slow part, so terrain and lots are cached by save identity and only
//! reloaded when a different save is handed in.

use std::path::{Path, PathBuf};

use crate::appearance::AppearanceModel;
use crate::city::{CitySource, SaveIdentity};
use crate::error::{CartographerError, Result};
use crate::export;
use crate::inspect::{self, TileInfo};
use crate::lots::Lot;
use crate::render::{render_map, RenderedBitmap};
use crate::terrain::TerrainGrid;

/// Decoded data of one save
struct CityCache {
    identity: SaveIdentity,
    terrain: Option<TerrainGrid>,
    lots: Vec<Lot>,
}

impl CityCache {
    /// Keyed by the identity the source reported for this decode, which
    /// may be newer than the one looked up before it.
    fn decode<S: CitySource + ?Sized>(source: &S) -> Result<Self> {
        let city = source.load()?;
        Ok(CityCache {
            identity: city.identity,
            terrain: city.terrain,
            lots: city.lots,
        })
    }

    /// Normal preview, plus the zoomed one when zooming magnifies the map.
    fn render_previews(&self, model: &AppearanceModel) -> Result<PreviewSet> {
        let terrain = self.terrain.as_ref();
        let normal = render_map(terrain, &self.lots, &model.clone_for_preview())?;
        let zoomed = if model.zoom_available() {
            Some(render_map(terrain, &self.lots, &model.zoomed())?)
        } else {
            None
        };
        Ok(PreviewSet { normal, zoomed })
    }
}

/// The bitmaps produced by one render.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewSet {
    pub normal: RenderedBitmap,
    /// Present only when zooming magnifies the map.
    pub zoomed: Option<RenderedBitmap>,
}

/// Cache-owning driver for the preview pane.
#[derive(Default)]
pub struct PreviewOrchestrator {
    cache: Option<CityCache>,
    previews: Option<PreviewSet>,
    showing_zoomed: bool,
}

impl PreviewOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the previews for `source` with `model`.
    ///
    /// A save with a new identity is decoded into a fresh cache, which
    /// replaces the old one together with the previews once both renders
    /// succeed. On error the previous cache and previews are kept. The
    /// display is reset to the normal bitmap.
    pub fn render<S: CitySource + ?Sized>(
        &mut self,
        source: &S,
        model: &AppearanceModel,
    ) -> Result<&PreviewSet> {
        let identity = source.identity();
        let fresh = match &self.cache {
            Some(cache) if cache.identity == identity => {
                tracing::debug!(save = %identity.name, "city cache hit");
                None
            }
            _ => {
                tracing::info!(save = %identity.name, "decoding city data");
                Some(CityCache::decode(source)?)
            }
        };

        let cache = fresh
            .as_ref()
            .or(self.cache.as_ref())
            .ok_or_else(|| CartographerError::invalid_city("no city loaded"))?;
        let previews = cache.render_previews(model)?;
        tracing::debug!(
            width = previews.normal.width(),
            height = previews.normal.height(),
            zoomed = previews.zoomed.is_some(),
            "preview rendered"
        );

        if let Some(fresh) = fresh {
            self.cache = Some(fresh);
        }
        self.showing_zoomed = false;
        Ok(self.previews.insert(previews))
    }

    pub fn previews(&self) -> Option<&PreviewSet> {
        self.previews.as_ref()
    }

    /// Whether the last render produced a zoomed preview.
    pub fn zoom_available(&self) -> bool {
        self.previews.as_ref().is_some_and(|p| p.zoomed.is_some())
    }

    pub fn is_zoomed(&self) -> bool {
        self.showing_zoomed
    }

    /// Switch between the normal and zoomed preview. Does nothing when no
    /// zoomed preview exists. Returns the new zoom state.
    pub fn toggle_zoom(&mut self) -> bool {
        if self.zoom_available() {
            self.showing_zoomed = !self.showing_zoomed;
        }
        self.showing_zoomed
    }

    /// Bitmap currently on screen.
    pub fn displayed(&self) -> Option<&RenderedBitmap> {
        let previews = self.previews.as_ref()?;
        match (&previews.zoomed, self.showing_zoomed) {
            (Some(zoomed), true) => Some(zoomed),
            _ => Some(&previews.normal),
        }
    }

    /// Drop the cached city data and previews.
    pub fn invalidate(&mut self) {
        if let Some(cache) = self.cache.take() {
            tracing::info!(save = %cache.identity.name, "city cache dropped");
        }
        self.previews = None;
        self.showing_zoomed = false;
    }

    pub fn identity(&self) -> Option<&SaveIdentity> {
        self.cache.as_ref().map(|c| &c.identity)
    }

    /// Describe the pixel under the mouse on the displayed bitmap. `None`
    /// before any city has been loaded.
    pub fn inspect(&self, pixel_x: i64, pixel_y: i64, model: &AppearanceModel) -> Option<TileInfo> {
        let cache = self.cache.as_ref()?;
        Some(inspect::inspect(
            pixel_x,
            pixel_y,
            model,
            self.showing_zoomed,
            cache.terrain.as_ref(),
            &cache.lots,
        ))
    }

    /// Default export name for the loaded save.
    pub fn default_map_name(&self) -> Option<String> {
        self.identity().map(SaveIdentity::default_map_name)
    }

    /// Render the loaded city with `model` at full size and write it to
    /// `model.output_path` (the working directory when empty). `name`
    /// defaults to the save's map name.
    pub fn export_map(&self, model: &AppearanceModel, name: Option<&str>) -> Result<PathBuf> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| CartographerError::invalid_city("no city loaded"))?;
        let bitmap = render_map(cache.terrain.as_ref(), &cache.lots, model)?;
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| cache.identity.default_map_name());
        let dir = if model.output_path.is_empty() {
            Path::new(".")
        } else {
            Path::new(&model.output_path)
        };
        export::export_map(&bitmap, dir, &name, model.output_format)
    }
}
