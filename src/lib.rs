//! SimCity 4 map cartography library
//!
//! Turns decoded city data (terrain elevations and zoned lots) into styled
//! map images, persists appearance presets, and answers "what is under the
//! mouse" for a rendered map.

pub mod appearance;
pub mod city;
pub mod color;
pub mod controls;
pub mod error;
pub mod export;
pub mod inspect;
pub mod layers;
pub mod lots;
pub mod persistence;
pub mod preview;
pub mod render;
pub mod synthetic;
pub mod terrain;
pub mod tilemap;

pub use appearance::{AppearanceModel, OutputFormat, ZOOM_SEGMENT_PADDING, ZOOM_SEGMENT_SIZE};
pub use city::{CityData, CityFile, CitySource, SaveIdentity};
pub use color::{ColorTable, MapColor};
pub use error::{CartographerError, MalformedKind, Result};
pub use inspect::{inspect, TileInfo};
pub use layers::{MapColorRole, MapObjectLayer};
pub use lots::{Lot, ZoneType, ZoneWealth};
pub use preview::{PreviewOrchestrator, PreviewSet};
pub use render::{render_map, RenderedBitmap};
pub use terrain::{TerrainGrid, TileCoordinate};
