//! Appearance preset (`.sc4cart`) serialization.
//!
//! A preset is a small binary container around a JSON record:
//!
//! ```text
//! magic      8 bytes   "SC4CART\x1a"
//! version    u16 LE
//! length     u32 LE    payload length in bytes
//! digest     32 bytes  blake3 hash of the payload
//! payload    JSON
//! ```
//!
//! The digest makes any single corrupted byte a hard failure instead of a
//! silently misread field.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::appearance::{AppearanceModel, OutputFormat};
use crate::color::{ColorTable, MapColor};
use crate::error::{CartographerError, MalformedKind, Result};
use crate::export::unique_path;
use crate::layers::{MapColorRole, MapObjectLayer};

pub const PRESET_EXTENSION: &str = "sc4cart";
pub const DEFAULT_PRESET_NAME: &str = "map_appearance.sc4cart";

/// Current container version. Files with any other version are rejected.
pub const FORMAT_VERSION: u16 = 1;

const MAGIC: &[u8; 8] = b"SC4CART\x1a";
const HEADER_LEN: usize = MAGIC.len() + 2 + 4 + 32;

/// On-disk shape of the appearance parameters.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AppearanceRecord {
    grid_segment_size: u32,
    segment_padding_x: u32,
    segment_padding_y: u32,
    segment_offset_x: i32,
    segment_offset_y: i32,
    show_grid_lines: bool,
    show_zone_outlines: bool,
    colors: BTreeMap<MapColorRole, MapColor>,
    visible_layers: Vec<MapObjectLayer>,
    output_format: OutputFormat,
    output_path: String,
}

impl From<&AppearanceModel> for AppearanceRecord {
    fn from(model: &AppearanceModel) -> Self {
        Self {
            grid_segment_size: model.grid_segment_size,
            segment_padding_x: model.segment_padding_x,
            segment_padding_y: model.segment_padding_y,
            segment_offset_x: model.segment_offset_x,
            segment_offset_y: model.segment_offset_y,
            show_grid_lines: model.show_grid_lines,
            show_zone_outlines: model.show_zone_outlines,
            colors: model.colors.iter().collect(),
            visible_layers: model.visible_layers.iter().copied().collect(),
            output_format: model.output_format,
            output_path: model.output_path.clone(),
        }
    }
}

impl TryFrom<AppearanceRecord> for AppearanceModel {
    type Error = MalformedKind;

    fn try_from(record: AppearanceRecord) -> std::result::Result<Self, Self::Error> {
        let colors = ColorTable::from_pairs(record.colors)
            .map_err(|role| MalformedKind::MissingColor(role.to_string()))?;

        let model = AppearanceModel {
            grid_segment_size: record.grid_segment_size,
            segment_padding_x: record.segment_padding_x,
            segment_padding_y: record.segment_padding_y,
            segment_offset_x: record.segment_offset_x,
            segment_offset_y: record.segment_offset_y,
            show_grid_lines: record.show_grid_lines,
            show_zone_outlines: record.show_zone_outlines,
            colors,
            visible_layers: record.visible_layers.into_iter().collect(),
            output_format: record.output_format,
            output_path: record.output_path,
        };
        model
            .validate()
            .map_err(|e| MalformedKind::InvalidField(e.to_string()))?;
        Ok(model)
    }
}

/// Encode a model into preset bytes.
pub fn serialize(model: &AppearanceModel) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(&AppearanceRecord::from(model))?;
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| CartographerError::invalid_appearance("appearance record too large"))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload_len.to_le_bytes());
    bytes.extend_from_slice(blake3::hash(&payload).as_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Header fields of a preset, as read before the payload is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetHeader {
    pub version: u16,
    pub payload_len: usize,
    pub digest: [u8; 32],
}

/// Read and check the container header, returning it with the payload.
pub fn read_header(bytes: &[u8]) -> Result<(PresetHeader, &[u8])> {
    if bytes.len() < MAGIC.len() {
        return malformed(MalformedKind::Truncated { len: bytes.len() });
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return malformed(MalformedKind::BadMagic);
    }
    if bytes.len() < HEADER_LEN {
        return malformed(MalformedKind::Truncated { len: bytes.len() });
    }

    let mut cursor = MAGIC.len();
    let version = u16::from_le_bytes([bytes[cursor], bytes[cursor + 1]]);
    cursor += 2;
    let payload_len = u32::from_le_bytes([
        bytes[cursor],
        bytes[cursor + 1],
        bytes[cursor + 2],
        bytes[cursor + 3],
    ]) as usize;
    cursor += 4;
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&bytes[cursor..cursor + 32]);
    cursor += 32;

    if version != FORMAT_VERSION {
        return malformed(MalformedKind::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let payload = &bytes[cursor..];
    if payload.len() != payload_len {
        return malformed(MalformedKind::LengthMismatch {
            declared: payload_len,
            actual: payload.len(),
        });
    }

    Ok((
        PresetHeader {
            version,
            payload_len,
            digest,
        },
        payload,
    ))
}

fn malformed<T>(kind: MalformedKind) -> Result<T> {
    Err(CartographerError::malformed(kind))
}

/// Decode preset bytes into a fresh model.
pub fn deserialize(bytes: &[u8]) -> Result<AppearanceModel> {
    let (header, payload) = read_header(bytes)?;

    if blake3::hash(payload).as_bytes() != &header.digest {
        return Err(CartographerError::malformed(MalformedKind::ChecksumMismatch));
    }

    let record: AppearanceRecord = serde_json::from_slice(payload)
        .map_err(|e| CartographerError::malformed(MalformedKind::Payload(e.to_string())))?;

    AppearanceModel::try_from(record).map_err(CartographerError::malformed)
}

/// Save a preset to a file.
pub fn save_to_file(model: &AppearanceModel, path: &Path) -> Result<()> {
    let bytes = serialize(model)?;
    fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), "saved map appearance");
    Ok(())
}

/// Load a preset from a file.
pub fn load_from_file(path: &Path) -> Result<AppearanceModel> {
    let bytes = fs::read(path)?;
    match deserialize(&bytes) {
        Ok(model) => {
            tracing::info!(path = %path.display(), "loaded map appearance");
            Ok(model)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load map appearance");
            Err(e)
        }
    }
}

/// Load a preset into `target`. On failure `target` is left as it was.
pub fn load_into(target: &mut AppearanceModel, path: &Path) -> Result<()> {
    *target = load_from_file(path)?;
    Ok(())
}

/// Unused preset path in `dir`, numbered when the default name is taken.
pub fn default_preset_path(dir: &Path) -> PathBuf {
    unique_path(&dir.join(DEFAULT_PRESET_NAME))
}
