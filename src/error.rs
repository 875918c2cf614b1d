//! Error types shared by the whole crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CartographerError>;

#[derive(Debug, Error)]
pub enum CartographerError {
    /// A parameter in the appearance model cannot be rendered.
    #[error("invalid appearance: {reason}")]
    InvalidAppearance { reason: String },

    /// A persisted appearance preset could not be decoded.
    #[error("malformed appearance file: {kind}")]
    MalformedAppearanceFile { kind: MalformedKind },

    /// A terrain lookup fell outside the decoded grid.
    #[error("tile ({x}, {z}) is outside the terrain grid")]
    OutOfBoundsLookup { x: i64, z: i64 },

    #[error("render failed: {reason}")]
    RenderFailure { reason: String },

    /// Decoded city data handed to the core is unusable.
    #[error("invalid city data: {reason}")]
    InvalidCityData { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why an appearance file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("file is truncated ({len} bytes)")]
    Truncated { len: usize },

    #[error("not an appearance file (bad magic)")]
    BadMagic,

    #[error("format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("payload length {declared} does not match {actual} bytes present")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("payload checksum mismatch")]
    ChecksumMismatch,

    #[error("payload could not be decoded: {0}")]
    Payload(String),

    #[error("color table is missing role {0}")]
    MissingColor(String),

    #[error("invalid field: {0}")]
    InvalidField(String),
}

impl CartographerError {
    #[must_use]
    pub fn invalid_appearance(reason: impl Into<String>) -> Self {
        Self::InvalidAppearance {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn render_failure(reason: impl Into<String>) -> Self {
        Self::RenderFailure {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_city(reason: impl Into<String>) -> Self {
        Self::InvalidCityData {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn malformed(kind: MalformedKind) -> Self {
        Self::MalformedAppearanceFile { kind }
    }

    /// The malformed-file kind, if this is a preset decoding error.
    pub fn malformed_kind(&self) -> Option<&MalformedKind> {
        match self {
            Self::MalformedAppearanceFile { kind } => Some(kind),
            _ => None,
        }
    }
}
