//! Decoded city data and the sources it comes from.
//!
//! The binary save reader lives outside this crate. Whatever decodes a
//! save hands the core a [`CitySource`]: an identity for cache keying plus
//! the terrain grid and lot list.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{CartographerError, Result};
use crate::lots::Lot;
use crate::terrain::TerrainGrid;

/// Identifies one loaded save. Two sources with equal identities are
/// assumed to decode to the same data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SaveIdentity {
    pub name: String,
    pub path: Option<PathBuf>,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SaveIdentity {
    /// Identity for data that does not come from a file.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            len: 0,
            modified: None,
        }
    }

    /// Identity from a file's path, size and modification time.
    pub fn for_file(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: Some(path.to_path_buf()),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    /// Default file name for maps exported from this save: the save name
    /// without SimCity's `"City - "` prefix.
    pub fn default_map_name(&self) -> String {
        let name = self.name.strip_prefix("City - ").unwrap_or(&self.name);
        if name.is_empty() {
            "map".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Provider of decoded save data.
pub trait CitySource {
    fn identity(&self) -> SaveIdentity;

    /// Terrain grid, if the save has one.
    fn terrain(&self) -> Result<Option<TerrainGrid>>;

    fn lots(&self) -> Result<Vec<Lot>>;

    /// Identity, terrain and lots from a single decode. Sources backed by
    /// mutable storage override this so the three always describe the same
    /// version of the save.
    fn load(&self) -> Result<CityData> {
        Ok(CityData::new(self.identity(), self.terrain()?, self.lots()?))
    }
}

/// Decoded save data held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct CityData {
    pub identity: SaveIdentity,
    pub terrain: Option<TerrainGrid>,
    pub lots: Vec<Lot>,
}

impl CityData {
    pub fn new(identity: SaveIdentity, terrain: Option<TerrainGrid>, lots: Vec<Lot>) -> Self {
        Self {
            identity,
            terrain,
            lots,
        }
    }
}

impl CitySource for CityData {
    fn identity(&self) -> SaveIdentity {
        self.identity.clone()
    }

    fn load(&self) -> Result<CityData> {
        Ok(self.clone())
    }

    fn terrain(&self) -> Result<Option<TerrainGrid>> {
        Ok(self.terrain.clone())
    }

    fn lots(&self) -> Result<Vec<Lot>> {
        Ok(self.lots.clone())
    }
}

/// JSON form of decoded city data, as written by save-dumping tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityRecord {
    /// Elevations indexed `[z][x]`.
    #[serde(default)]
    pub terrain: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    pub lots: Vec<Lot>,
}

impl CityRecord {
    fn terrain_grid(&self) -> Result<Option<TerrainGrid>> {
        self.terrain
            .as_ref()
            .map(|rows| TerrainGrid::from_rows(rows))
            .transpose()
    }
}

/// A JSON city dump on disk, identified by its path, size and mtime.
/// Nothing is kept in memory; the preview orchestrator caches the result
/// of [`CitySource::load`] by identity.
#[derive(Clone, Debug)]
pub struct CityFile {
    path: PathBuf,
}

impl CityFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(CartographerError::invalid_city(format!(
                "{} is not a file",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CityRecord> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl CitySource for CityFile {
    fn identity(&self) -> SaveIdentity {
        SaveIdentity::for_file(&self.path).unwrap_or_else(|_| SaveIdentity {
            path: Some(self.path.clone()),
            ..SaveIdentity::named(self.path.to_string_lossy())
        })
    }

    fn terrain(&self) -> Result<Option<TerrainGrid>> {
        self.read()?.terrain_grid()
    }

    fn lots(&self) -> Result<Vec<Lot>> {
        Ok(self.read()?.lots)
    }

    /// One read of the file. The identity is taken before reading, so a
    /// rewrite during the read shows up as a new identity next time.
    fn load(&self) -> Result<CityData> {
        let identity = SaveIdentity::for_file(&self.path)?;
        let record = self.read()?;
        let terrain = record.terrain_grid()?;
        Ok(CityData::new(identity, terrain, record.lots))
    }
}

/// Write decoded city data as JSON.
pub fn write_city_json(city: &CityData, path: &Path) -> Result<()> {
    let terrain = city.terrain.as_ref().map(|t| {
        (0..t.depth() as i64)
            .map(|z| {
                (0..t.width() as i64)
                    .map(|x| t.height(x, z).unwrap_or_default())
                    .collect()
            })
            .collect()
    });
    let record = CityRecord {
        terrain,
        lots: city.lots.clone(),
    };
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &record)?;
    Ok(())
}
