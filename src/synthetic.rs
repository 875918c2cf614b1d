//! Synthetic cities for demos and tests.
//!
//! Terrain is Perlin fBm around SimCity's 250 m sea level; lots are random
//! rectangles drawn from a seeded ChaCha stream, so the same seed always
//! produces the same city.

use noise::{NoiseFn, Perlin, Seedable};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::city::{CityData, SaveIdentity};
use crate::lots::{Lot, ZoneType, ZoneWealth};
use crate::terrain::TerrainGrid;
use crate::tilemap::Tilemap;

const SEA_LEVEL: f32 = 250.0;
const RELIEF: f32 = 180.0;
const OCTAVES: usize = 4;

/// Shape of a synthetic city.
#[derive(Clone, Debug)]
pub struct SyntheticCityConfig {
    pub width: usize,
    pub depth: usize,
    pub lots: usize,
    /// Largest lot edge, in tiles
    pub max_lot_size: u32,
    pub seed: u64,
}

impl Default for SyntheticCityConfig {
    fn default() -> Self {
        Self {
            width: 64,
            depth: 64,
            lots: 120,
            max_lot_size: 4,
            seed: 42,
        }
    }
}

fn fbm(noise: &Perlin, x: f64, y: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for _ in 0..OCTAVES {
        total += noise.get([x * frequency, y * frequency]) * amplitude;
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    total / norm
}

/// Elevation grid for a synthetic city.
pub fn generate_terrain(width: usize, depth: usize, seed: u64) -> TerrainGrid {
    let terrain_noise = Perlin::new(1).set_seed(seed as u32);
    let mut heights = Tilemap::new_with(width, depth, SEA_LEVEL);
    for z in 0..depth {
        for x in 0..width {
            let nx = x as f64 / width.max(1) as f64 * 3.0;
            let nz = z as f64 / depth.max(1) as f64 * 3.0;
            let h = SEA_LEVEL + fbm(&terrain_noise, nx, nz) as f32 * RELIEF;
            heights.set(x, z, h);
        }
    }
    TerrainGrid::new(heights)
}

/// Random lots inside a `width` x `depth` grid. Lots may overlap.
pub fn generate_lots(config: &SyntheticCityConfig, rng: &mut impl Rng) -> Vec<Lot> {
    if config.width == 0 || config.depth == 0 {
        return Vec::new();
    }
    let max_size = config.max_lot_size.max(1);
    (0..config.lots)
        .map(|_| {
            let zone_type = *ZoneType::all()
                .choose(rng)
                .unwrap_or(&ZoneType::Residential);
            let wealth = if zone_type.has_wealth() {
                *[ZoneWealth::Low, ZoneWealth::Medium, ZoneWealth::High]
                    .choose(rng)
                    .unwrap_or(&ZoneWealth::Low)
            } else {
                ZoneWealth::None
            };
            let w = rng.gen_range(1..=max_size);
            let d = rng.gen_range(1..=max_size);
            let x = rng.gen_range(0..config.width as u32);
            let z = rng.gen_range(0..config.depth as u32);
            let max_x = (x + w - 1).min(config.width as u32 - 1);
            let max_z = (z + d - 1).min(config.depth as u32 - 1);
            Lot::new(zone_type, wealth, (x, max_x), (z, max_z))
        })
        .collect()
}

/// A full synthetic city.
pub fn generate_city(config: &SyntheticCityConfig) -> CityData {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let terrain = generate_terrain(config.width, config.depth, config.seed);
    let lots = generate_lots(config, &mut rng);
    CityData::new(
        SaveIdentity::named(format!("City - Synthetic {}", config.seed)),
        Some(terrain),
        lots,
    )
}
