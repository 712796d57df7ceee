//! Procedural terrain: a deterministic height field over a square play area.
//!
//! Heights come from improved Perlin noise sampled at
//! `(x / wavelength, z / wavelength, seed)`: the seed is the third noise
//! coordinate, so changing it yields a different landscape without
//! re-seeding the generator. A second, independent band decides where the
//! surface is bare stone; it never changes the shape.
//!
//! A column `(x, z)` is solid from the bedrock layer (`floor_y`) up to and
//! including `height_at(x, z)`. The field is immutable; digging is recorded as
//! per-cell overrides in [`crate::block::BlockGrid`].

use crate::block::{BlockId, MaterialRegistry, blocks};
use crate::settings::TerrainSettings;
use noise::{NoiseFn, Perlin};
use rayon::prelude::*;

pub mod bake;
pub use bake::HeightMap;

// Generator seeds are fixed; the configured seed only moves the sample plane.
const SHAPE_GENERATOR_SEED: u32 = 0x5EED_0001;
const STONE_GENERATOR_SEED: u32 = 0x5EED_0002;

/// Deterministic terrain height function and its material layering.
pub struct HeightField {
    settings: TerrainSettings,
    shape: Perlin,
    stone: Perlin,
    baked: Option<HeightMap>,
}

impl HeightField {
    /// Build a field from settings. Nonsensical values are clamped: the
    /// wavelengths to at least one block, the amplitude and extent to zero or more.
    #[must_use]
    pub fn new(settings: &TerrainSettings) -> Self {
        let mut settings = settings.clone();
        settings.wavelength = settings.wavelength.max(1.0);
        settings.stone_wavelength = settings.stone_wavelength.max(1.0);
        settings.amplitude = settings.amplitude.max(0);
        settings.half_extent = settings.half_extent.max(0);
        settings.dirt_depth = settings.dirt_depth.max(0);

        Self {
            settings,
            shape: Perlin::new(SHAPE_GENERATOR_SEED),
            stone: Perlin::new(STONE_GENERATOR_SEED),
            baked: None,
        }
    }

    /// Same as [`HeightField::new`] followed by [`HeightField::bake`].
    #[must_use]
    pub fn baked(settings: &TerrainSettings) -> Self {
        let mut field = Self::new(settings);
        field.bake();
        field
    }

    #[must_use]
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.settings.seed
    }

    #[must_use]
    pub fn base_height(&self) -> i32 {
        self.settings.base_height
    }

    #[must_use]
    pub fn floor_y(&self) -> i32 {
        self.settings.floor_y
    }

    #[must_use]
    pub fn half_extent(&self) -> i32 {
        self.settings.half_extent
    }

    /// Whether `(x, z)` lies in the play area: `[-half_extent, half_extent)` on both axes.
    #[must_use]
    pub fn within_bounds(&self, x: i32, z: i32) -> bool {
        let h = self.settings.half_extent;
        (-h..h).contains(&x) && (-h..h).contains(&z)
    }

    /// Terrain height of column `(x, z)`. Out-of-bounds columns report `base_height`.
    #[must_use]
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        if !self.within_bounds(x, z) {
            return self.settings.base_height;
        }
        match &self.baked {
            Some(map) => map.get(x, z).unwrap_or_else(|| self.sample(x, z)),
            None => self.sample(x, z),
        }
    }

    /// Evaluate the noise for one column, bypassing bounds and the baked table.
    #[must_use]
    pub fn sample(&self, x: i32, z: i32) -> i32 {
        let wl = self.settings.wavelength;
        let n = self
            .shape
            .get([f64::from(x) / wl, f64::from(z) / wl, f64::from(self.settings.seed)])
            .clamp(-1.0, 1.0);

        #[allow(clippy::cast_possible_truncation)]
        let offset = (n * f64::from(self.settings.amplitude)).floor() as i32;
        offset + self.settings.base_height
    }

    /// Whether the stone band surfaces at `(x, z)`.
    #[must_use]
    pub fn is_stone_column(&self, x: i32, z: i32) -> bool {
        let wl = self.settings.stone_wavelength;
        let v = self
            .stone
            .get([f64::from(x) / wl, f64::from(z) / wl, f64::from(self.settings.seed)]);
        v * self.settings.stone_amplitude > self.settings.stone_threshold
    }

    /// Top solid cell of the column. Never below the bedrock layer.
    #[must_use]
    pub fn surface_y(&self, x: i32, z: i32) -> i32 {
        self.height_at(x, z).max(self.settings.floor_y)
    }

    /// Whether the untouched terrain fills cell `(x, y, z)`.
    #[must_use]
    pub fn is_terrain(&self, x: i32, y: i32, z: i32) -> bool {
        y >= self.settings.floor_y && y <= self.surface_y(x, z)
    }

    /// Material the untouched terrain has at a cell, or `None` for air.
    #[must_use]
    pub fn material_at(&self, x: i32, y: i32, z: i32, palette: &TerrainPalette) -> Option<BlockId> {
        if !self.is_terrain(x, y, z) {
            return None;
        }
        if y == self.settings.floor_y {
            return Some(palette.bedrock);
        }
        if self.is_stone_column(x, z) {
            return Some(palette.stone);
        }
        let top = self.surface_y(x, z);
        Some(if y == top {
            palette.grass
        } else if y >= top - self.settings.dirt_depth {
            palette.dirt
        } else {
            palette.stone
        })
    }

    /// Precompute every in-bounds height so later lookups are table reads.
    /// Columns are sampled in parallel; the result is identical to sampling lazily.
    pub fn bake(&mut self) {
        let h = self.settings.half_extent;
        let side = usize::try_from(h).unwrap_or(0) * 2;
        let heights: Vec<i32> = (0..side * side)
            .into_par_iter()
            .map(|i| {
                let (x, z) = HeightMap::column_of(i, side, h);
                self.sample(x, z)
            })
            .collect();
        self.baked = Some(HeightMap::from_raw(h, heights));
    }

    #[must_use]
    pub fn baked_map(&self) -> Option<&HeightMap> {
        self.baked.as_ref()
    }
}

/// Material ids used when reporting what a terrain cell is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainPalette {
    pub grass: BlockId,
    pub dirt: BlockId,
    pub stone: BlockId,
    pub bedrock: BlockId,
}

impl TerrainPalette {
    /// Resolve terrain materials by name, falling back to the built-in ids.
    #[must_use]
    pub fn resolve(registry: &MaterialRegistry) -> Self {
        Self {
            grass: registry.id_for_name("grass").unwrap_or(blocks::GRASS),
            dirt: registry.id_for_name("dirt").unwrap_or(blocks::DIRT),
            stone: registry.id_for_name("stone").unwrap_or(blocks::STONE),
            bedrock: registry.id_for_name("bedrock").unwrap_or(blocks::BEDROCK),
        }
    }
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self::resolve(&MaterialRegistry::builtin())
    }
}
