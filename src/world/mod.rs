//! The voxel world: the immutable height field, the sparse grid of player
//! edits on top of it, and the observers notified of every change.
//!
//! Occupancy of a cell is decided by its record first. A placed record is
//! solid, a removal marker is air, and a cell with no record is whatever the
//! height field says.
//!
//! # Example:
//!
//! ```
//! use voxel_builder::settings::Settings;
//! use voxel_builder::world::VoxelWorld;
//! use bevy::math::IVec3;
//!
//! let world = VoxelWorld::from_settings(&Settings::default(), Default::default());
//! let top = world.terrain().surface_y(0, 0);
//! assert!(world.is_solid(IVec3::new(0, top, 0)));
//! assert!(!world.is_solid(IVec3::new(0, top + 1, 0)));
//! ```

pub mod cell;
pub mod events;
pub mod persist;
pub mod view;

pub use events::{BlockEvent, BlockObservers, ObserverId};
pub use persist::WorldSnapshot;

use crate::block::{BlockGrid, BlockId, HitSource, MaterialRegistry};
use crate::settings::{BuildSettings, Settings, TerrainSettings};
use crate::terrain::{HeightField, TerrainPalette};
use bevy::prelude::*;

#[derive(Resource)]
pub struct VoxelWorld {
    terrain: HeightField,
    palette: TerrainPalette,
    grid: BlockGrid,
    observers: BlockObservers,
    max_build_height: i32,
}

impl VoxelWorld {
    /// Build a world over a lazily sampled height field.
    #[must_use]
    pub fn new(terrain: &TerrainSettings, build: &BuildSettings, mut registry: MaterialRegistry) -> Self {
        registry.unlock_tier(build.unlocked_tier);
        Self {
            terrain: HeightField::new(terrain),
            palette: TerrainPalette::resolve(&registry),
            grid: BlockGrid::new(registry, build.max_blocks_per_material),
            observers: BlockObservers::default(),
            max_build_height: build.max_build_height,
        }
    }

    /// Build a world from settings and bake its play area up front.
    #[must_use]
    pub fn from_settings(settings: &Settings, registry: MaterialRegistry) -> Self {
        let mut world = Self::new(&settings.terrain, &settings.build, registry);
        world.terrain.bake();
        world
    }

    #[must_use]
    pub fn terrain(&self) -> &HeightField {
        &self.terrain
    }

    #[must_use]
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut BlockGrid {
        &mut self.grid
    }

    #[must_use]
    pub fn registry(&self) -> &MaterialRegistry {
        self.grid.registry()
    }

    #[must_use]
    pub fn palette(&self) -> &TerrainPalette {
        &self.palette
    }

    #[must_use]
    pub fn max_build_height(&self) -> i32 {
        self.max_build_height
    }

    pub fn observers_mut(&mut self) -> &mut BlockObservers {
        &mut self.observers
    }

    pub(crate) fn emit(&mut self, event: BlockEvent) {
        self.observers.notify(&event);
    }

    /// What makes `cell` solid, or `None` for air.
    #[must_use]
    pub fn solid_source(&self, cell: IVec3) -> Option<HitSource> {
        match self.grid.get(cell) {
            Some(block) if block.placed => Some(HitSource::Block),
            Some(_) => None,
            None => self.terrain.is_terrain(cell.x, cell.y, cell.z).then_some(HitSource::Terrain),
        }
    }

    #[must_use]
    pub fn is_solid(&self, cell: IVec3) -> bool {
        self.solid_source(cell).is_some()
    }

    /// Material filling `cell`, or `None` for air.
    #[must_use]
    pub fn material_at(&self, cell: IVec3) -> Option<BlockId> {
        match self.grid.get(cell) {
            Some(block) => block.placed.then_some(block.material),
            None => self.terrain_material_at(cell),
        }
    }

    /// Material the untouched height field has at `cell`.
    #[must_use]
    pub fn terrain_material_at(&self, cell: IVec3) -> Option<BlockId> {
        self.terrain.material_at(cell.x, cell.y, cell.z, &self.palette)
    }

    /// Whether a block may be built in `cell` at all: inside the play area,
    /// above the bedrock layer and not above the build height.
    #[must_use]
    pub fn in_build_area(&self, cell: IVec3) -> bool {
        self.terrain.within_bounds(cell.x, cell.z)
            && cell.y > self.terrain.floor_y()
            && cell.y <= self.max_build_height
    }

    /// Top of the highest solid cell in column `(x, z)`.
    #[must_use]
    pub fn column_top(&self, x: i32, z: i32) -> i32 {
        let surface = self.terrain.surface_y(x, z);
        let start = self.max_build_height.max(surface);
        (self.terrain.floor_y()..=start)
            .rev()
            .find(|&y| self.is_solid(IVec3::new(x, y, z)))
            .unwrap_or(self.terrain.floor_y())
    }

    /// Eye position of a body of `body_height` standing on the spawn column.
    #[must_use]
    pub fn spawn_position(&self, body_height: f32) -> Vec3 {
        Vec3::new(0.0, self.column_top(0, 0) as f32 + body_height, 0.0)
    }

    /// Swap in a new material catalog, keeping the unlocked tier.
    pub fn replace_materials(&mut self, mut registry: MaterialRegistry) {
        registry.unlock_tier(self.grid.registry().unlocked_tier());
        self.palette = TerrainPalette::resolve(&registry);
        self.grid.set_registry(registry);
    }

    /// Raise the tier of placeable materials.
    pub fn unlock_tier(&mut self, tier: u8) {
        let mut registry = self.grid.registry().clone();
        registry.unlock_tier(tier);
        self.grid.set_registry(registry);
        info!("materials unlocked up to tier {tier}");
    }

    /// Take over the build limits and unlocked tier from reloaded settings.
    /// Existing blocks are kept even where they now exceed a limit.
    pub fn apply_build_settings(&mut self, build: &BuildSettings) {
        self.max_build_height = build.max_build_height;
        self.grid.set_max_per_material(build.max_blocks_per_material);
        if build.unlocked_tier != self.registry().unlocked_tier() {
            self.unlock_tier(build.unlocked_tier);
        }
    }

    /// Drop every player edit.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.emit(BlockEvent::Restored);
    }
}

/// Worlds shared by tests across the crate.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Flat grass field with its surface at y = 30 and tiers up to 2 unlocked.
    pub(crate) fn flat_world() -> VoxelWorld {
        let terrain = TerrainSettings { amplitude: 0, stone_threshold: 10.0, ..TerrainSettings::default() };
        let mut world = VoxelWorld::new(&terrain, &BuildSettings::default(), MaterialRegistry::builtin());
        world.unlock_tier(2);
        world
    }
}

#[cfg(test)]
mod tests {
    use super::testing::flat_world;
    use super::*;
    use crate::block::blocks;
    use crate::error::BuildError;

    #[test]
    fn records_override_terrain() {
        let mut world = flat_world();
        let ground = IVec3::new(0, 30, 0);
        let above = IVec3::new(0, 31, 0);
        assert_eq!(world.solid_source(ground), Some(HitSource::Terrain));
        assert_eq!(world.material_at(ground), Some(blocks::GRASS));

        world.grid_mut().mark_removed(ground, blocks::GRASS);
        assert!(!world.is_solid(ground));
        assert_eq!(world.material_at(ground), None);

        world.grid_mut().place(above, blocks::PLANKS).unwrap();
        assert_eq!(world.solid_source(above), Some(HitSource::Block));
        assert_eq!(world.material_at(above), Some(blocks::PLANKS));
    }

    #[test]
    fn spawn_stands_on_highest_solid_cell() {
        let mut world = flat_world();
        let spawn = world.spawn_position(1.8);
        assert!((spawn.y - 31.8).abs() < 1e-5 && spawn.x == 0.0 && spawn.z == 0.0);
        world.grid_mut().place(IVec3::new(0, 33, 0), blocks::STONE).unwrap();
        assert_eq!(world.column_top(0, 0), 33);
    }

    #[test]
    fn build_area_limits() {
        let world = flat_world();
        assert!(world.in_build_area(IVec3::new(0, 31, 0)));
        assert!(!world.in_build_area(IVec3::new(64, 31, 0)));
        assert!(!world.in_build_area(IVec3::new(0, 0, 0)));
        assert!(!world.in_build_area(IVec3::new(0, 97, 0)));
    }

    #[test]
    fn reset_clears_edits_and_notifies() {
        use std::sync::{Arc, Mutex};
        let mut world = flat_world();
        world.grid_mut().place(IVec3::new(0, 31, 0), blocks::PLANKS).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        world.observers_mut().subscribe(move |e| sink.lock().unwrap().push(*e));
        world.reset();
        assert!(world.grid().is_empty());
        assert_eq!(*events.lock().unwrap(), vec![BlockEvent::Restored]);
    }

    #[test]
    fn reloaded_build_settings_reach_the_world() {
        let mut world = flat_world();
        let column = IVec3::new(0, 31, 0);
        for y in 31..33 {
            world.grid_mut().place(IVec3::new(0, y, 0), blocks::PLANKS).unwrap();
        }

        let build = BuildSettings { max_blocks_per_material: 2, max_build_height: 40, unlocked_tier: 3, ..BuildSettings::default() };
        world.apply_build_settings(&build);

        assert_eq!(world.max_build_height(), 40);
        assert!(!world.in_build_area(IVec3::new(0, 41, 0)));
        assert_eq!(
            world.grid_mut().place(IVec3::new(1, 31, 0), blocks::PLANKS),
            Err(BuildError::CapacityExceeded { material: blocks::PLANKS, limit: 2 })
        );
        assert!(!world.registry().is_locked(blocks::CRYSTAL));
        assert!(world.grid().has(column));
    }

    #[test]
    fn replacing_materials_keeps_tier() {
        let mut world = flat_world();
        world.replace_materials(MaterialRegistry::builtin());
        assert_eq!(world.registry().unlocked_tier(), 2);
        assert!(!world.registry().is_locked(blocks::GOLD));
    }
}
