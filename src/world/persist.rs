//! Saving and restoring the player's edits.
//!
//! Only the seed and the grid records are stored; the terrain is regenerated
//! from the seed on load.

use super::{BlockEvent, VoxelWorld};
use crate::block::{Block, BlockGrid};
use crate::error::SnapshotError;
use crate::terrain::HeightField;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u32,
    pub blocks: Vec<Block>,
}

impl WorldSnapshot {
    /// # Errors
    /// Fails if RON serialisation fails.
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// # Errors
    /// Fails if `text` is not a valid snapshot.
    pub fn from_ron(text: &str) -> Result<Self, SnapshotError> {
        Ok(ron::from_str(text)?)
    }

    /// # Errors
    /// Fails on serialisation or I/O errors.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// # Errors
    /// Fails on I/O errors or malformed content.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }
}

impl VoxelWorld {
    /// Capture every record, sorted by position so equal worlds produce equal files.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut blocks: Vec<Block> = self.grid.all().copied().collect();
        blocks.sort_by_key(|b| (b.position.x, b.position.y, b.position.z));
        WorldSnapshot { seed: self.terrain.seed(), blocks }
    }

    /// Replace the layout with `snapshot`. Records are restored verbatim,
    /// without lock or capacity checks. A different seed regenerates the terrain.
    ///
    /// # Errors
    /// [`SnapshotError::DuplicateCell`] if two records share a cell; the world
    /// is left untouched in that case.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
        let mut grid = BlockGrid::new(self.grid.registry().clone(), self.grid.max_per_material());
        for block in &snapshot.blocks {
            if !grid.insert_raw(*block) {
                return Err(SnapshotError::DuplicateCell(block.position));
            }
        }
        grid.check_counts();

        if snapshot.seed != self.terrain.seed() {
            let mut settings = self.terrain.settings().clone();
            settings.seed = snapshot.seed;
            let baked = self.terrain.baked_map().is_some();
            self.terrain = HeightField::new(&settings);
            if baked {
                self.terrain.bake();
            }
            info!("terrain regenerated for seed {}", snapshot.seed);
        }

        self.grid = grid;
        self.emit(BlockEvent::Restored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::blocks;
    use crate::world::testing::flat_world;

    #[test]
    fn snapshot_round_trips_through_ron() {
        let mut world = flat_world();
        world.grid_mut().place(IVec3::new(1, 31, 1), blocks::BRICK).unwrap();
        world.grid_mut().mark_removed(IVec3::new(2, 30, 2), blocks::GRASS);

        let snapshot = world.snapshot();
        let text = snapshot.to_ron().unwrap();
        let parsed = WorldSnapshot::from_ron(&text).unwrap();
        assert_eq!(parsed, snapshot);

        let mut other = flat_world();
        other.restore(&parsed).unwrap();
        assert!(other.grid().has(IVec3::new(1, 31, 1)));
        assert!(!other.is_solid(IVec3::new(2, 30, 2)));
        assert_eq!(other.grid().count(blocks::BRICK), 1);
        assert_eq!(other.snapshot(), snapshot);
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let mut world = flat_world();
        let block = Block { position: IVec3::new(0, 31, 0), material: blocks::PLANKS, placed: true };
        let snapshot = WorldSnapshot { seed: world.terrain().seed(), blocks: vec![block, block] };
        assert!(matches!(world.restore(&snapshot), Err(SnapshotError::DuplicateCell(_))));
        assert!(world.grid().is_empty());
    }

    #[test]
    fn different_seed_regenerates_terrain() {
        let mut world = flat_world();
        world.restore(&WorldSnapshot { seed: 7, blocks: Vec::new() }).unwrap();
        assert_eq!(world.terrain().seed(), 7);
    }

    #[test]
    fn malformed_text_is_a_decode_error() {
        assert!(matches!(WorldSnapshot::from_ron("(seed: \"x\")"), Err(SnapshotError::Decode(_))));
    }
}
