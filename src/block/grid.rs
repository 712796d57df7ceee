//! Sparse record of every block the player has placed or dug out.
//!
//! The grid stores one [`Block`] per coordinate at most. A record with
//! `placed == true` is a solid player block; a record with `placed == false`
//! is a removal marker that turns a terrain cell into air. Cells with no
//! record fall back to the height field.

use super::{BlockId, MaterialRegistry};
use crate::error::BuildError;
use bevy::math::IVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub position: IVec3,
    pub material: BlockId,
    pub placed: bool,
}

#[derive(Debug, Clone)]
pub struct BlockGrid {
    blocks: HashMap<IVec3, Block>,
    counts: HashMap<BlockId, usize>, // placed records only
    registry: MaterialRegistry,
    max_per_material: usize,
}

impl BlockGrid {
    #[must_use]
    pub fn new(registry: MaterialRegistry, max_per_material: usize) -> Self {
        Self {
            blocks: HashMap::new(),
            counts: HashMap::new(),
            registry,
            max_per_material,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    /// Swap the material catalog. Existing records are kept even if their
    /// material disappears from the new catalog.
    pub fn set_registry(&mut self, registry: MaterialRegistry) {
        self.registry = registry;
    }

    #[must_use]
    pub fn max_per_material(&self) -> usize {
        self.max_per_material
    }

    /// Change the per-material limit. Materials already over a lowered limit
    /// keep their blocks but accept no more.
    pub fn set_max_per_material(&mut self, limit: usize) {
        self.max_per_material = limit;
    }

    /// Whether a placed (solid) record exists at `pos`.
    #[must_use]
    pub fn has(&self, pos: IVec3) -> bool {
        self.blocks.get(&pos).is_some_and(|b| b.placed)
    }

    /// Any record at `pos`, removal markers included.
    #[must_use]
    pub fn get(&self, pos: IVec3) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    /// Record a placed block at `pos`.
    ///
    /// Checks run in a fixed order so callers see a stable reason: an existing
    /// placed record, an unknown material, a locked material, then the
    /// per-material limit. A removal marker at `pos` is replaced.
    ///
    /// # Errors
    /// Returns the first failing [`BuildError`]; the grid is unchanged.
    pub fn place(&mut self, pos: IVec3, material: BlockId) -> Result<Block, BuildError> {
        if self.has(pos) {
            return Err(BuildError::AlreadyOccupied(pos));
        }
        if !self.registry.contains(material) {
            return Err(BuildError::UnknownMaterial(material));
        }
        if self.registry.is_locked(material) {
            return Err(BuildError::MaterialLocked(material));
        }
        if self.count(material) >= self.max_per_material {
            return Err(BuildError::CapacityExceeded { material, limit: self.max_per_material });
        }

        let block = Block { position: pos, material, placed: true };
        self.blocks.insert(pos, block);
        *self.counts.entry(material).or_insert(0) += 1;
        Ok(block)
    }

    /// Delete the record at `pos`, whatever kind it is.
    ///
    /// # Errors
    /// [`BuildError::NotFound`] when there is no record at `pos`.
    pub fn remove(&mut self, pos: IVec3) -> Result<Block, BuildError> {
        let block = self.blocks.remove(&pos).ok_or(BuildError::NotFound(pos))?;
        if block.placed {
            self.decrement(block.material);
        }
        Ok(block)
    }

    /// Record that the terrain cell at `pos` has been dug out. Any placed
    /// record there is dropped. `material` tags the marker; digging uses dirt.
    pub fn mark_removed(&mut self, pos: IVec3, material: BlockId) {
        let marker = Block { position: pos, material, placed: false };
        if let Some(old) = self.blocks.insert(pos, marker)
            && old.placed
        {
            self.decrement(old.material);
        }
    }

    /// Insert a record as-is, bypassing lock and capacity rules. Used when
    /// restoring a saved layout. Returns `false` if `pos` already had a record.
    pub(crate) fn insert_raw(&mut self, block: Block) -> bool {
        if self.blocks.contains_key(&block.position) {
            return false;
        }
        if block.placed {
            *self.counts.entry(block.material).or_insert(0) += 1;
        }
        self.blocks.insert(block.position, block);
        true
    }

    /// Placed blocks of `material`.
    #[must_use]
    pub fn count(&self, material: BlockId) -> usize {
        self.counts.get(&material).copied().unwrap_or(0)
    }

    /// Number of records, markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of placed (solid) records.
    #[must_use]
    pub fn placed_len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.counts.clear();
    }

    /// Every record, in no particular order.
    pub fn all(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    fn decrement(&mut self, material: BlockId) {
        if let Some(n) = self.counts.get_mut(&material) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                self.counts.remove(&material);
            }
        }
    }

    /// Full recount against the records. Linear in the grid size, so it runs
    /// once after a bulk load rather than on every edit.
    pub(crate) fn check_counts(&self) {
        debug_assert_eq!(
            self.placed_len(),
            self.blocks.values().filter(|b| b.placed).count(),
            "material counters drifted from the records"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::blocks;

    fn grid(limit: usize) -> BlockGrid {
        let mut registry = MaterialRegistry::builtin();
        registry.unlock_tier(2);
        BlockGrid::new(registry, limit)
    }

    #[test]
    fn second_placement_is_rejected() {
        let mut g = grid(16);
        let pos = IVec3::new(1, 40, 1);
        assert!(g.place(pos, blocks::BRICK).is_ok());
        assert_eq!(g.place(pos, blocks::GOLD), Err(BuildError::AlreadyOccupied(pos)));
        assert_eq!(g.get(pos).map(|b| b.material), Some(blocks::BRICK));
        assert_eq!(g.count(blocks::GOLD), 0);
    }

    #[test]
    fn remove_then_place_round_trip() {
        let mut g = grid(16);
        let pos = IVec3::new(0, 35, 0);
        g.place(pos, blocks::PLANKS).unwrap();
        let removed = g.remove(pos).unwrap();
        assert_eq!(removed.material, blocks::PLANKS);
        assert!(!g.has(pos));
        assert_eq!(g.count(blocks::PLANKS), 0);
        g.place(pos, blocks::STONE).unwrap();
        assert!(g.has(pos));
    }

    #[test]
    fn capacity_is_a_hard_ceiling() {
        let mut g = grid(3);
        for x in 0..3 {
            g.place(IVec3::new(x, 40, 0), blocks::PLANKS).unwrap();
        }
        assert_eq!(
            g.place(IVec3::new(9, 40, 0), blocks::PLANKS),
            Err(BuildError::CapacityExceeded { material: blocks::PLANKS, limit: 3 })
        );
        assert_eq!(g.count(blocks::PLANKS), 3);
        assert!(g.get(IVec3::new(9, 40, 0)).is_none());
        assert!(g.place(IVec3::new(9, 40, 0), blocks::STONE).is_ok());
        g.remove(IVec3::new(0, 40, 0)).unwrap();
        assert!(g.place(IVec3::new(9, 41, 0), blocks::PLANKS).is_ok());
    }

    #[test]
    fn bulk_edits_keep_counters_in_step() {
        let mut g = grid(10_000);
        for x in 0..100 {
            for z in 0..100 {
                g.place(IVec3::new(x, 40, z), blocks::STONE).unwrap();
            }
        }
        for x in 0..50 {
            g.mark_removed(IVec3::new(x, 40, 0), blocks::DIRT);
        }
        assert_eq!(g.count(blocks::STONE), 9_950);
        assert_eq!(g.placed_len(), 9_950);
        assert_eq!(g.len(), 10_000);
        g.check_counts();
    }

    #[test]
    fn locked_and_unknown_materials() {
        let mut g = grid(16);
        let pos = IVec3::new(2, 40, 2);
        assert_eq!(g.place(pos, blocks::CRYSTAL), Err(BuildError::MaterialLocked(blocks::CRYSTAL)));
        assert_eq!(g.place(pos, 99), Err(BuildError::UnknownMaterial(99)));
        assert_eq!(g.place(pos, blocks::BEDROCK), Err(BuildError::MaterialLocked(blocks::BEDROCK)));
        assert!(g.is_empty());
    }

    #[test]
    fn occupancy_is_checked_before_material_rules() {
        let mut g = grid(16);
        let pos = IVec3::new(2, 40, 2);
        g.place(pos, blocks::PLANKS).unwrap();
        assert_eq!(g.place(pos, 99), Err(BuildError::AlreadyOccupied(pos)));
    }

    #[test]
    fn markers_are_air_and_uncounted() {
        let mut g = grid(1);
        let pos = IVec3::new(0, 30, 0);
        g.mark_removed(pos, blocks::GRASS);
        assert!(!g.has(pos));
        assert!(g.get(pos).is_some());
        assert_eq!(g.count(blocks::GRASS), 0);
        g.place(pos, blocks::GRASS).unwrap();
        assert!(g.has(pos));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn marking_a_placed_cell_releases_capacity() {
        let mut g = grid(1);
        let pos = IVec3::new(0, 30, 0);
        g.place(pos, blocks::DIRT).unwrap();
        g.mark_removed(pos, blocks::DIRT);
        assert_eq!(g.count(blocks::DIRT), 0);
        assert_eq!(g.placed_len(), 0);
    }

    #[test]
    fn removing_nothing_is_not_found() {
        let mut g = grid(1);
        let pos = IVec3::new(5, 5, 5);
        assert_eq!(g.remove(pos), Err(BuildError::NotFound(pos)));
    }
}
