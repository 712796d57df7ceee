//! Blocks: the material catalog, the sparse grid of player edits, crosshair
//! targeting and the place/remove protocol.
//!
//! ```rust,ignore
//! use voxel_builder::block::{blocks, place_at, raycast};
//!
//! let hit = raycast(&world, eye, forward, settings.build.reach);
//! place_at(&mut world, hit.as_ref(), blocks::PLANKS, &body)?;
//! ```

pub mod grid;
pub mod interaction;
pub mod loader;
pub mod placement;
pub mod raycast;
pub mod registry;

pub use grid::{Block, BlockGrid};
pub use interaction::*;
pub use placement::{RemovedBlock, place_at, remove_at};
pub use raycast::{HitSource, RaycastHit, raycast};
pub use registry::{Material, MaterialRegistry};

/// Compact material identifier stored in every block record.
pub type BlockId = u8;

/// Ids of the built-in materials. Catalog files may add more; terrain
/// generation resolves its palette by name and falls back to these.
pub mod blocks {
    use super::BlockId;

    pub const GRASS: BlockId = 1;
    pub const DIRT: BlockId = 2;
    pub const STONE: BlockId = 3;
    pub const BEDROCK: BlockId = 4;
    pub const PLANKS: BlockId = 5;
    pub const BRICK: BlockId = 6;
    pub const GLASS: BlockId = 7;
    pub const GOLD: BlockId = 8;
    pub const MARBLE: BlockId = 9;
    pub const CRYSTAL: BlockId = 10;
}
