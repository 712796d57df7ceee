//! Error types returned by the block grid, the placement protocol and the
//! snapshot layer.
//!
//! Every variant is a recoverable, local condition. The movement and collision
//! path never produces these: it has total fallbacks instead.

use crate::block::BlockId;
use bevy::math::IVec3;
use thiserror::Error;

/// Reasons a block mutation was refused. The grid is left untouched whenever
/// one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cell {0} is already occupied")]
    AlreadyOccupied(IVec3),
    #[error("material {0} is locked at the current tier")]
    MaterialLocked(BlockId),
    #[error("material {material} reached its limit of {limit} blocks")]
    CapacityExceeded { material: BlockId, limit: usize },
    #[error("nothing targeted within reach")]
    NoTarget,
    #[error("cell {0} is protected and cannot be removed")]
    Protected(IVec3),
    #[error("no block recorded at {0}")]
    NotFound(IVec3),
    #[error("cell {0} is outside the play area")]
    OutOfBounds(IVec3),
    #[error("material {0} is not in the catalog")]
    UnknownMaterial(BlockId),
}

/// Failures while saving or restoring a [`crate::world::persist::WorldSnapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read or write snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] ron::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("snapshot lists cell {0} twice")]
    DuplicateCell(IVec3),
}
