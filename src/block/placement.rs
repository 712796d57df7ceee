//! The place/remove protocol run when the player clicks.
//!
//! Both operations take the current crosshair target. Every rejection leaves
//! the world untouched and reports why through [`BuildError`]. Successful
//! mutations notify the world's observers after the grid has changed.

use super::{BlockId, RaycastHit};
use crate::error::BuildError;
use crate::player::Body;
use crate::world::cell::box_overlaps_cell;
use crate::world::{BlockEvent, VoxelWorld};
use bevy::math::IVec3;

/// What [`remove_at`] took out of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedBlock {
    pub position: IVec3,
    pub material: BlockId,
    /// The cell was part of the generated terrain rather than a player block.
    pub was_terrain: bool,
}

/// Place `material` against the targeted face.
///
/// The new block goes in the cell in front of the hit face. Checks, in order:
/// a target exists, the cell is inside the build area, the cell is free and
/// does not overlap `body`, then the grid's material and capacity rules.
///
/// # Errors
/// The first failing check, as a [`BuildError`].
pub fn place_at(
    world: &mut VoxelWorld,
    target: Option<&RaycastHit>,
    material: BlockId,
    body: &Body,
) -> Result<IVec3, BuildError> {
    let hit = target.ok_or(BuildError::NoTarget)?;
    let cell = hit.placement_cell();

    if !world.in_build_area(cell) {
        return Err(BuildError::OutOfBounds(cell));
    }
    let (min, max) = body.aabb();
    if world.is_solid(cell) || box_overlaps_cell(min, max, cell) {
        return Err(BuildError::AlreadyOccupied(cell));
    }

    world.grid_mut().place(cell, material)?;
    world.emit(BlockEvent::Placed { position: cell, material });
    Ok(cell)
}

/// Remove the targeted cell.
///
/// Player blocks are deleted outright. Terrain cells are dug out by leaving a
/// removal marker tagged with the palette's dirt, since the height field
/// itself never changes. Protected materials are reported and left in place.
///
/// # Errors
/// [`BuildError::NoTarget`] without a target, [`BuildError::Protected`] for
/// indestructible cells, [`BuildError::NotFound`] if the target is already air.
pub fn remove_at(world: &mut VoxelWorld, target: Option<&RaycastHit>) -> Result<RemovedBlock, BuildError> {
    let hit = target.ok_or(BuildError::NoTarget)?;
    let cell = hit.cell;
    let material = world.material_at(cell).ok_or(BuildError::NotFound(cell))?;

    if world.registry().is_protected(material) {
        world.emit(BlockEvent::ProtectedHit { position: cell });
        return Err(BuildError::Protected(cell));
    }

    let was_terrain = world.grid().get(cell).is_none();
    if !was_terrain {
        world.grid_mut().remove(cell)?;
    }
    if world.terrain_material_at(cell).is_some() {
        let fill = world.palette().dirt;
        world.grid_mut().mark_removed(cell, fill);
    }

    world.emit(BlockEvent::Removed { position: cell, material });
    Ok(RemovedBlock { position: cell, material, was_terrain })
}
