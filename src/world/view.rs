//! Which cells a viewer has to draw.
//!
//! A solid cell is drawn when at least one of its six neighbours is empty.
//! Nothing exists under the bedrock layer, so the bottom face of the floor
//! never counts as exposed.

use super::VoxelWorld;
use bevy::math::IVec3;

pub const NEIGHBOURS: [IVec3; 6] = [IVec3::X, IVec3::NEG_X, IVec3::Y, IVec3::NEG_Y, IVec3::Z, IVec3::NEG_Z];

impl VoxelWorld {
    #[must_use]
    pub fn is_exposed(&self, cell: IVec3) -> bool {
        if !self.is_solid(cell) {
            return false;
        }
        let floor = self.terrain().floor_y();
        NEIGHBOURS.iter().any(|offset| {
            let n = cell + *offset;
            n.y >= floor && !self.is_solid(n)
        })
    }

    /// Every exposed cell in the square of columns within `radius` of the
    /// origin, from the floor up to the build ceiling.
    #[must_use]
    pub fn exposed_cells(&self, radius: i32) -> Vec<IVec3> {
        let radius = radius.max(0);
        let floor = self.terrain().floor_y();
        let mut out = Vec::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                let top = self.column_top(x, z).max(self.max_build_height());
                out.extend((floor..=top).map(|y| IVec3::new(x, y, z)).filter(|c| self.is_exposed(*c)));
            }
        }
        out
    }
}

/// A cell and its six neighbours: everything whose exposure can change when
/// `cell` is edited.
#[must_use]
pub fn affected_cells(cell: IVec3) -> [IVec3; 7] {
    let mut out = [cell; 7];
    for (slot, offset) in out[1..].iter_mut().zip(NEIGHBOURS) {
        *slot = cell + offset;
    }
    out
}
