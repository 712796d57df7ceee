//! Mapping between continuous positions and integer cells.
//!
//! Cell `(x, y, z)` covers `[x - 0.5, x + 0.5] × (y - 1, y] × [z - 0.5, z + 0.5]`:
//! columns are centred on integer coordinates and a cell's top face sits at
//! `y`, so a body resting on cell `y` has its feet at exactly `y`.

use bevy::math::{IVec3, Vec3};
use std::ops::RangeInclusive;

/// Column index containing horizontal coordinate `v`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn column(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Cell containing `p`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cell_at(p: Vec3) -> IVec3 {
    IVec3::new(column(p.x), p.y.ceil() as i32, column(p.z))
}

#[must_use]
pub fn cell_min(cell: IVec3) -> Vec3 {
    Vec3::new(cell.x as f32 - 0.5, cell.y as f32 - 1.0, cell.z as f32 - 0.5)
}

#[must_use]
pub fn cell_max(cell: IVec3) -> Vec3 {
    Vec3::new(cell.x as f32 + 0.5, cell.y as f32, cell.z as f32 + 0.5)
}

/// Centre of the cell, where the viewer draws its cube.
#[must_use]
pub fn cell_center(cell: IVec3) -> Vec3 {
    Vec3::new(cell.x as f32, cell.y as f32 - 0.5, cell.z as f32)
}

/// Cell rows whose vertical extent intersects the open interval `(low, high)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rows_between(low: f32, high: f32) -> RangeInclusive<i32> {
    if high <= low {
        return 1..=0;
    }
    (low.floor() as i32 + 1)..=(high.ceil() as i32)
}

/// Strict overlap between a box and a cell. Touching faces do not count.
#[must_use]
pub fn box_overlaps_cell(min: Vec3, max: Vec3, cell: IVec3) -> bool {
    let (cmin, cmax) = (cell_min(cell), cell_max(cell));
    min.x < cmax.x && max.x > cmin.x && min.y < cmax.y && max.y > cmin.y && min.z < cmax.z && max.z > cmin.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_face_belongs_to_the_cell_below() {
        assert_eq!(cell_at(Vec3::new(0.0, 30.0, 0.0)), IVec3::new(0, 30, 0));
        assert_eq!(cell_at(Vec3::new(0.4, 30.2, -0.4)), IVec3::new(0, 31, 0));
        assert_eq!(cell_at(Vec3::new(0.6, 29.9, -0.6)), IVec3::new(1, 30, -1));
    }

    #[test]
    fn rows_for_open_intervals() {
        assert_eq!(rows_between(31.0, 32.8), 32..=33);
        assert_eq!(rows_between(30.9, 31.0), 31..=31);
        assert!(rows_between(31.0, 31.0).is_empty());
    }

    #[test]
    fn touching_is_not_overlapping() {
        let cell = IVec3::new(0, 31, 0);
        assert!(!box_overlaps_cell(Vec3::new(-0.3, 31.0, -0.3), Vec3::new(0.3, 32.8, 0.3), cell));
        assert!(box_overlaps_cell(Vec3::new(-0.3, 30.5, -0.3), Vec3::new(0.3, 32.3, 0.3), cell));
        assert!(!box_overlaps_cell(Vec3::new(0.5, 30.5, -0.3), Vec3::new(1.1, 32.3, 0.3), cell));
    }
}
