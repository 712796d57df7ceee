//! Crosshair targeting: walks the cells along a ray and reports the first
//! solid one, whether a player block or untouched terrain.
//!
//! The walk is a voxel DDA, visiting every cell the ray passes through in
//! order of distance, so it cannot tunnel through corners the way fixed-step
//! marching does.
//!
//! ```rust
//! use voxel_builder::block::{HitSource, raycast};
//! use voxel_builder::settings::{BuildSettings, TerrainSettings};
//! use voxel_builder::world::VoxelWorld;
//! use bevy::math::{IVec3, Vec3};
//!
//! let terrain = TerrainSettings { amplitude: 0, ..TerrainSettings::default() };
//! let world = VoxelWorld::new(&terrain, &BuildSettings::default(), Default::default());
//!
//! // Looking straight down from above the flat surface at y = 30.
//! let hit = raycast(&world, Vec3::new(0.0, 32.5, 0.0), Vec3::NEG_Y, 8.0).expect("ground in reach");
//! assert_eq!(hit.cell, IVec3::new(0, 30, 0));
//! assert_eq!(hit.normal, IVec3::Y);
//! assert_eq!(hit.source, HitSource::Terrain);
//! assert_eq!(hit.placement_cell(), IVec3::new(0, 31, 0));
//! ```

use crate::world::VoxelWorld;
use bevy::math::{IVec3, Vec3};

/// Moves positions into a frame where cell `v` spans `[v, v + 1)` on every axis.
const CELL_OFFSET: Vec3 = Vec3::new(0.5, 1.0, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Block,
    Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Where the ray enters the hit cell.
    pub point: Vec3,
    /// Outward normal of the face that was hit.
    pub normal: IVec3,
    pub cell: IVec3,
    pub distance: f32,
    pub source: HitSource,
}

impl RaycastHit {
    /// Empty cell in front of the hit face, where a new block would go.
    #[must_use]
    pub fn placement_cell(&self) -> IVec3 {
        self.cell + self.normal
    }
}

/// Cast a ray through the world and return the first solid cell within `reach`.
///
/// # Arguments
/// * `world` - occupancy to test against (records first, then terrain)
/// * `origin` - start of the ray, usually the camera position
/// * `direction` - need not be normalised; a zero vector never hits
/// * `reach` - maximum distance along the ray
///
/// A ray starting inside a solid cell hits it at distance zero, with the
/// normal facing back along the ray's dominant axis. When the ray crosses an
/// edge or corner exactly, every cell touched at that distance is considered
/// and a player block is preferred over terrain.
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub fn raycast(world: &VoxelWorld, origin: Vec3, direction: Vec3, reach: f32) -> Option<RaycastHit> {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO || !origin.is_finite() || reach.is_nan() || reach < 0.0 {
        return None;
    }

    let g = origin + CELL_OFFSET;
    let mut voxel = g.floor().as_ivec3();
    let step = IVec3::new(axis_step(dir.x), axis_step(dir.y), axis_step(dir.z));

    let mut t_delta = Vec3::splat(f32::INFINITY);
    let mut t_max = Vec3::splat(f32::INFINITY);
    for a in 0..3 {
        if step[a] == 0 {
            continue;
        }
        let inv = 1.0 / dir[a].abs();
        t_delta[a] = inv;
        let boundary = if step[a] > 0 { voxel[a] as f32 + 1.0 - g[a] } else { g[a] - voxel[a] as f32 };
        t_max[a] = boundary * inv;
    }

    if let Some(source) = world.solid_source(voxel) {
        let axis = dominant_axis(dir);
        let mut normal = IVec3::ZERO;
        normal[axis] = -step[axis];
        return Some(RaycastHit { point: origin, normal, cell: voxel, distance: 0.0, source });
    }

    // Each iteration crosses at least one boundary, at least 1/sqrt(3) apart.
    let max_steps = (reach * 3.0).ceil() as usize + 3;
    for _ in 0..max_steps {
        let t = t_max.min_element();
        if t > reach {
            return None;
        }
        let tied: Vec<usize> = (0..3).filter(|&a| t_max[a] == t).collect();

        let mut candidates: Vec<(IVec3, usize)> = tied
            .iter()
            .map(|&a| {
                let mut cell = voxel;
                cell[a] += step[a];
                (cell, a)
            })
            .collect();
        if tied.len() > 1 {
            let mut corner = voxel;
            for &a in &tied {
                corner[a] += step[a];
            }
            let axis = tied.iter().copied().max_by(|&a, &b| dir[a].abs().total_cmp(&dir[b].abs())).unwrap_or(tied[0]);
            candidates.push((corner, axis));
        }

        let mut best: Option<(IVec3, usize, HitSource)> = None;
        for (cell, axis) in candidates {
            let Some(source) = world.solid_source(cell) else { continue };
            let better = match best {
                None => true,
                Some((_, _, prev)) => prev == HitSource::Terrain && source == HitSource::Block,
            };
            if better {
                best = Some((cell, axis, source));
            }
        }

        if let Some((cell, axis, source)) = best {
            let mut normal = IVec3::ZERO;
            normal[axis] = -step[axis];
            return Some(RaycastHit { point: origin + dir * t, normal, cell, distance: t, source });
        }

        for &a in &tied {
            voxel[a] += step[a];
            t_max[a] += t_delta[a];
        }
    }
    None
}

fn axis_step(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn dominant_axis(dir: Vec3) -> usize {
    let a = dir.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    }
}
