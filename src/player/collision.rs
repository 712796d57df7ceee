//! Six-sided collision checks between the player body and the world.
//!
//! Horizontal sides use world axes: front is -Z, back is +Z, left is -X and
//! right is +X. All lookups go through [`VoxelWorld::is_solid`], so player
//! blocks, dug cells and untouched terrain are treated alike, and columns
//! outside the play area fall back to the base terrain height.

use super::{Body, Mode};
use crate::settings::PhysicsSettings;
use crate::world::VoxelWorld;
use crate::world::cell::{cell_at, column, rows_between};
use bevy::math::{IVec3, Vec3};

/// Highest a buried body is lifted in one grounding step.
const MAX_UNBURY_CELLS: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Side {
    pub const ALL: [Side; 6] = [Side::Front, Side::Back, Side::Left, Side::Right, Side::Up, Side::Down];
    pub const HORIZONTAL: [Side; 4] = [Side::Front, Side::Back, Side::Left, Side::Right];

    #[must_use]
    pub fn direction(self) -> Vec3 {
        match self {
            Side::Front => Vec3::NEG_Z,
            Side::Back => Vec3::Z,
            Side::Left => Vec3::NEG_X,
            Side::Right => Vec3::X,
            Side::Up => Vec3::Y,
            Side::Down => Vec3::NEG_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub front: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl CollisionFlags {
    #[must_use]
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::Front => self.front,
            Side::Back => self.back,
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Up => self.up,
            Side::Down => self.down,
        }
    }

    pub fn set(&mut self, side: Side, blocked: bool) {
        match side {
            Side::Front => self.front = blocked,
            Side::Back => self.back = blocked,
            Side::Left => self.left = blocked,
            Side::Right => self.right = blocked,
            Side::Up => self.up = blocked,
            Side::Down => self.down = blocked,
        }
    }
}

/// Read-only collision queries for one frame.
pub struct CollisionResolver<'a> {
    world: &'a VoxelWorld,
    physics: &'a PhysicsSettings,
}

impl<'a> CollisionResolver<'a> {
    #[must_use]
    pub fn new(world: &'a VoxelWorld, physics: &'a PhysicsSettings) -> Self {
        Self { world, physics }
    }

    /// Compute all six flags at the body's current position.
    ///
    /// `down_reach` is how far below the feet the ground is searched; zero
    /// disables the check. The sneaking ledge rule only applies while the
    /// body is supported.
    #[must_use]
    pub fn resolve(&self, body: &Body, mode: Mode, down_reach: f32) -> CollisionFlags {
        let mut flags = CollisionFlags {
            up: self.check_up(body),
            down: self.check_down(body, down_reach),
            ..CollisionFlags::default()
        };
        let ledges = mode == Mode::Sneaking && flags.down;
        for side in Side::HORIZONTAL {
            let blocked = self.check_side(body, side) || (ledges && self.ledge_ahead(body, side));
            flags.set(side, blocked);
        }
        flags
    }

    /// Check a single side.
    #[must_use]
    pub fn check(&self, side: Side, body: &Body, mode: Mode, down_reach: f32) -> bool {
        match side {
            Side::Up => self.check_up(body),
            Side::Down => self.check_down(body, down_reach),
            _ => {
                self.check_side(body, side)
                    || (mode == Mode::Sneaking && self.check_down(body, down_reach) && self.ledge_ahead(body, side))
            }
        }
    }

    /// Horizontal probe: from the footprint edge, one body width further out,
    /// sampled across the footprint at feet, below-eye and eye level.
    fn check_side(&self, body: &Body, side: Side) -> bool {
        let dir = side.direction();
        let lateral = Vec3::new(dir.z.abs(), 0.0, dir.x.abs());
        let w = body.width;
        let reach = body.position + dir * (2.0 * w);
        let heights = [body.feet() + 0.05, body.position.y - 1.0, body.position.y];

        [-w, 0.0, w].into_iter().any(|offset| {
            let p = reach + lateral * offset;
            heights.iter().any(|&y| self.world.is_solid(cell_at(Vec3::new(p.x, y, p.z))))
        })
    }

    fn check_up(&self, body: &Body) -> bool {
        let eye = body.position.y;
        let rows = rows_between(eye, eye + self.physics.head_probe);
        self.footprint(body)
            .any(|(x, z)| rows.clone().any(|y| self.world.is_solid(IVec3::new(x, y, z))))
    }

    fn check_down(&self, body: &Body, reach: f32) -> bool {
        self.ground_top(body, reach).is_some()
    }

    /// Top of the ground supporting the body, searched `reach` below the
    /// feet. A body sunk into the ground is lifted along its centre column
    /// to the first free cell.
    #[must_use]
    pub fn ground_top(&self, body: &Body, reach: f32) -> Option<i32> {
        if reach <= 0.0 {
            return None;
        }
        let feet = body.feet();
        let rows = rows_between(feet - reach, feet);
        let mut top = self
            .footprint(body)
            .filter_map(|(x, z)| rows.clone().rev().find(|&y| self.world.is_solid(IVec3::new(x, y, z))))
            .max()?;

        let (cx, cz) = (column(body.position.x), column(body.position.z));
        let mut lifted = 0;
        while lifted < MAX_UNBURY_CELLS && self.world.is_solid(IVec3::new(cx, top + 1, cz)) {
            top += 1;
            lifted += 1;
        }
        Some(top)
    }

    /// Sneaking guard: true when nothing ahead is within `sneak_ledge_drop`
    /// below the feet.
    fn ledge_ahead(&self, body: &Body, side: Side) -> bool {
        let ahead = body.position + side.direction() * (2.0 * body.width);
        let (x, z) = (column(ahead.x), column(ahead.z));
        let feet = body.feet();
        #[allow(clippy::cast_possible_truncation)]
        let (lowest, highest) = ((feet - self.physics.sneak_ledge_drop).ceil() as i32, feet.ceil() as i32);
        !(lowest..=highest).any(|y| self.world.is_solid(IVec3::new(x, y, z)))
    }

    /// Columns under the corners, edge midpoints and centre of the footprint.
    fn footprint(&self, body: &Body) -> impl Iterator<Item = (i32, i32)> + '_ {
        let w = body.width;
        let p = body.position;
        [-w, 0.0, w]
            .into_iter()
            .flat_map(move |dx| [-w, 0.0, w].into_iter().map(move |dz| (column(p.x + dx), column(p.z + dz))))
    }
}
