//! Player body, movement state and the systems that drive them (input,
//! movement, camera).
//!
//! # Example:
//!
//! ```ignore
//! // spawn an entity with camera and player state
//! commands.spawn((
//!     Camera3dBundle::default(),
//!     Player::new(Body::from_settings(&settings.physics, spawn), &settings.physics),
//!     PlayerLook::default(),
//! ));
//! // register systems
//! app.add_systems(Update, (gather_intent, player_movement, camera_look).chain());
//! ```
pub mod camera;
pub mod collision;
pub mod input;
pub mod movement;
pub mod physics;

use crate::settings::PhysicsSettings;
use bevy::prelude::*;
use std::time::Duration;

pub use camera::*;
pub use collision::{CollisionFlags, CollisionResolver, Side};
pub use input::{InputAction, InputIntent, Phase, gather_intent};
pub use movement::{MovementIntegrator, player_movement};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Walking,
    Sneaking,
    Flying,
}

/// The player's collidable volume. `position` is the eye (camera) position;
/// the feet are `height` below it and the footprint extends `width` to each
/// side horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub width: f32,
    pub height: f32,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Body {
    #[must_use]
    pub fn new(width: f32, height: f32, position: Vec3) -> Self {
        Self { width, height, position, velocity: Vec3::ZERO }
    }

    #[must_use]
    pub fn from_settings(physics: &PhysicsSettings, position: Vec3) -> Self {
        Self::new(physics.body_width, physics.body_height, position)
    }

    #[must_use]
    pub fn feet(&self) -> f32 {
        self.position.y - self.height
    }

    /// Bounding box as `(min, max)` corners.
    #[must_use]
    pub fn aabb(&self) -> (Vec3, Vec3) {
        let half = Vec3::new(self.width, 0.0, self.width);
        let feet = Vec3::new(self.position.x, self.feet(), self.position.z);
        (feet - half, self.position + half)
    }
}

/// Component tracking player state used by the movement systems.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub mode: Mode,
    /// Set by a jump, cleared on landing.
    pub jumping: bool,
    /// Flags from the most recent movement step.
    pub flags: CollisionFlags,
    /// Runs after a jump; the ground check is suspended until it finishes.
    pub(crate) grace: Timer,
}

impl Player {
    #[must_use]
    pub fn new(body: Body, physics: &PhysicsSettings) -> Self {
        let mut grace = Timer::new(Duration::from_secs_f32(physics.jump_grace_secs.max(0.0)), TimerMode::Once);
        let remaining = grace.remaining();
        grace.tick(remaining);
        Self { body, mode: Mode::Walking, jumping: false, flags: CollisionFlags::default(), grace }
    }

    #[must_use]
    pub fn grounded(&self) -> bool {
        self.flags.down
    }

    /// Whether the post-jump window is still open.
    #[must_use]
    pub fn in_jump_grace(&self) -> bool {
        !self.grace.finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_spans_feet_to_eye() {
        let body = Body::new(0.3, 1.8, Vec3::new(1.0, 11.8, -2.0));
        let (min, max) = body.aabb();
        assert!((min - Vec3::new(0.7, 10.0, -2.3)).abs().max_element() < 1e-5);
        assert!((max - Vec3::new(1.3, 11.8, -1.7)).abs().max_element() < 1e-5);
    }

    #[test]
    fn new_player_starts_outside_grace() {
        let player = Player::new(Body::new(0.3, 1.8, Vec3::ZERO), &PhysicsSettings::default());
        assert!(!player.in_jump_grace());
        assert_eq!(player.mode, Mode::Walking);
    }
}
