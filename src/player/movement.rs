//! Per-frame movement: mode changes, collision flags, vertical physics,
//! jumping, then sub-stepped wall sliding and integration, in that order.

use super::physics::{down_reach, fly_reach, flying_step, try_jump, walking_step};
use super::{CollisionFlags, CollisionResolver, InputAction, InputIntent, Mode, Player, Side};
use crate::settings::{PhysicsSettings, Settings};
use crate::world::VoxelWorld;
use bevy::prelude::*;
use std::time::Duration;

const SLIDE_EPSILON: f32 = 1e-3;
/// Upper bound on horizontal sub-steps in one tick.
const MAX_SUBSTEPS: usize = 256;

/// Advances a [`Player`] through one frame against a read-only world.
pub struct MovementIntegrator<'a> {
    world: &'a VoxelWorld,
    physics: &'a PhysicsSettings,
}

impl<'a> MovementIntegrator<'a> {
    #[must_use]
    pub fn new(world: &'a VoxelWorld, physics: &'a PhysicsSettings) -> Self {
        Self { world, physics }
    }

    /// Run one tick of `dt` seconds. Never fails: every lookup has a defined
    /// answer, and a body that falls out of the world is put back at spawn.
    pub fn update(&self, player: &mut Player, intent: &InputIntent, dt: f32) {
        let dt = dt.max(0.0);
        player.grace.tick(Duration::from_secs_f32(dt));
        apply_mode_transitions(player, intent);

        let resolver = CollisionResolver::new(self.world, self.physics);
        let reach = if player.mode == Mode::Flying {
            fly_reach(player, intent, self.physics, dt)
        } else {
            down_reach(player, self.physics, dt)
        };
        let flags = resolver.resolve(&player.body, player.mode, reach);
        player.flags = flags;

        let before_snap = player.body.position.y;
        if player.mode == Mode::Flying {
            flying_step(player, intent, &flags, &resolver, reach, self.physics);
        } else {
            walking_step(player, &flags, &resolver, reach, self.physics, dt);
            try_jump(player, intent, &flags, self.physics);
        }
        if (player.body.position.y - before_snap).abs() > f32::EPSILON {
            // Side flags taken while sunk into the ground are stale.
            player.flags = resolver.resolve(&player.body, player.mode, reach);
        }

        let wish = intent.wish_direction() * self.speed(player.mode, intent);
        move_horizontally(player, Vec2::new(wish.x, wish.z), &resolver, reach, dt);
        player.body.position.y += player.body.velocity.y * dt;

        if player.body.position.y < self.physics.fall_limit {
            let spawn = self.world.spawn_position(player.body.height);
            warn!("player fell out of the world at {:?}, returning to {spawn:?}", player.body.position);
            player.body.position = spawn;
            player.body.velocity = Vec3::ZERO;
            player.jumping = false;
        }
    }

    fn speed(&self, mode: Mode, intent: &InputIntent) -> f32 {
        match mode {
            Mode::Flying => self.physics.fly_speed,
            Mode::Sneaking => self.physics.sneak_speed,
            Mode::Walking if intent.held(InputAction::Sprint) => self.physics.walk_speed * self.physics.sprint_multiplier,
            Mode::Walking => self.physics.walk_speed,
        }
    }
}

/// Horizontal movement in sub-steps no longer than the body's `width`,
/// with the side flags refreshed before each one, so a long frame cannot
/// carry the body through a wall.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn move_horizontally(player: &mut Player, wish: Vec2, resolver: &CollisionResolver, reach: f32, dt: f32) {
    let distance = wish.length() * dt;
    let steps = if player.body.width > 0.0 && distance > player.body.width {
        ((distance / player.body.width).ceil() as usize).min(MAX_SUBSTEPS)
    } else {
        1
    };
    let step_dt = dt / steps as f32;

    let mut flags = player.flags;
    let mut velocity = wall_slide(wish, &flags);
    for step in 0..steps {
        if step > 0 {
            for side in Side::HORIZONTAL {
                flags.set(side, resolver.check(side, &player.body, player.mode, reach));
            }
            velocity = wall_slide(wish, &flags);
        }
        player.body.position.x += velocity.x * step_dt;
        player.body.position.z += velocity.y * step_dt;
    }

    player.flags = flags;
    player.body.velocity.x = velocity.x;
    player.body.velocity.z = velocity.y;
}

/// Mode state machine. Fly toggles on a press; sneaking follows the held
/// sneak key, except mid-jump and while flying.
pub fn apply_mode_transitions(player: &mut Player, intent: &InputIntent) {
    if intent.just_pressed(InputAction::ToggleFly) {
        player.mode = match player.mode {
            Mode::Flying => Mode::Walking,
            Mode::Walking | Mode::Sneaking => Mode::Flying,
        };
        player.body.velocity.y = 0.0;
        player.jumping = false;
        debug!("movement mode is now {:?}", player.mode);
        return;
    }

    let sneak = intent.held(InputAction::Sneak);
    match player.mode {
        Mode::Walking if sneak && !player.jumping => player.mode = Mode::Sneaking,
        Mode::Sneaking if !sneak => player.mode = Mode::Walking,
        _ => {}
    }
}

/// Remove the components of `wish` that push into blocked sides. When only
/// one axis is blocked, the full speed is redirected along the other so the
/// body keeps sliding along the wall.
#[must_use]
pub fn wall_slide(wish: Vec2, flags: &CollisionFlags) -> Vec2 {
    let speed = wish.length();
    // Rounding noise from the camera yaw must not turn a head-on push into a slide.
    let wish = Vec2::select(wish.abs().cmplt(Vec2::splat(speed * SLIDE_EPSILON)), Vec2::ZERO, wish);
    let blocked_x = (wish.x < 0.0 && flags.left) || (wish.x > 0.0 && flags.right);
    let blocked_z = (wish.y < 0.0 && flags.front) || (wish.y > 0.0 && flags.back);

    match (blocked_x, blocked_z) {
        (false, false) => wish,
        (true, true) => Vec2::ZERO,
        (true, false) if wish.y != 0.0 => Vec2::new(0.0, wish.y.signum() * speed),
        (false, true) if wish.x != 0.0 => Vec2::new(wish.x.signum() * speed, 0.0),
        _ => Vec2::ZERO,
    }
}

/// Drive the player entity from the current [`InputIntent`] and copy the body
/// position onto the camera transform.
///
/// # Arguments
/// * `time` - frame delta
/// * `world` - the world collided against
/// * `settings` - physics tuning
/// * `intent` - this frame's movement intent
/// * `query` - player transform and movement state
#[allow(clippy::needless_pass_by_value)]
pub fn player_movement(
    time: Res<Time>,
    world: Res<VoxelWorld>,
    settings: Res<Settings>,
    intent: Res<InputIntent>,
    mut query: Query<(&mut Transform, &mut Player)>,
) {
    let integrator = MovementIntegrator::new(&world, &settings.physics);
    for (mut transform, mut player) in &mut query {
        integrator.update(&mut player, &intent, time.delta_seconds());
        transform.translation = player.body.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::blocks;
    use crate::player::{Body, Phase};
    use crate::world::testing::flat_world;

    const DT: f32 = 1.0 / 60.0;

    fn player_at(x: f32, y: f32, z: f32) -> Player {
        Player::new(Body::new(0.3, 1.8, Vec3::new(x, y, z)), &PhysicsSettings::default())
    }

    #[test]
    fn buried_body_is_grounded_in_one_tick() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let mut player = player_at(0.0, 25.0, 0.0);
        MovementIntegrator::new(&world, &physics).update(&mut player, &InputIntent::default(), DT);

        assert!((player.body.position.y - 31.8).abs() < 1e-4);
        assert!(player.flags.down);
        assert_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn jump_has_a_grace_window_then_lands() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let integrator = MovementIntegrator::new(&world, &physics);
        let mut player = player_at(0.0, 31.8, 0.0);
        integrator.update(&mut player, &InputIntent::default(), DT);
        assert!(player.grounded());

        let mut intent = InputIntent::default();
        intent.apply(InputAction::Jump, Phase::Pressed);
        integrator.update(&mut player, &intent, DT);
        assert_eq!(player.body.velocity.y, physics.jump_velocity);
        assert!(player.jumping);

        intent.apply(InputAction::Jump, Phase::Released);
        let grace_ticks = (physics.jump_grace_secs / DT) as usize - 1;
        for _ in 0..grace_ticks {
            intent.begin_frame();
            integrator.update(&mut player, &intent, DT);
            assert!(!player.flags.down);
            assert!(player.jumping);
            assert!(player.body.position.y > 31.8);
        }

        for _ in 0..120 {
            integrator.update(&mut player, &intent, DT);
        }
        assert!(player.grounded());
        assert!(!player.jumping);
        assert!((player.body.position.y - 31.8).abs() < 1e-4);
    }

    #[test]
    fn flying_without_input_holds_height() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let integrator = MovementIntegrator::new(&world, &physics);
        let mut player = player_at(0.0, 40.0, 0.0);

        let mut intent = InputIntent::default();
        intent.apply(InputAction::ToggleFly, Phase::Pressed);
        integrator.update(&mut player, &intent, DT);
        assert_eq!(player.mode, Mode::Flying);

        intent.apply(InputAction::ToggleFly, Phase::Released);
        for _ in 0..300 {
            intent.begin_frame();
            integrator.update(&mut player, &intent, DT);
        }
        assert_eq!(player.body.position.y, 40.0);
    }

    #[test]
    fn mode_transitions() {
        let mut player = player_at(0.0, 31.8, 0.0);
        let mut intent = InputIntent::default();

        intent.apply(InputAction::Sneak, Phase::Pressed);
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Sneaking);

        intent.begin_frame();
        intent.apply(InputAction::ToggleFly, Phase::Pressed);
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Flying);

        // Sneak does nothing while flying.
        intent.begin_frame();
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Flying);

        intent.apply(InputAction::ToggleFly, Phase::Pressed);
        intent.apply(InputAction::Sneak, Phase::Released);
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Walking);
    }

    #[test]
    fn no_sneaking_mid_jump() {
        let mut player = player_at(0.0, 33.0, 0.0);
        player.jumping = true;
        let mut intent = InputIntent::default();
        intent.apply(InputAction::Sneak, Phase::Held);
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Walking);

        player.jumping = false;
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Sneaking);

        intent.apply(InputAction::Sneak, Phase::Released);
        apply_mode_transitions(&mut player, &intent);
        assert_eq!(player.mode, Mode::Walking);
    }

    #[test]
    fn wall_slide_redirects_blocked_component() {
        let wish = Vec2::new(3.0, -4.0);
        let against_right = CollisionFlags { right: true, ..CollisionFlags::default() };
        assert_eq!(wall_slide(wish, &against_right), Vec2::new(0.0, -5.0));

        let against_front = CollisionFlags { front: true, ..CollisionFlags::default() };
        assert_eq!(wall_slide(wish, &against_front), Vec2::new(5.0, 0.0));

        let corner = CollisionFlags { right: true, front: true, ..CollisionFlags::default() };
        assert_eq!(wall_slide(wish, &corner), Vec2::ZERO);

        // Moving away from a wall is unaffected.
        let behind = CollisionFlags { left: true, back: true, ..CollisionFlags::default() };
        assert_eq!(wall_slide(wish, &behind), wish);

        let head_on = Vec2::new(5.0, 0.0);
        assert_eq!(wall_slide(head_on, &against_right), Vec2::ZERO);
    }

    #[test]
    fn walking_into_a_wall_stops_short() {
        let mut world = flat_world();
        for y in 31..=33 {
            world.grid_mut().place(IVec3::new(3, y, 0), blocks::STONE).unwrap();
        }
        let physics = PhysicsSettings::default();
        let integrator = MovementIntegrator::new(&world, &physics);
        let mut player = player_at(0.0, 31.8, 0.0);
        let mut intent = InputIntent { yaw: -std::f32::consts::FRAC_PI_2, ..InputIntent::default() };
        intent.apply(InputAction::MoveForward, Phase::Held);

        for _ in 0..240 {
            integrator.update(&mut player, &intent, DT);
        }
        assert!(player.flags.right);
        assert!(player.body.position.x + player.body.width < 2.5);
        assert!((player.body.position.y - 31.8).abs() < 1e-4);
    }

    #[test]
    fn long_frame_does_not_cross_a_wall() {
        let mut world = flat_world();
        for y in 31..=33 {
            world.grid_mut().place(IVec3::new(3, y, 0), blocks::STONE).unwrap();
        }
        let physics = PhysicsSettings::default();
        let integrator = MovementIntegrator::new(&world, &physics);
        let mut player = player_at(1.8, 31.8, 0.0);
        let mut intent = InputIntent { yaw: -std::f32::consts::FRAC_PI_2, ..InputIntent::default() };
        intent.apply(InputAction::MoveForward, Phase::Held);

        integrator.update(&mut player, &intent, 0.25);
        assert!(player.body.position.x > 1.8);
        assert!(player.body.position.x + player.body.width < 2.5);
        assert!(player.flags.right);

        for _ in 0..8 {
            integrator.update(&mut player, &intent, 0.25);
        }
        assert!(player.body.position.x + player.body.width < 2.5);
    }

    #[test]
    fn flying_down_at_low_frame_rate_lands_and_moves_on() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let integrator = MovementIntegrator::new(&world, &physics);
        let dt = 1.0 / 30.0;
        let mut player = player_at(0.0, 32.8, 0.0);

        let mut intent = InputIntent::default();
        intent.apply(InputAction::ToggleFly, Phase::Pressed);
        intent.apply(InputAction::FlyDown, Phase::Held);
        integrator.update(&mut player, &intent, dt);
        assert_eq!(player.mode, Mode::Flying);

        intent.apply(InputAction::ToggleFly, Phase::Released);
        for _ in 0..30 {
            intent.begin_frame();
            integrator.update(&mut player, &intent, dt);
        }
        assert!((player.body.position.y - 31.8).abs() < 1e-4);
        assert!(player.flags.down);
        assert!(!(player.flags.front || player.flags.back || player.flags.left || player.flags.right));

        intent.yaw = -std::f32::consts::FRAC_PI_2;
        intent.apply(InputAction::MoveForward, Phase::Held);
        for _ in 0..15 {
            intent.begin_frame();
            integrator.update(&mut player, &intent, dt);
        }
        assert!(player.body.position.x > 4.0);
        assert!((player.body.position.y - 31.8).abs() < 1e-4);
    }

    #[test]
    fn falling_out_of_the_world_returns_to_spawn() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let mut player = player_at(100.0, -70.0, 100.0);
        MovementIntegrator::new(&world, &physics).update(&mut player, &InputIntent::default(), DT);
        assert!((player.body.position - world.spawn_position(1.8)).length() < 1e-4);
        assert_eq!(player.body.velocity, Vec3::ZERO);
    }
}
