//! Player physics: gravity, grounding, ceiling bonks and jumping.
//!
//! These steps only touch the vertical axis. They are split out of the
//! movement integrator so benches and tests can drive them directly.

use super::{CollisionFlags, CollisionResolver, InputAction, InputIntent, Mode, Player};
use crate::settings::PhysicsSettings;
use std::time::Duration;

/// How far below the feet the ground is searched this frame: nothing during
/// the post-jump window, otherwise at least the resting probe and at least
/// the distance the body would fall this frame.
#[must_use]
pub fn down_reach(player: &Player, physics: &PhysicsSettings, dt: f32) -> f32 {
    if player.in_jump_grace() {
        0.0
    } else {
        physics.ground_probe.max(player.body.velocity.y.abs() * dt)
    }
}

/// Downward reach while flying: the resting probe, widened to cover this
/// frame's descent whether it comes from the current speed or the held
/// fly-down key. The jump window does not apply in the air.
#[must_use]
pub fn fly_reach(player: &Player, intent: &InputIntent, physics: &PhysicsSettings, dt: f32) -> f32 {
    let descent = if intent.held(InputAction::FlyDown) { physics.fly_vertical_speed } else { 0.0 };
    physics.ground_probe.max(player.body.velocity.y.abs().max(descent) * dt)
}

/// Vertical velocity while flying: driven by the fly keys, stopped by the
/// ceiling and the ground. No gravity. A body stopped by the ground has its
/// feet put on the ground top, the same as a landing walker.
pub fn flying_step(
    player: &mut Player,
    intent: &InputIntent,
    flags: &CollisionFlags,
    resolver: &CollisionResolver,
    reach: f32,
    physics: &PhysicsSettings,
) {
    let up = f32::from(u8::from(intent.held(InputAction::FlyUp)));
    let down = f32::from(u8::from(intent.held(InputAction::FlyDown)));
    let mut vy = (up - down) * physics.fly_vertical_speed;
    if (vy > 0.0 && flags.up) || (vy < 0.0 && flags.down) {
        vy = 0.0;
    }
    let body = &mut player.body;
    if flags.down && down > up {
        if let Some(top) = resolver.ground_top(body, reach) {
            body.position.y = top as f32 + body.height;
        }
    }
    body.velocity.y = vy;
    player.jumping = false;
}

/// Gravity, grounding and ceiling handling for walking and sneaking.
///
/// A supported body that is not rising lands: its vertical speed is zeroed
/// and its feet snapped onto the ground top (lifting it out if it had sunk
/// in). Otherwise gravity accelerates it until the terminal speed. Hitting a
/// ceiling while rising sends it back down and ends the jump window early.
pub fn walking_step(
    player: &mut Player,
    flags: &CollisionFlags,
    resolver: &CollisionResolver,
    reach: f32,
    physics: &PhysicsSettings,
    dt: f32,
) {
    let body = &mut player.body;
    if flags.down && body.velocity.y <= 0.0 {
        body.velocity.y = 0.0;
        player.jumping = false;
        if let Some(top) = resolver.ground_top(body, reach) {
            body.position.y = top as f32 + body.height;
        }
    } else {
        if body.velocity.y.abs() < physics.terminal_velocity {
            body.velocity.y -= physics.gravity * dt;
        }
        body.velocity.y = body
            .velocity
            .y
            .max(-physics.terminal_velocity)
            .min(physics.terminal_velocity.max(physics.jump_velocity));
    }

    if flags.up && body.velocity.y > 0.0 {
        body.velocity.y = -physics.bonk_speed;
        let remaining = player.grace.remaining();
        player.grace.tick(remaining);
    }
}

/// Start a jump when supported and not already jumping. Returns whether it did.
pub fn try_jump(player: &mut Player, intent: &InputIntent, flags: &CollisionFlags, physics: &PhysicsSettings) -> bool {
    if player.mode == Mode::Flying || !intent.held(InputAction::Jump) || !flags.down || player.jumping {
        return false;
    }
    player.body.velocity.y = physics.jump_velocity;
    player.jumping = true;
    player.grace.set_duration(Duration::from_secs_f32(physics.jump_grace_secs.max(0.0)));
    player.grace.reset();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Body, Phase};
    use crate::world::testing::flat_world;
    use bevy::math::Vec3;

    fn player_at(y: f32) -> Player {
        Player::new(Body::new(0.3, 1.8, Vec3::new(0.0, y, 0.0)), &PhysicsSettings::default())
    }

    #[test]
    fn falling_body_accelerates() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let resolver = CollisionResolver::new(&world, &physics);
        let mut player = player_at(40.0);
        let flags = CollisionFlags::default();
        walking_step(&mut player, &flags, &resolver, 0.1, &physics, 0.5);
        assert!((player.body.velocity.y + 16.0).abs() < 1e-4);
    }

    #[test]
    fn fall_speed_is_capped() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let resolver = CollisionResolver::new(&world, &physics);
        let mut player = player_at(400.0);
        for _ in 0..100 {
            walking_step(&mut player, &CollisionFlags::default(), &resolver, 0.1, &physics, 0.1);
        }
        assert!(player.body.velocity.y >= -physics.terminal_velocity);
    }

    #[test]
    fn ceiling_bonk_pushes_down_and_ends_grace() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let resolver = CollisionResolver::new(&world, &physics);
        let mut player = player_at(31.8);
        let grounded = CollisionFlags { down: true, ..CollisionFlags::default() };
        let mut intent = InputIntent::default();
        intent.apply(InputAction::Jump, Phase::Pressed);
        assert!(try_jump(&mut player, &intent, &grounded, &physics));
        assert!(player.in_jump_grace());

        let ceiling = CollisionFlags { up: true, ..CollisionFlags::default() };
        walking_step(&mut player, &ceiling, &resolver, 0.0, &physics, 0.01);
        assert!((player.body.velocity.y + physics.bonk_speed).abs() < 1e-6);
        assert!(!player.in_jump_grace());
    }

    #[test]
    fn no_double_jump() {
        let physics = PhysicsSettings::default();
        let mut player = player_at(31.8);
        let grounded = CollisionFlags { down: true, ..CollisionFlags::default() };
        let mut intent = InputIntent::default();
        intent.apply(InputAction::Jump, Phase::Held);
        assert!(try_jump(&mut player, &intent, &grounded, &physics));
        assert!(!try_jump(&mut player, &intent, &grounded, &physics));
        assert!(!try_jump(&mut player_at(40.0), &intent, &CollisionFlags::default(), &physics));
    }

    #[test]
    fn flying_stops_at_the_ground() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let resolver = CollisionResolver::new(&world, &physics);
        let mut player = player_at(31.8);
        let mut intent = InputIntent::default();
        intent.apply(InputAction::FlyDown, Phase::Held);
        flying_step(&mut player, &intent, &CollisionFlags { down: true, ..CollisionFlags::default() }, &resolver, 0.1, &physics);
        assert_eq!(player.body.velocity.y, 0.0);
        flying_step(&mut player, &intent, &CollisionFlags::default(), &resolver, 0.1, &physics);
        assert!((player.body.velocity.y + physics.fly_vertical_speed).abs() < 1e-6);
    }

    #[test]
    fn descending_flyer_lands_on_the_ground_top() {
        let world = flat_world();
        let physics = PhysicsSettings::default();
        let resolver = CollisionResolver::new(&world, &physics);
        // Feet sunk 0.2 into the top row.
        let mut player = player_at(31.6);
        let mut intent = InputIntent::default();
        intent.apply(InputAction::FlyDown, Phase::Held);
        let reach = fly_reach(&player, &intent, &physics, 1.0 / 30.0);
        let flags = resolver.resolve(&player.body, Mode::Flying, reach);
        flying_step(&mut player, &intent, &flags, &resolver, reach, &physics);
        assert!((player.body.position.y - 31.8).abs() < 1e-4);
        assert_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn fly_reach_covers_the_held_descent() {
        let physics = PhysicsSettings::default();
        let player = player_at(40.0);
        let mut intent = InputIntent::default();
        assert!((fly_reach(&player, &intent, &physics, 1.0 / 30.0) - physics.ground_probe).abs() < 1e-6);
        intent.apply(InputAction::FlyDown, Phase::Held);
        let expected = physics.fly_vertical_speed / 30.0;
        assert!((fly_reach(&player, &intent, &physics, 1.0 / 30.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn reach_is_zero_during_grace_and_grows_with_speed() {
        let physics = PhysicsSettings::default();
        let mut player = player_at(40.0);
        assert!((down_reach(&player, &physics, 0.016) - physics.ground_probe).abs() < 1e-6);
        player.body.velocity.y = -50.0;
        assert!((down_reach(&player, &physics, 0.1) - 5.0).abs() < 1e-5);
        player.grace.reset();
        assert_eq!(down_reach(&player, &physics, 0.1), 0.0);
    }
}
