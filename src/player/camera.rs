//! Mouse look and cursor capture for the first-person camera.
//!
//! `camera_look` turns this frame's mouse motion into yaw and pitch on the
//! player entity; `cursor_grab` locks the cursor on click and releases it on
//! the pause key. Look input is ignored while the cursor is free.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::player::Player;
use crate::settings::Settings;

const MAX_PITCH_DEG: f32 = 85.0;
const SENSITIVITY_SCALE: f32 = 1.0 / 10_000.0;

/// Look orientation in radians. Yaw turns around +Y, pitch around the local X axis.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerLook {
    /// Apply a raw mouse delta, honouring the inversion and sensitivity
    /// settings. Pitch is clamped short of straight up and down.
    pub fn apply_delta(&mut self, delta: Vec2, settings: &Settings) {
        let controls = &settings.controls;
        let mut delta = delta;
        if controls.invert_x {
            delta.x = -delta.x;
        }
        if controls.invert_y {
            delta.y = -delta.y;
        }
        let max_pitch = MAX_PITCH_DEG.to_radians();
        let scale = controls.mouse_sensitivity * SENSITIVITY_SCALE;
        self.yaw -= delta.x * scale;
        self.pitch = (self.pitch - delta.y * scale).clamp(-max_pitch, max_pitch);
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(bevy::math::EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Turn this frame's mouse motion into the player's look rotation.
///
/// # Arguments
/// * `windows` - primary window, to check the cursor is captured
/// * `motion_events` - raw mouse motion for this update
/// * `settings` - sensitivity and axis inversion
/// * `query` - player camera transform and look state
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    windows: Query<&Window, With<PrimaryWindow>>,
    motion_events: Res<Events<MouseMotion>>,
    settings: Res<Settings>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
) {
    let delta: Vec2 = motion_events.iter_current_update_events().map(|ev| ev.delta).sum();
    if delta == Vec2::ZERO {
        return;
    }
    let Ok(window) = windows.get_single() else { return };
    if window.cursor.grab_mode != CursorGrabMode::Locked {
        return;
    }

    for (mut transform, mut look) in &mut query {
        look.apply_delta(delta, &settings);
        transform.rotation = look.rotation();
    }
}

/// Lock the cursor on a left click and release it on the pause key.
///
/// # Arguments
/// * `windows` - primary window whose cursor is grabbed
/// * `mouse` - mouse button input
/// * `keyboard` - keyboard input for the pause binding
/// * `settings` - key bindings
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    let Ok(mut window) = windows.get_single_mut() else { return };
    if mouse.just_pressed(MouseButton::Left) && window.cursor.grab_mode != CursorGrabMode::Locked {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    }
    if keyboard.just_pressed(settings.controls.key_for("pause", KeyCode::Escape)) {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}
