//! Input intent: the movement layer sees actions and their phases, never key
//! codes. `gather_intent` folds the keyboard into an [`InputIntent`] once per
//! frame using the bindings from `controls.keybinds`.

use super::PlayerLook;
use crate::settings::Settings;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
    Sneak,
    Sprint,
    ToggleFly,
    FlyUp,
    FlyDown,
}

impl InputAction {
    pub const ALL: [InputAction; 10] = [
        InputAction::MoveForward,
        InputAction::MoveBackward,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Sneak,
        InputAction::Sprint,
        InputAction::ToggleFly,
        InputAction::FlyUp,
        InputAction::FlyDown,
    ];

    /// Name used in the keybinds map, and the key used when it is unbound.
    #[must_use]
    pub fn binding(self) -> (&'static str, KeyCode) {
        match self {
            InputAction::MoveForward => ("forward", KeyCode::KeyW),
            InputAction::MoveBackward => ("back", KeyCode::KeyS),
            InputAction::MoveLeft => ("left", KeyCode::KeyA),
            InputAction::MoveRight => ("right", KeyCode::KeyD),
            InputAction::Jump => ("jump", KeyCode::Space),
            InputAction::Sneak => ("sneak", KeyCode::ShiftLeft),
            InputAction::Sprint => ("sprint", KeyCode::ControlLeft),
            InputAction::ToggleFly => ("fly", KeyCode::KeyF),
            InputAction::FlyUp => ("fly_up", KeyCode::Space),
            InputAction::FlyDown => ("fly_down", KeyCode::ShiftLeft),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pressed,
    Held,
    Released,
}

/// Boolean action state for one frame plus the look direction.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputIntent {
    pub(crate) held: [bool; InputAction::ALL.len()],
    pub(crate) pressed: [bool; InputAction::ALL.len()],
    /// Camera yaw in radians; movement is relative to it.
    pub yaw: f32,
}

impl InputIntent {
    /// Drop this frame's press edges; held state carries over.
    pub fn begin_frame(&mut self) {
        self.pressed = [false; InputAction::ALL.len()];
    }

    pub fn apply(&mut self, action: InputAction, phase: Phase) {
        let i = action.index();
        match phase {
            Phase::Pressed => {
                self.held[i] = true;
                self.pressed[i] = true;
            }
            Phase::Held => self.held[i] = true,
            Phase::Released => self.held[i] = false,
        }
    }

    #[must_use]
    pub fn held(&self, action: InputAction) -> bool {
        self.held[action.index()]
    }

    #[must_use]
    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    /// Requested horizontal direction in world space, unit length or zero.
    #[must_use]
    pub fn wish_direction(&self) -> Vec3 {
        let axis = |pos: InputAction, neg: InputAction| f32::from(u8::from(self.held(pos))) - f32::from(u8::from(self.held(neg)));
        let forward = Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos());
        let right = Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
        (forward * axis(InputAction::MoveForward, InputAction::MoveBackward)
            + right * axis(InputAction::MoveRight, InputAction::MoveLeft))
        .normalize_or_zero()
    }
}

/// Fold keyboard state into the [`InputIntent`] resource.
#[allow(clippy::needless_pass_by_value)]
pub fn gather_intent(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    looks: Query<&PlayerLook>,
    mut intent: ResMut<InputIntent>,
) {
    intent.begin_frame();
    for action in InputAction::ALL {
        let (name, default) = action.binding();
        let key = settings.controls.key_for(name, default);
        if keyboard.just_pressed(key) {
            intent.apply(action, Phase::Pressed);
        } else if keyboard.pressed(key) {
            intent.apply(action, Phase::Held);
        } else {
            intent.apply(action, Phase::Released);
        }
    }
    if let Ok(look) = looks.get_single() {
        intent.yaw = look.yaw;
    }
}
