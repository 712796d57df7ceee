//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`). Every field
//! carries a serde default so partial files stay valid.
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Procedural terrain parameters consumed by [`crate::terrain::HeightField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSettings {
    #[serde(default = "TerrainSettings::default_seed")]
    pub seed: u32, // Noise seed, used as the third noise coordinate.
    #[serde(default = "TerrainSettings::default_base_height")]
    pub base_height: i32, // Height returned for flat ground and for out-of-bounds columns.
    #[serde(default = "TerrainSettings::default_amplitude")]
    pub amplitude: i32, // Maximum deviation from `base_height` in blocks.
    #[serde(default = "TerrainSettings::default_wavelength")]
    pub wavelength: f64, // Horizontal size of one noise period in blocks.
    #[serde(default = "TerrainSettings::default_stone_wavelength")]
    pub stone_wavelength: f64, // Wavelength of the stone band noise.
    #[serde(default = "TerrainSettings::default_stone_amplitude")]
    pub stone_amplitude: f64, // Scale applied to the stone band noise.
    #[serde(default = "TerrainSettings::default_stone_threshold")]
    pub stone_threshold: f64, // Surface turns to stone where the band exceeds this.
    #[serde(default = "TerrainSettings::default_half_extent")]
    pub half_extent: i32, // Half side of the square play area centred on the origin.
    #[serde(default = "TerrainSettings::default_floor_y")]
    pub floor_y: i32, // Bedrock layer; nothing is solid below it.
    #[serde(default = "TerrainSettings::default_dirt_depth")]
    pub dirt_depth: i32, // Number of dirt cells under the grass layer.
}

impl TerrainSettings {
    fn default_seed() -> u32 { 1337 }
    fn default_base_height() -> i32 { 30 }
    fn default_amplitude() -> i32 { 8 }
    fn default_wavelength() -> f64 { 48.0 }
    fn default_stone_wavelength() -> f64 { 24.0 }
    fn default_stone_amplitude() -> f64 { 1.0 }
    fn default_stone_threshold() -> f64 { 0.45 }
    fn default_half_extent() -> i32 { 64 }
    fn default_floor_y() -> i32 { 0 }
    fn default_dirt_depth() -> i32 { 3 }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            base_height: Self::default_base_height(),
            amplitude: Self::default_amplitude(),
            wavelength: Self::default_wavelength(),
            stone_wavelength: Self::default_stone_wavelength(),
            stone_amplitude: Self::default_stone_amplitude(),
            stone_threshold: Self::default_stone_threshold(),
            half_extent: Self::default_half_extent(),
            floor_y: Self::default_floor_y(),
            dirt_depth: Self::default_dirt_depth(),
        }
    }
}

/// Limits applied by the block grid and the placement protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "BuildSettings::default_reach")]
    pub reach: f32, // Maximum crosshair targeting distance in world units.
    #[serde(default = "BuildSettings::default_max_blocks_per_material")]
    pub max_blocks_per_material: usize, // Instance limit per material.
    #[serde(default = "BuildSettings::default_max_build_height")]
    pub max_build_height: i32, // Highest cell a block may be placed in.
    #[serde(default)]
    pub unlocked_tier: u8, // Materials above this tier are locked.
}

impl BuildSettings {
    fn default_reach() -> f32 { 8.0 }
    fn default_max_blocks_per_material() -> usize { 2048 }
    fn default_max_build_height() -> i32 { 96 }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            reach: Self::default_reach(),
            max_blocks_per_material: Self::default_max_blocks_per_material(),
            max_build_height: Self::default_max_build_height(),
            unlocked_tier: 0,
        }
    }
}

/// Player body and movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "PhysicsSettings::default_body_width")]
    pub body_width: f32, // Horizontal half-extent of the player body.
    #[serde(default = "PhysicsSettings::default_body_height")]
    pub body_height: f32, // Distance from the feet to the eye.
    #[serde(default = "PhysicsSettings::default_walk_speed")]
    pub walk_speed: f32,
    #[serde(default = "PhysicsSettings::default_sprint_multiplier")]
    pub sprint_multiplier: f32,
    #[serde(default = "PhysicsSettings::default_sneak_speed")]
    pub sneak_speed: f32,
    #[serde(default = "PhysicsSettings::default_fly_speed")]
    pub fly_speed: f32,
    #[serde(default = "PhysicsSettings::default_fly_vertical_speed")]
    pub fly_vertical_speed: f32,
    #[serde(default = "PhysicsSettings::default_gravity")]
    pub gravity: f32, // Downward acceleration, positive.
    #[serde(default = "PhysicsSettings::default_terminal_velocity")]
    pub terminal_velocity: f32, // Fall speed cap, positive.
    #[serde(default = "PhysicsSettings::default_jump_velocity")]
    pub jump_velocity: f32,
    #[serde(default = "PhysicsSettings::default_jump_grace_secs")]
    pub jump_grace_secs: f32, // Ground checks are suspended this long after a jump.
    #[serde(default = "PhysicsSettings::default_ground_probe")]
    pub ground_probe: f32, // Resting reach of the downward check.
    #[serde(default = "PhysicsSettings::default_head_probe")]
    pub head_probe: f32, // Reach of the upward check above the eye.
    #[serde(default = "PhysicsSettings::default_sneak_ledge_drop")]
    pub sneak_ledge_drop: f32, // Largest drop a sneaking player may step down.
    #[serde(default = "PhysicsSettings::default_bonk_speed")]
    pub bonk_speed: f32, // Downward speed applied when the head hits a ceiling.
    #[serde(default = "PhysicsSettings::default_fall_limit")]
    pub fall_limit: f32, // Below this height the player is sent back to spawn.
}

impl PhysicsSettings {
    fn default_body_width() -> f32 { 0.3 }
    fn default_body_height() -> f32 { 1.8 }
    fn default_walk_speed() -> f32 { 5.0 }
    fn default_sprint_multiplier() -> f32 { 1.6 }
    fn default_sneak_speed() -> f32 { 1.5 }
    fn default_fly_speed() -> f32 { 10.0 }
    fn default_fly_vertical_speed() -> f32 { 8.0 }
    fn default_gravity() -> f32 { 32.0 }
    fn default_terminal_velocity() -> f32 { 50.0 }
    fn default_jump_velocity() -> f32 { 8.0 }
    fn default_jump_grace_secs() -> f32 { 0.3 }
    fn default_ground_probe() -> f32 { 0.1 }
    fn default_head_probe() -> f32 { 1.2 }
    fn default_sneak_ledge_drop() -> f32 { 1.0 }
    fn default_bonk_speed() -> f32 { 2.0 }
    fn default_fall_limit() -> f32 { -64.0 }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            body_width: Self::default_body_width(),
            body_height: Self::default_body_height(),
            walk_speed: Self::default_walk_speed(),
            sprint_multiplier: Self::default_sprint_multiplier(),
            sneak_speed: Self::default_sneak_speed(),
            fly_speed: Self::default_fly_speed(),
            fly_vertical_speed: Self::default_fly_vertical_speed(),
            gravity: Self::default_gravity(),
            terminal_velocity: Self::default_terminal_velocity(),
            jump_velocity: Self::default_jump_velocity(),
            jump_grace_secs: Self::default_jump_grace_secs(),
            ground_probe: Self::default_ground_probe(),
            head_probe: Self::default_head_probe(),
            sneak_ledge_drop: Self::default_sneak_ledge_drop(),
            bonk_speed: Self::default_bonk_speed(),
            fall_limit: Self::default_fall_limit(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("sneak", "LShift"),
            ("sprint", "LCtrl"),
            ("fly", "F"),
            ("fly_up", "Space"),
            ("fly_down", "LShift"),
            ("pause", "Escape"),
            ("toggle_debug", "F1"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key_for(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            keybinds: Self::default_keybinds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Enable vertical sync to cap FPS to the display refresh rate.
    #[serde(default)]
    pub shadows: bool, // Enable/disable directional light shadows
    #[serde(default = "GraphicsSettings::default_view_radius")]
    pub view_radius: i32, // Columns drawn around the origin on each side.
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
    fn default_view_radius() -> i32 { 32 }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self { vsync: Self::default_vsync(), shadows: false, view_radius: Self::default_view_radius() }
    }
}

/// Atmosphere settings to configure the bevy_atmosphere crate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    #[serde(default = "AtmosphereSettings::default_enabled")]
    pub enabled: bool, // Enable the sky renderer (requires a restart)
    #[serde(default = "AtmosphereSettings::default_resolution")]
    pub resolution: u32, // Resolution of each skybox face
    #[serde(default = "AtmosphereSettings::default_dithering")]
    pub dithering: bool, // Reduce color banding in the sky
}

impl AtmosphereSettings {
    fn default_enabled() -> bool { true }
    fn default_resolution() -> u32 { 512 }
    fn default_dithering() -> bool { true }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            resolution: Self::default_resolution(),
            dithering: Self::default_dithering(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub terrain: TerrainSettings,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub atmosphere: AtmosphereSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Convert a string key identifier (e.g., from `controls.keybinds`) into a `KeyCode`.
    ///
    /// Single letters and digits map to their key, the rest is matched by name
    /// case-insensitively. Unknown names return `None`.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[usize::from(c as u8 - b'A')]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[usize::from(c as u8 - b'0')]);
            }
        }

        if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<usize>().ok())
            && (1..=FUNCTION.len()).contains(&n)
        {
            return Some(FUNCTION[n - 1]);
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" => KeyCode::Backspace,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}

pub mod loader;
