//! Pointer interaction: crosshair targeting every frame, removal on left
//! click and placement on right click, plus the digit-key material hotbar.
//!
//! Clicks only act while the cursor is captured, so the click that grabs the
//! cursor never digs a block.

use super::{BlockId, RaycastHit, blocks, place_at, raycast, remove_at};
use crate::player::Player;
use crate::settings::Settings;
use crate::world::VoxelWorld;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

const HOTBAR_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Material placed on right click.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedMaterial(pub BlockId);

impl Default for SelectedMaterial {
    fn default() -> Self {
        Self(blocks::PLANKS)
    }
}

/// What the crosshair pointed at in the last frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CrosshairTarget(pub Option<RaycastHit>);

/// System parameters for [`block_interaction`].
#[derive(bevy::ecs::system::SystemParam)]
pub struct BlockInteractionCtx<'w, 's> {
    pub mouse_button: Res<'w, ButtonInput<MouseButton>>,
    pub world: ResMut<'w, VoxelWorld>,
    pub settings: Res<'w, Settings>,
    pub selected: Res<'w, SelectedMaterial>,
    pub target: ResMut<'w, CrosshairTarget>,
    pub camera_query: Query<'w, 's, (&'static Transform, &'static Player), With<Camera3d>>,
    pub window_query: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

/// Raycast from the camera and apply place/remove clicks.
///
/// # Arguments
/// * `ctx` - mouse input, the world, settings, the selected material, the
///   crosshair target and the camera and window queries
pub fn block_interaction(mut ctx: BlockInteractionCtx) {
    let Ok((camera, player)) = ctx.camera_query.get_single() else { return };
    let hit = raycast(&ctx.world, camera.translation, *camera.forward(), ctx.settings.build.reach);
    ctx.target.0 = hit;

    let captured = ctx
        .window_query
        .get_single()
        .is_ok_and(|w| w.cursor.grab_mode == CursorGrabMode::Locked);
    if !captured {
        return;
    }

    if ctx.mouse_button.just_pressed(MouseButton::Left) {
        match remove_at(&mut ctx.world, hit.as_ref()) {
            Ok(removed) => debug!("removed {:?} at {}", removed.material, removed.position),
            Err(err) => debug!("remove rejected: {err}"),
        }
    }

    if ctx.mouse_button.just_pressed(MouseButton::Right) {
        let material = ctx.selected.0;
        match place_at(&mut ctx.world, hit.as_ref(), material, &player.body) {
            Ok(cell) => debug!("placed {material} at {cell}"),
            Err(err) => debug!("place rejected: {err}"),
        }
    }
}

/// Digit keys pick the n-th unlocked material, in id order.
///
/// # Arguments
/// * `keyboard` - keyboard input for the digit keys
/// * `world` - source of the unlocked materials
/// * `selected` - mutable `SelectedMaterial` resource
#[allow(clippy::needless_pass_by_value)]
pub fn select_material(
    keyboard: Res<ButtonInput<KeyCode>>,
    world: Res<VoxelWorld>,
    mut selected: ResMut<SelectedMaterial>,
) {
    let Some(slot) = HOTBAR_KEYS.iter().position(|k| keyboard.just_pressed(*k)) else { return };
    if let Some(material) = hotbar_slot(&world, slot) {
        selected.0 = material;
        debug!("selected material {material}");
    }
}

/// Material in hotbar slot `slot` (zero based), skipping protected ones.
#[must_use]
pub fn hotbar_slot(world: &VoxelWorld, slot: usize) -> Option<BlockId> {
    let registry = world.registry();
    registry
        .unlocked()
        .into_iter()
        .filter(|m| !registry.is_protected(m.id))
        .nth(slot)
        .map(|m| m.id)
}
