//! User interface helpers: debug overlay and crosshair.
//!
//! The overlay refreshes on a fixed interval and shows frame rate, the
//! player's position and heading, movement mode, collision flags, the
//! crosshair target and build counts.

use crate::block::{CrosshairTarget, SelectedMaterial};
use crate::player::{CollisionFlags, Player, Side};
use crate::settings::Settings;
use crate::world::VoxelWorld;
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use std::fmt::Write;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Component)]
pub struct DebugOverlayText;

/// Insert the overlay refresh timer and visibility state.
///
/// # Arguments
/// * `commands` - `Commands` to insert the timer and state resources
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(0.5, TimerMode::Repeating)));
    commands.insert_resource(DebugOverlayState::default());
}

/// Toggle the overlay on the `toggle_debug` key (F1 unless rebound).
///
/// # Arguments
/// * `state` - mutable `DebugOverlayState` resource
/// * `input` - keyboard input resource
/// * `settings` - key bindings
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    if input.just_pressed(settings.controls.key_for("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

/// Everything the overlay reads: diagnostics, the world, the player and the
/// current crosshair target.
#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub world: Res<'w, VoxelWorld>,
    pub selected: Res<'w, SelectedMaterial>,
    pub target: Res<'w, CrosshairTarget>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub player_query: Query<'w, 's, (&'static Transform, &'static Player)>,
}

/// Refresh the overlay text twice a second: FPS, position, facing, mode,
/// collision flags, target and selected material.
///
/// # Arguments
/// * `ctx` - system parameters grouped into a context struct
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let mut out = format!("FPS: {fps:.1}\n");
    if let Ok((transform, player)) = ctx.player_query.get_single() {
        let pos = player.body.position;
        writeln!(out, "Pos: ({:.1}, {:.1}, {:.1}) {}", pos.x, pos.y, pos.z, compass(*transform.forward())).ok();
        writeln!(out, "Mode: {:?}{}", player.mode, if player.jumping { " (jumping)" } else { "" }).ok();
        writeln!(out, "Blocked: {}", describe_flags(&player.flags)).ok();
    } else {
        out.push_str("Pos: N/A\n");
    }

    match ctx.target.0 {
        Some(hit) => writeln!(out, "Target: {} {:?} at {:.1}", hit.cell, hit.source, hit.distance).ok(),
        None => writeln!(out, "Target: none").ok(),
    };

    let registry = ctx.world.registry();
    let material = registry.get_by_id(ctx.selected.0).map_or("unknown", |m| m.name.as_str());
    let count = ctx.world.grid().count(ctx.selected.0);
    writeln!(out, "Material: {material} ({count}/{})", ctx.world.grid().max_per_material()).ok();
    write!(out, "Blocks placed: {} | tier {}", ctx.world.grid().placed_len(), registry.unlocked_tier()).ok();

    text.sections[0].value = out;
}

/// Eight-point compass label for a look direction. North is -Z.
#[must_use]
pub fn compass(forward: Vec3) -> &'static str {
    const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let angle = forward.x.atan2(-forward.z).to_degrees().rem_euclid(360.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let sector = ((angle + 22.5) / 45.0) as usize % LABELS.len();
    LABELS[sector]
}

/// Short list of blocked sides, or `-` when free.
#[must_use]
pub fn describe_flags(flags: &CollisionFlags) -> String {
    let names: Vec<&str> = Side::ALL
        .iter()
        .filter(|side| flags.get(**side))
        .map(|side| match side {
            Side::Front => "front",
            Side::Back => "back",
            Side::Left => "left",
            Side::Right => "right",
            Side::Up => "up",
            Side::Down => "down",
        })
        .collect();
    if names.is_empty() { "-".to_string() } else { names.join(" ") }
}

/// Spawn the overlay text node in the top left corner.
///
/// # Arguments
/// * `commands` - `Commands` for spawning the text entity
pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font_size: 18.0,
                    color: Color::srgb(1.0, 1.0, 0.0),
                    ..default()
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

/// Spawn a crosshair UI element centered on the screen.
pub fn spawn_crosshair(commands: &mut Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|p| {
            for (width, height) in [(20.0, 2.0), (2.0, 20.0)] {
                p.spawn(NodeBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        width: Val::Px(width),
                        height: Val::Px(height),
                        ..default()
                    },
                    background_color: Color::WHITE.into(),
                    ..default()
                });
            }
        });
}
