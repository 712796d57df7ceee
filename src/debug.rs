//! Debug dump (F3 by default): writes the frame rate, entity count, player
//! state and a RON snapshot of every placed and dug block to timestamped files
//! in `./debug-dumps/`.
//!
//! The snapshot file can be fed back to [`VoxelWorld::restore`] to reproduce a
//! build or a collision bug.
use crate::error::SnapshotError;
use crate::player::Player;
use crate::settings::Settings;
use crate::ui::describe_flags;
use crate::world::VoxelWorld;
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// Human-readable part of a dump.
#[must_use]
pub fn dump_text(now: DateTime<Utc>, fps: f64, entities: usize, world: &VoxelWorld, player: Option<&Player>) -> String {
    let mut out = String::new();
    writeln!(out, "Debug dump: {}", now.timestamp()).ok();
    writeln!(out, "Timestamp: {}", now.format("%Y-%m-%d %H:%M:%S")).ok();
    writeln!(out, "FPS: {fps:.1}").ok();
    writeln!(out, "Entities: {entities}").ok();
    writeln!(out, "Seed: {}", world.terrain().seed()).ok();
    writeln!(
        out,
        "Records: {} ({} placed, {} dug)",
        world.grid().len(),
        world.grid().placed_len(),
        world.grid().len() - world.grid().placed_len()
    )
    .ok();

    let registry = world.registry();
    let mut ids: Vec<_> = registry.names_by_id.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let count = world.grid().count(id);
        if count > 0 {
            let name = registry.get_by_id(id).map_or("?", |m| m.name.as_str());
            writeln!(out, "  {name} -> {count}").ok();
        }
    }

    match player {
        Some(player) => {
            let body = &player.body;
            writeln!(out, "Player eye: {:.3?} velocity: {:.3?}", body.position, body.velocity).ok();
            writeln!(out, "Mode: {:?} jumping: {} grace: {}", player.mode, player.jumping, player.in_jump_grace()).ok();
            writeln!(out, "Blocked: {}", describe_flags(&player.flags)).ok();
        }
        None => {
            writeln!(out, "Player: none").ok();
        }
    }
    out
}

/// Write the text dump and the world snapshot under `dir`. Returns the path
/// of the snapshot file.
///
/// # Errors
/// Any I/O or encoding failure.
pub fn write_dump(dir: &Path, now: DateTime<Utc>, text: &str, world: &VoxelWorld) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;
    let stamp = now.timestamp();
    fs::write(dir.join(format!("debug-{stamp}.txt")), text)?;
    let snapshot_path = dir.join(format!("world-{stamp}.ron"));
    world.snapshot().save(&snapshot_path)?;
    Ok(snapshot_path)
}

#[allow(clippy::needless_pass_by_value)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    diagnostics: Res<DiagnosticsStore>,
    query_entities: Query<Entity>,
    world: Res<VoxelWorld>,
    player_query: Query<&Player>,
) {
    if !keys.just_pressed(settings.controls.key_for("dump_debug", KeyCode::F3)) {
        return;
    }

    let now = Utc::now();
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let text = dump_text(now, fps, query_entities.iter().count(), &world, player_query.get_single().ok());

    match write_dump(Path::new(DUMP_DIR), now, &text, &world) {
        Ok(path) => info!("wrote debug dump: {}", path.display()),
        Err(e) => error!("debug dump failed: {e}"),
    }
}
