use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_atmosphere::prelude::*;
use voxel_builder::block::loader as block_loader;
use voxel_builder::block::{CrosshairTarget, SelectedMaterial, block_interaction, select_material};
use voxel_builder::debug::DebugDumpPlugin;
use voxel_builder::player::{InputIntent, camera_look, cursor_grab, gather_intent, player_movement};
use voxel_builder::settings::loader as settings_loader;
use voxel_builder::ui::{setup_debug_overlay, spawn_debug_overlay, toggle_debug_overlay, update_debug_overlay};
use voxel_builder::world::VoxelWorld;

mod app;
use app::{apply_block_events, setup, setup_block_render, sync_atmosphere_settings, sync_vsync_settings};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());

    let materials = block_loader::load_materials_from_dir(block_loader::MATERIALS_DIR);
    let material_watcher = block_loader::setup_material_watcher(block_loader::MATERIALS_DIR)
        .unwrap_or_else(|_| block_loader::MaterialWatcher::stub());

    let world = VoxelWorld::from_settings(&settings, materials);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "voxel builder".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoNoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(DebugDumpPlugin);

    if settings.atmosphere.enabled {
        app.add_plugins(AtmospherePlugin)
            .insert_resource(AtmosphereModel::default())
            .insert_resource(AtmosphereSettings {
                resolution: settings.atmosphere.resolution,
                dithering: settings.atmosphere.dithering,
                ..Default::default()
            });
        app.add_systems(Update, sync_atmosphere_settings);
    }

    app.insert_resource(world);
    app.insert_resource(material_watcher);
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.insert_resource(InputIntent::default());
    app.insert_resource(SelectedMaterial::default());
    app.insert_resource(CrosshairTarget::default());

    app.add_systems(Startup, (setup_debug_overlay, spawn_debug_overlay, setup, setup_block_render));

    // Input, movement and block edits run in a fixed order so a placement
    // never lands between a collision pass and its integration. The cursor
    // is grabbed last so the grabbing click is not also a dig.
    app.add_systems(
        Update,
        (
            camera_look,
            gather_intent,
            player_movement,
            select_material,
            block_interaction,
            apply_block_events,
            cursor_grab,
        )
            .chain(),
    );

    app.add_systems(Update, (toggle_debug_overlay, update_debug_overlay));
    app.add_systems(Update, sync_vsync_settings);
    app.add_systems(Update, block_loader::check_material_changes);
    app.add_systems(Update, settings_loader::check_settings_changes);

    app.run();
}
