//! Startup systems: lights, the player camera and the crosshair.
use bevy::prelude::*;
use voxel_builder::player::{Body, Player, PlayerLook};
use voxel_builder::settings::Settings;
use voxel_builder::world::VoxelWorld;

#[derive(Component)]
pub struct Sun;

/// Spawn the sun, ambient light, the player camera standing on the spawn
/// column, and the crosshair.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(mut commands: Commands, world: Res<VoxelWorld>, settings: Res<Settings>) {
    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: 8000.0,
                shadows_enabled: settings.graphics.shadows,
                ..default()
            },
            transform: Transform::from_xyz(40.0, 100.0, 25.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        Sun,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    let physics = &settings.physics;
    let spawn = world.spawn_position(physics.body_height);
    info!("spawning player at {spawn:?}");

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(spawn),
            ..default()
        },
        Player::new(Body::from_settings(physics, spawn), physics),
        PlayerLook::default(),
        bevy_atmosphere::prelude::AtmosphereCamera::default(),
    ));

    voxel_builder::ui::spawn_crosshair(&mut commands);
}
