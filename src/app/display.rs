//! Systems that push hot-reloaded display settings into the running app:
//! vsync into the primary window, sky quality into `bevy_atmosphere`.
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use bevy_atmosphere::prelude::AtmosphereSettings as SkySettings;
use voxel_builder::settings::Settings;

/// Apply `graphics.vsync` to the primary window whenever it changes.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_vsync_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<Option<bool>>,
) {
    let desired = settings.graphics.vsync;
    if *last == Some(desired) {
        return;
    }
    for mut window in &mut windows {
        window.present_mode = if desired { PresentMode::AutoVsync } else { PresentMode::AutoNoVsync };
    }
    *last = Some(desired);
}

/// Apply sky resolution and dithering. Turning the sky on or off still needs
/// a restart because the plugin is only added at startup.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_atmosphere_settings(settings: Res<Settings>, mut sky: ResMut<SkySettings>, mut last: Local<Option<(u32, bool)>>) {
    let wanted = (settings.atmosphere.resolution, settings.atmosphere.dithering);
    if *last == Some(wanted) {
        return;
    }
    (sky.resolution, sky.dithering) = wanted;
    *last = Some(wanted);
}
