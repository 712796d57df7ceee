//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first successfully parsed `Settings` will be used.
//! If no RON files are found or if no parsing succeeds, default settings will be used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use crate::world::VoxelWorld;
use bevy::prelude::*;

/// Directory the running game reads settings from.
pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub crate::ron::RonWatcher);

/// Load settings from `path` (directory). If multiple `.ron` files are present
/// the first parsed `Settings` will be used. If none exist the `Default` is used.
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    items.into_iter().next().unwrap_or_else(Settings::defaults)
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created or registered.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(SettingsWatcher)
}

/// Reload the `Settings` resource when the watched directory changes and push
/// the build limits and unlocked tier into the world.
///
/// Terrain parameters only take effect on the next world reset; physics and
/// controls are read from `Settings` every frame.
///
/// # Arguments
/// * `watcher` - the settings directory watcher
/// * `settings` - the live settings resource, replaced on reload
/// * `world` - receives the reloaded [`crate::settings::BuildSettings`]
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(
    watcher: Res<SettingsWatcher>,
    mut settings: ResMut<Settings>,
    mut world: ResMut<VoxelWorld>,
) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading from {SETTINGS_DIR}");
        *settings = load_settings_from_dir(SETTINGS_DIR);
        world.apply_build_settings(&settings.build);
    }
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(crate::ron::RonWatcher::stub())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_falls_back_to_defaults() {
        let settings = load_settings_from_dir("data/does-not-exist");
        assert_eq!(settings.terrain.half_extent, 64);
        assert_eq!(settings.build.max_build_height, 96);
    }

    #[test]
    fn shipped_settings_parse() {
        let settings = load_settings_from_dir(SETTINGS_DIR);
        assert!(settings.build.reach > 0.0);
        assert!(settings.physics.body_height > 0.0);
    }
}
