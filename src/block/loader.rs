//! Material catalog loader and watcher: reads material definitions from RON
//! files and reloads them into the live world when the files change.
//!
//! ```rust,ignore
//! let registry = block_loader::load_materials_from_dir(block_loader::MATERIALS_DIR);
//! let watcher = block_loader::setup_material_watcher(block_loader::MATERIALS_DIR)
//!     .unwrap_or_else(|_| block_loader::MaterialWatcher::stub());
//! app.insert_resource(watcher);
//! app.add_systems(Update, block_loader::check_material_changes);
//! ```

use super::{Material, MaterialRegistry};
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use crate::world::VoxelWorld;
use bevy::prelude::*;

/// Directory the running game reads material definitions from.
pub const MATERIALS_DIR: &str = "data/materials";

#[derive(Resource)]
pub struct MaterialWatcher(pub crate::ron::RonWatcher);

/// Load all material definitions from RON files.
///
/// An empty or missing directory yields [`MaterialRegistry::builtin`], so the
/// game always has a usable catalog.
#[must_use]
pub fn load_materials_from_dir(path: &str) -> MaterialRegistry {
    let materials: Vec<Material> = load_ron_files(path);
    if materials.is_empty() {
        warn!("no material definitions under {path}, using the built-in catalog");
        return MaterialRegistry::builtin();
    }

    let mut registry = MaterialRegistry::default();
    for material in materials {
        registry.register(material);
    }
    registry
}

/// Set up a file watcher on the material directory.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file watcher could not be created or configured.
pub fn setup_material_watcher(path: &str) -> Result<MaterialWatcher, notify::Error> {
    setup_ron_watcher(path).map(MaterialWatcher)
}

/// Swap the world's catalog for a freshly loaded one when the files change.
/// The world keeps its unlocked tier, which tracks `settings.build` through
/// [`crate::settings::loader::check_settings_changes`].
///
/// # Arguments
/// * `watcher` - the material directory watcher
/// * `world` - the world whose catalog is replaced
#[allow(clippy::needless_pass_by_value)]
pub fn check_material_changes(watcher: Res<MaterialWatcher>, mut world: ResMut<VoxelWorld>) {
    if !watcher.0.take_changed() {
        return;
    }
    let registry = load_materials_from_dir(MATERIALS_DIR);
    info!("materials changed, {} definitions reloaded", registry.materials.len());
    world.replace_materials(registry);
}

impl MaterialWatcher {
    /// Create a stub `MaterialWatcher` that does not have an active OS watcher.
    #[must_use]
    pub fn stub() -> Self {
        MaterialWatcher(crate::ron::RonWatcher::stub())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::blocks;

    #[test]
    fn shipped_catalog_matches_builtin_ids() {
        let registry = load_materials_from_dir(MATERIALS_DIR);
        let builtin = MaterialRegistry::builtin();
        for (name, material) in &builtin.materials {
            assert_eq!(registry.id_for_name(name), Some(material.id), "{name}");
        }
        assert!(registry.is_protected(blocks::BEDROCK));
    }

    #[test]
    fn empty_directory_uses_builtin() {
        let registry = load_materials_from_dir("data/does-not-exist");
        assert_eq!(registry.materials.len(), MaterialRegistry::builtin().materials.len());
    }
}
