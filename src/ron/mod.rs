//! Utilities for loading RON files and watching directories for changes.
//!
//! This module provides a small helper for reading RON files from disk
//! and a filesystem watcher resource that raises a shared flag when files
//! change. The watcher drives hot-reloading of the settings and the
//! material catalog during development.

use bevy::prelude::{Resource, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Resource)]
/// File-watcher resource for RON hot-reload.
pub struct RonWatcher {
    pub changed: Arc<Mutex<bool>>, // Shared boolean set to `true` when watched files change.
    _watcher: Option<notify::RecommendedWatcher>, // watcher handle kept to prevent immediate drop.
}

impl RonWatcher {
    /// Create a stub `RonWatcher` that does not have an active OS watcher.
    ///
    /// Useful as a fallback when watcher creation fails or when running on
    /// platforms without notify support.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(Mutex::new(false)),
            _watcher: None,
        }
    }

    /// Return whether a change was observed since the last call and clear the flag.
    ///
    /// A poisoned mutex is recovered rather than propagated; the flag is a plain
    /// bool and cannot be left half-written.
    pub fn take_changed(&self) -> bool {
        let mut flag = match self.changed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("ron watcher mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        std::mem::take(&mut *flag)
    }
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// Files are visited in name order so the result is stable across platforms.
/// Files that fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for p in paths {
        let content = match std::fs::read_to_string(&p) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to read {}: {e}", p.display());
                continue;
            }
        };
        match ron::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!("failed to parse {}: {e}", p.display()),
        }
    }

    items
}

/// Create a `RonWatcher` that watches a directory for modifications.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file-watcher cannot be
/// created or the watcher cannot be registered for the provided path.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(Mutex::new(false));
    let changed_clone = changed.clone();
    // Canonical form so events from symlinked paths still match.
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched_path)
                });
                if relevant {
                    match changed_clone.lock() {
                        Ok(mut flag) => *flag = true,
                        Err(poisoned) => *poisoned.into_inner() = true,
                    }
                }
            }
            Err(e) => warn!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}
