#![deny(warnings)]

//! Persistence layer: save files, catalog definitions and player settings.
//!
//! Everything is JSON via `serde_json`. Loaders distinguish a missing file
//! (`Ok(None)` or defaults) from a malformed one (`Err`), so callers can fall
//! back to a fresh state without ever crashing startup.

mod catalog;
mod save;
mod settings;

pub use catalog::{load_catalog, parse_catalog, CatalogRecord};
pub use save::{delete_save, load_save, now_unix, save_to_path, SaveData, SCHEMA_VERSION};
pub use settings::{
    load_settings_or_default, save_settings, PlayerSettings, DEFAULT_AUTOSAVE_SECONDS,
    DEFAULT_OFFLINE_CAP_SECONDS,
};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or writing persisted data.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] sim_core::ValidationError),
}

/// Returns the default save file path, relative to the working directory.
pub fn default_save_path() -> &'static str {
    "saves/clicker-startup_save.json"
}

/// Returns the default settings file path.
pub fn default_settings_path() -> &'static str {
    "saves/settings.json"
}

/// Returns the default catalog definition path.
pub fn default_catalog_path() -> &'static str {
    "assets/upgrades.json"
}

// Write via a sibling temp file and rename so a crash never leaves a
// truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "clicker-persistence-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}
