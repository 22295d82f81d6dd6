//! Settings loading and persistence
//!
//! Handles reading and writing the JSON config file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::types::Settings;
use crate::error::{ClipKeepError, Result};

/// Default config file location: platform config dir + `clipkeep/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("clipkeep").join("config.json"))
        .unwrap_or_else(|| std::env::temp_dir().join("clipkeep-config.json"))
}

/// Load settings from `path`.
///
/// Returns `Settings::default()` if the file is missing, unreadable, or
/// unparsable. Loading never fails the program.
#[instrument(name = "load_settings", skip(path))]
pub fn load_settings(path: &Path) -> Settings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => {
            info!(path = %path.display(), "Successfully loaded settings");
            settings
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to parse config file, using defaults"
            );
            Settings::default()
        }
    }
}

/// Write `settings` to `path` as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ClipKeepError::ConfigIo {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|e| ClipKeepError::ConfigIo {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Load settings, materializing a default config file first when none
/// exists so the user has something to edit.
pub fn load_or_create(path: &Path) -> Settings {
    if !path.exists() {
        match save_settings(path, &Settings::default()) {
            Ok(()) => info!(path = %path.display(), "Created default config file"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not create config file"),
        }
    }
    load_settings(path)
}
