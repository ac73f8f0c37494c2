//! Preference loading from a flat JSON settings file.
//!
//! The slideshow's preference screen persists plain booleans under fixed keys. This module
//! turns them into a [`PlaylistConfig`]; it never writes the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const STOP_ON_COMPLETE_KEY: &str = "stop_on_complete";
pub const REVERSE_ORDER_KEY: &str = "reverse_order";
pub const RANDOM_ORDER_KEY: &str = "random_order";
pub const WATCH_DIRECTORY_KEY: &str = "watch_directory";

/// Ordering and navigation policy for one playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Stop at the first/last entry instead of wrapping around.
    pub stop_on_complete: bool,
    /// Reverse the list after sorting or shuffling.
    pub reverse_order: bool,
    /// Shuffle instead of sorting.
    pub random_order: bool,
    /// Reload the list when the directory changes on disk.
    pub watch_directory: bool,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            stop_on_complete: false,
            reverse_order: false,
            random_order: false,
            watch_directory: true,
        }
    }
}

/// Errors from reading a settings file.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to read settings: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse settings: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Parses the settings JSON. Missing or non-boolean keys default to `false`.
///
/// `watch_directory` is always on, whatever the file says: the preference screen exposes it but
/// the viewer relies on live reloads, so the stored value is deliberately overridden.
pub fn parse_preferences(contents: &str) -> Result<PlaylistConfig, SettingsError> {
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let flag = |key: &str| json.get(key).and_then(|v| v.as_bool()).unwrap_or(false);

    if json.get(WATCH_DIRECTORY_KEY).and_then(|v| v.as_bool()) == Some(false) {
        log::debug!("Ignoring stored {WATCH_DIRECTORY_KEY}=false, directory watching is always on");
    }

    Ok(PlaylistConfig {
        stop_on_complete: flag(STOP_ON_COMPLETE_KEY),
        reverse_order: flag(REVERSE_ORDER_KEY),
        random_order: flag(RANDOM_ORDER_KEY),
        watch_directory: true,
    })
}

/// Reads and parses the settings file at `path`.
pub fn read_preferences(path: &Path) -> Result<PlaylistConfig, SettingsError> {
    let contents = fs::read_to_string(path)?;
    parse_preferences(&contents)
}

/// Loads preferences from `path`, falling back to defaults if the file doesn't exist or can't
/// be parsed.
pub fn load_preferences(path: &Path) -> PlaylistConfig {
    match read_preferences(path) {
        Ok(config) => config,
        Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => PlaylistConfig::default(),
        Err(e) => {
            log::warn!("Using default preferences, {}: {}", path.display(), e);
            PlaylistConfig::default()
        }
    }
}
