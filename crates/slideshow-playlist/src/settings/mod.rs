//! Playlist preferences: the policy flags and the settings file they are read from.

mod preferences;

pub use preferences::{
    PlaylistConfig, RANDOM_ORDER_KEY, REVERSE_ORDER_KEY, STOP_ON_COMPLETE_KEY, SettingsError, WATCH_DIRECTORY_KEY,
    load_preferences, parse_preferences, read_preferences,
};
