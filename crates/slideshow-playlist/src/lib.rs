//! File list and navigation core for an image slideshow.
//!
//! Keeps an ordered list of the files in one directory, tracks which one is on screen, moves
//! forwards and backwards through the images (wrapping or stopping at the ends), and reloads
//! the list whenever the directory changes on disk.

// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod file_system;
mod ignore_poison;
pub mod playlist;
pub mod settings;

pub use file_system::{
    ChangeKind, DirectoryDiff, DirectoryLister, DirectoryWatcher, FileEntry, ListOptions, LocalDirectoryLister,
    ReloadRequest, compute_diff, is_image_path,
};
pub use playlist::{Playlist, PlaylistError, PlaylistEvent, PlaylistState};
pub use settings::{PlaylistConfig, SettingsError, load_preferences, parse_preferences, read_preferences};

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
