//! File system module - directory listing, ordering, and change watching.

pub mod listing;
mod watcher;

pub use listing::{
    DirectoryLister, FileEntry, ListOptions, LocalDirectoryLister, apply_ordering, is_image_path, list_directory,
    shuffle_entries, sort_entries,
};
pub use watcher::{ChangeKind, DirectoryDiff, DirectoryWatcher, ReloadRequest, classify_event, compute_diff};
