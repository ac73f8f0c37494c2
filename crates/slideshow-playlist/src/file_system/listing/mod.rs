//! Directory listing module - entries, reading, and ordering.

mod entry;
mod reading;
mod sorting;

pub use entry::{FileEntry, is_image_path};
pub use reading::{DirectoryLister, ListOptions, LocalDirectoryLister, list_directory};
pub use sorting::{apply_ordering, shuffle_entries, sort_entries};
