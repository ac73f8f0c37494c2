//! Low-level directory reading and FileEntry construction.
//!
//! Pure I/O: reads from disk and builds FileEntry values. Ordering is applied by the playlist,
//! not here.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::file_system::listing::entry::FileEntry;

/// What to include in a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include entries whose name starts with a dot.
    pub include_hidden: bool,
    /// Walk into subdirectories and list their files too. Subdirectories themselves are never
    /// returned as entries.
    pub include_subdirectories: bool,
}

/// Source of directory listings for the playlist.
pub trait DirectoryLister: Send + Sync {
    /// Lists `path`. An empty directory yields an empty vec, not an error.
    fn list(&self, path: &Path, options: ListOptions) -> Result<Vec<FileEntry>, std::io::Error>;
}

/// Lister backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectoryLister;

impl DirectoryLister for LocalDirectoryLister {
    fn list(&self, path: &Path, options: ListOptions) -> Result<Vec<FileEntry>, std::io::Error> {
        list_directory(path, options)
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Lists the files in a directory.
///
/// Paths in the result are absolute. Symlinks pointing at directories count as directories.
/// Entries that vanish between readdir and stat are skipped.
pub fn list_directory(path: &Path, options: ListOptions) -> Result<Vec<FileEntry>, std::io::Error> {
    let overall_start = std::time::Instant::now();
    let path = std::path::absolute(path)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    if options.include_subdirectories {
        let walker = WalkDir::new(&path)
            .min_depth(1)
            .into_iter()
            // Depth 0 is the root itself, which may legitimately live under a dotted directory
            .filter_entry(|e| e.depth() == 0 || options.include_hidden || !is_hidden(e.file_name()));
        for dir_entry in walker {
            let dir_entry = dir_entry?;
            if dir_entry.file_type().is_dir() || dir_entry.path().is_dir() {
                continue;
            }
            let entry = FileEntry::new(dir_entry.path().to_string_lossy(), false);
            if seen.insert(entry.path().to_string()) {
                entries.push(entry);
            }
        }
    } else {
        for dir_entry in fs::read_dir(&path)? {
            let dir_entry = dir_entry?;
            if !options.include_hidden && is_hidden(&dir_entry.file_name()) {
                continue;
            }

            let entry_path = dir_entry.path();
            let Ok(file_type) = dir_entry.file_type() else {
                continue;
            };
            let is_dir = if file_type.is_symlink() {
                fs::metadata(&entry_path).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };
            if is_dir {
                continue;
            }

            let entry = FileEntry::new(entry_path.to_string_lossy(), false);
            if seen.insert(entry.path().to_string()) {
                entries.push(entry);
            }
        }
    }

    log::debug!(
        "list_directory: path={}, entries={}, recursive={}, total={}ms",
        path.display(),
        entries.len(),
        options.include_subdirectories,
        overall_start.elapsed().as_millis()
    );

    Ok(entries)
}
