//! Playlist entry type and image classification.

use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// One filesystem item considered for the playlist.
///
/// Entries are immutable. Equality, hashing, and ordering only look at the path, so two entries
/// for the same file compare equal even if they were classified at different times.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Absolute path.
    path: String,
    is_image: bool,
    is_directory: bool,
}

impl FileEntry {
    /// Builds an entry and classifies it from its extension. Directories are never images.
    pub fn new(path: impl Into<String>, is_directory: bool) -> Self {
        let path = path.into();
        let is_image = !is_directory && is_image_path(Path::new(&path));
        Self {
            path,
            is_image,
            is_directory,
        }
    }

    /// Builds an entry with an explicit classification, for listers that know better than the
    /// file extension (or for tests).
    pub fn with_classification(path: impl Into<String>, is_image: bool, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_image: is_image && !is_directory,
            is_directory,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name component, or the whole path if it has none.
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    pub fn is_image(&self) -> bool {
        self.is_image
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileEntry {}

impl Hash for FileEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for FileEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Case-sensitive lexicographic order of the paths ("B.jpg" sorts before "a.jpg").
impl Ord for FileEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

/// Returns true when the MIME type guessed from the extension is `image/*`.
pub fn is_image_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .iter()
        .any(|mime| mime.type_() == mime_guess::mime::IMAGE)
}
