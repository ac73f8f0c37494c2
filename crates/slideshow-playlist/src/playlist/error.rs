//! Playlist error type.

use std::path::PathBuf;

/// Errors from playlist operations.
#[derive(Debug)]
pub enum PlaylistError {
    /// The playlist has no entries.
    Empty,
    /// Navigation went all the way round without finding an image.
    NoImages,
    /// The directory could not be listed. Prior playlist state is kept.
    ListDirectory { path: PathBuf, source: std::io::Error },
    /// The directory watcher could not be started.
    Watch { path: PathBuf, source: notify::Error },
}

impl PlaylistError {
    /// True when the error means the directory itself no longer exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ListDirectory { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Watch { source, .. } => match &source.kind {
                notify::ErrorKind::PathNotFound => true,
                notify::ErrorKind::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
                _ => false,
            },
            Self::Empty | Self::NoImages => false,
        }
    }
}

impl std::fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Playlist is empty"),
            Self::NoImages => write!(f, "Playlist contains no images"),
            Self::ListDirectory { path, source } => write!(f, "Failed to list {}: {}", path.display(), source),
            Self::Watch { path, source } => write!(f, "Failed to watch {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for PlaylistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ListDirectory { source, .. } => Some(source),
            Self::Watch { source, .. } => Some(source),
            Self::Empty | Self::NoImages => None,
        }
    }
}
