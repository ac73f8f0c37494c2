//! Events published to playlist subscribers.

use serde::Serialize;

use crate::file_system::{ChangeKind, DirectoryDiff};

/// Something happened to the playlist outside the caller's own calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaylistEvent {
    /// A new base directory was loaded.
    Loaded { directory: String, size: usize },
    /// The list was rebuilt from disk. `trigger` is `None` for a reload the caller asked for.
    Reloaded {
        directory: String,
        trigger: Option<ChangeKind>,
        diff: DirectoryDiff,
        size: usize,
        position: usize,
    },
    /// A reload failed; the previous list is still in place.
    ReloadFailed { directory: String, message: String },
    /// The watcher was shut down because the directory is gone.
    WatchStopped { directory: String },
}
