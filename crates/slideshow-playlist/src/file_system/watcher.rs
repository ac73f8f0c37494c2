//! Directory watcher that turns filesystem notifications into reload requests.
//!
//! The notify callback runs on the backend's own thread and never touches playlist state: it
//! classifies the event and posts a [`ReloadRequest`] on a channel. Whoever owns the receiver
//! decides when and under which lock to reload.

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use crate::file_system::listing::FileEntry;

/// The kinds of change that trigger a reload. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Deleted,
    /// The watched directory itself was removed.
    DeletedSelf,
    Modified,
    MovedIn,
    MovedOut,
}

/// Posted by a watcher for every qualifying event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    /// Generation of the watcher that saw the event. Requests from a watcher that has since
    /// been replaced are stale.
    pub generation: u64,
    pub kind: ChangeKind,
    /// First path reported with the event, if any.
    pub path: Option<PathBuf>,
}

/// Maps a notify event onto a [`ChangeKind`], or `None` if the event is not one we react to.
pub fn classify_event(event: &Event, watched: &Path) -> Option<ChangeKind> {
    match &event.kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => {
            if event.paths.iter().any(|p| p == watched) {
                Some(ChangeKind::DeletedSelf)
            } else {
                Some(ChangeKind::Deleted)
            }
        }
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => Some(ChangeKind::MovedOut),
            RenameMode::To | RenameMode::Both => Some(ChangeKind::MovedIn),
            // Backends that can't tell the direction: whatever is still there moved in
            RenameMode::Any | RenameMode::Other => {
                if event.paths.first().is_some_and(|p| p.exists()) {
                    Some(ChangeKind::MovedIn)
                } else {
                    Some(ChangeKind::MovedOut)
                }
            }
        },
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => Some(ChangeKind::Modified),
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Modify(ModifyKind::Other) => None,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Watches one directory, non-recursively.
///
/// `stop_watching` is idempotent and also runs on drop, so a watcher can be torn down from any
/// state without checking first.
pub struct DirectoryWatcher {
    path: PathBuf,
    generation: u64,
    sender: Sender<ReloadRequest>,
    watcher: Option<RecommendedWatcher>,
}

impl DirectoryWatcher {
    pub fn new(path: &Path, generation: u64, sender: Sender<ReloadRequest>) -> Self {
        Self {
            path: path.to_path_buf(),
            generation,
            sender,
            watcher: None,
        }
    }

    /// Starts delivering reload requests. Calling it on a running watcher does nothing.
    pub fn start_watching(&mut self) -> Result<(), notify::Error> {
        if self.watcher.is_some() {
            return Ok(());
        }

        let watched = self.path.clone();
        let generation = self.generation;
        let sender = self.sender.clone();
        let mut watcher = notify::recommended_watcher(move |result: Result<Event, notify::Error>| match result {
            Ok(event) => {
                let Some(kind) = classify_event(&event, &watched) else {
                    return;
                };
                let path = event.paths.first().cloned();
                log::debug!(
                    "Watcher: {:?} in {} ({})",
                    kind,
                    watched.display(),
                    path.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
                );
                let request = ReloadRequest { generation, kind, path };
                if sender.send(request).is_err() {
                    log::debug!("Watcher: reload receiver gone, dropping event for {}", watched.display());
                }
            }
            Err(e) => log::warn!("Watcher error on {}: {}", watched.display(), e),
        })?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);
        log::info!("Watcher started on {} (generation {})", self.path.display(), self.generation);
        Ok(())
    }

    /// Stops delivering reload requests and releases the backend watch.
    pub fn stop_watching(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            // Fails when the directory is already gone, which is fine: the watch died with it
            if let Err(e) = watcher.unwatch(&self.path) {
                log::debug!("Watcher: unwatch {} failed: {}", self.path.display(), e);
            }
            log::info!("Watcher stopped on {} (generation {})", self.path.display(), self.generation);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

/// Paths added and removed between two listings of the same directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl DirectoryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes the diff between old and new directory listings.
///
/// Entries are compared by path only. Added paths keep the order of `new`, removed paths the
/// order of `old`.
pub fn compute_diff(old: &[FileEntry], new: &[FileEntry]) -> DirectoryDiff {
    let old_paths: HashSet<&str> = old.iter().map(FileEntry::path).collect();
    let new_paths: HashSet<&str> = new.iter().map(FileEntry::path).collect();

    DirectoryDiff {
        added: new
            .iter()
            .filter(|e| !old_paths.contains(e.path()))
            .map(|e| e.path().to_string())
            .collect(),
        removed: old
            .iter()
            .filter(|e| !new_paths.contains(e.path()))
            .map(|e| e.path().to_string())
            .collect(),
    }
}
