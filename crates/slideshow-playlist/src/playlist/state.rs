//! The playlist state machine.
//!
//! Owns the ordered entries, the current position, the policy flags, and the directory
//! watcher. Not synchronized on its own: [`Playlist`](super::Playlist) wraps it in a mutex so
//! that caller-thread navigation and worker-thread reloads never interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::file_system::{
    DirectoryDiff, DirectoryLister, DirectoryWatcher, FileEntry, ListOptions, ReloadRequest, apply_ordering,
    compute_diff,
};
use crate::playlist::error::PlaylistError;
use crate::playlist::events::PlaylistEvent;
use crate::settings::PlaylistConfig;

// Subdirectory images are supported by the lister but the slideshow only ever shows one level
const LIST_OPTIONS: ListOptions = ListOptions {
    include_hidden: false,
    include_subdirectories: false,
};

pub struct PlaylistState {
    entries: Vec<FileEntry>,
    /// Index into `entries`; 0 and meaningless while `entries` is empty.
    position: usize,
    base_directory: Option<PathBuf>,
    config: PlaylistConfig,
    lister: Arc<dyn DirectoryLister>,
    watcher: Option<DirectoryWatcher>,
    /// Bumped on every directory switch so requests from replaced watchers can be told apart.
    watch_generation: u64,
    /// Handed to each new watcher. `None` once the playlist has shut down.
    reload_sender: Option<Sender<ReloadRequest>>,
}

impl PlaylistState {
    pub fn new(config: PlaylistConfig, lister: Arc<dyn DirectoryLister>, reload_sender: Sender<ReloadRequest>) -> Self {
        Self {
            entries: Vec::new(),
            position: 0,
            base_directory: None,
            config,
            lister,
            watcher: None,
            watch_generation: 0,
            reload_sender: Some(reload_sender),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Switches to a new directory: lists it, orders it, and watches it.
    ///
    /// The directory is listed before anything is torn down, so a listing failure leaves the
    /// previous directory, entries, position, and watcher exactly as they were. Once the new
    /// listing is in hand the old watcher is stopped before the new one starts. A watcher
    /// failure is returned after the entries have been replaced; there is no retry.
    pub fn set_base_directory(&mut self, path: &Path) -> Result<(), PlaylistError> {
        let path = std::path::absolute(path).map_err(|source| PlaylistError::ListDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = self.load_entries(&path)?;

        self.stop_watching();
        self.watch_generation += 1;
        self.base_directory = Some(path.clone());
        self.entries = entries;
        self.position = 0;

        if self.config.watch_directory {
            self.start_watching(&path)?;
        }
        Ok(())
    }

    /// Lists `path` and applies the ordering policy. Does not touch `self`.
    fn load_entries(&self, path: &Path) -> Result<Vec<FileEntry>, PlaylistError> {
        let start = std::time::Instant::now();
        let mut entries = self
            .lister
            .list(path, LIST_OPTIONS)
            .map_err(|source| PlaylistError::ListDirectory {
                path: path.to_path_buf(),
                source,
            })?;
        apply_ordering(&mut entries, &self.config, &mut rand::thread_rng());
        log::debug!(
            "Loaded {} entries from {} in {}ms",
            entries.len(),
            path.display(),
            start.elapsed().as_millis()
        );
        Ok(entries)
    }

    /// Rebuilds the list from disk, then restores the position from the entry that was current.
    ///
    /// If that entry is gone the position keeps its index, clamped to the new length, so the
    /// entry that moved into its slot becomes current. On failure nothing changes. Without a
    /// base directory this is a no-op.
    pub fn reload(&mut self) -> Result<DirectoryDiff, PlaylistError> {
        let Some(directory) = self.base_directory.clone() else {
            return Ok(DirectoryDiff::default());
        };
        let current = self.entries.get(self.position).map(|e| e.path().to_string());

        let entries = self.load_entries(&directory)?;
        let diff = compute_diff(&self.entries, &entries);
        self.entries = entries;
        if self.restore_position(current.as_deref()).is_none() {
            self.clamp_position();
        }
        Ok(diff)
    }

    /// Handles a request posted by a watcher and returns the events to publish.
    ///
    /// Requests from a replaced watcher are dropped. When the reload fails because the
    /// directory is gone, the watcher is stopped too.
    pub fn process_reload_request(&mut self, request: &ReloadRequest) -> Vec<PlaylistEvent> {
        if request.generation != self.watch_generation {
            log::debug!(
                "Dropping stale reload request (generation {}, current {})",
                request.generation,
                self.watch_generation
            );
            return Vec::new();
        }
        let directory = self.directory_display();

        match self.reload() {
            Ok(diff) => vec![PlaylistEvent::Reloaded {
                directory,
                trigger: Some(request.kind),
                diff,
                size: self.entries.len(),
                position: self.position,
            }],
            Err(err) => {
                log::warn!("Reload after {:?} failed: {}", request.kind, err);
                let mut events = vec![PlaylistEvent::ReloadFailed {
                    directory: directory.clone(),
                    message: err.to_string(),
                }];
                if err.is_not_found() && self.watcher.is_some() {
                    log::info!("Watched directory is gone, stopping watcher: {}", directory);
                    self.stop_watching();
                    events.push(PlaylistEvent::WatchStopped { directory });
                }
                events
            }
        }
    }

    // ========================================================================
    // Watching
    // ========================================================================

    fn start_watching(&mut self, path: &Path) -> Result<(), PlaylistError> {
        let Some(sender) = self.reload_sender.clone() else {
            log::debug!("Playlist shut down, not watching {}", path.display());
            return Ok(());
        };
        let mut watcher = DirectoryWatcher::new(path, self.watch_generation, sender);
        watcher.start_watching().map_err(|source| PlaylistError::Watch {
            path: path.to_path_buf(),
            source,
        })?;
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Stops and releases the current watcher, if any.
    pub fn stop_watching(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop_watching();
        }
    }

    /// Stops watching and gives up the reload channel so the worker can exit.
    pub(crate) fn shutdown(&mut self) {
        self.stop_watching();
        self.reload_sender = None;
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(DirectoryWatcher::is_watching)
    }

    /// Directory the live watcher is bound to.
    pub fn watched_directory(&self) -> Option<&Path> {
        self.watcher.as_ref().map(DirectoryWatcher::path)
    }

    pub fn watch_generation(&self) -> u64 {
        self.watch_generation
    }

    // ========================================================================
    // Position
    // ========================================================================

    /// Rotates the list so the entry at `path` comes first, and records the index it had
    /// before the rotation as the position.
    ///
    /// Does nothing for `None` or a list of at most one entry. Without a match the position is
    /// only clamped into range. Returns the pre-rotation index on a match.
    pub fn restore_position(&mut self, path: Option<&str>) -> Option<usize> {
        let path = path?;
        if self.entries.len() <= 1 {
            self.clamp_position();
            return None;
        }

        let Some(index) = self.entries.iter().position(|e| e.path() == path) else {
            self.clamp_position();
            return None;
        };
        self.entries.rotate_left(index);
        self.position = index;
        log::trace!("First item is: {}", self.entries[0].path());
        Some(index)
    }

    /// See [`restore_position`](Self::restore_position).
    pub fn set_position_from_path(&mut self, path: &str) -> Option<usize> {
        self.restore_position(Some(path))
    }

    fn clamp_position(&mut self) {
        self.position = self.position.min(self.entries.len().saturating_sub(1));
    }

    /// Maps a stepped-to index back into the list: wraps around, or stops at the ends when
    /// `stop_on_complete` is set. Returns 0 for an empty list.
    pub fn sane_position(&self, candidate: isize) -> usize {
        let len = self.entries.len();
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        if candidate < 0 {
            return if self.config.stop_on_complete { 0 } else { last };
        }
        let candidate = candidate as usize;
        if candidate >= len {
            return if self.config.stop_on_complete { last } else { 0 };
        }
        candidate
    }

    pub fn is_at_last_position(&self) -> bool {
        self.config.stop_on_complete && !self.entries.is_empty() && self.position == self.entries.len() - 1
    }

    pub fn is_at_first_position(&self) -> bool {
        self.position == 0
    }

    // ========================================================================
    // Entries and navigation
    // ========================================================================

    pub fn current_entry(&self) -> Result<&FileEntry, PlaylistError> {
        self.entries.get(self.position).ok_or(PlaylistError::Empty)
    }

    /// Drops the current entry from the list without touching the disk or re-sorting.
    pub fn remove_current_entry(&mut self) -> Result<FileEntry, PlaylistError> {
        if self.entries.is_empty() {
            return Err(PlaylistError::Empty);
        }
        let removed = self.entries.remove(self.position);
        self.position = self.sane_position(self.position as isize);
        Ok(removed)
    }

    /// Steps to the next (or previous) image, skipping entries that are not images.
    ///
    /// With `preview` set the position is left alone and only the entry is returned, for
    /// preloading. The walk is bounded by one full cycle. When `stop_on_complete` pins it to an
    /// end of the list before an image turns up, the position stays put and the current entry
    /// is returned if it is an image.
    pub fn advance(&mut self, forward: bool, preview: bool) -> Result<FileEntry, PlaylistError> {
        let len = self.entries.len();
        if len == 0 {
            return Err(PlaylistError::Empty);
        }

        let step: isize = if forward { 1 } else { -1 };
        let mut candidate = self.position;
        for _ in 0..len {
            let next = self.sane_position(candidate as isize + step);
            if next == candidate {
                // Pinned at an end (or a one-entry list): no further progress possible
                break;
            }
            candidate = next;
            if self.entries[candidate].is_image() {
                if !preview {
                    self.position = candidate;
                }
                return Ok(self.entries[candidate].clone());
            }
        }

        let current = &self.entries[self.position];
        if current.is_image() {
            Ok(current.clone())
        } else {
            Err(PlaylistError::NoImages)
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Replaces the policy flags and re-orders the in-memory list (no disk access).
    ///
    /// The position follows the entry that was current, wherever the new order puts it.
    pub fn update_config(&mut self, config: PlaylistConfig) {
        let current = self.entries.get(self.position).map(|e| e.path().to_string());
        self.config = config;
        apply_ordering(&mut self.entries, &self.config, &mut rand::thread_rng());

        match current.and_then(|path| self.entries.iter().position(|e| e.path() == path)) {
            Some(index) => self.position = index,
            None => self.clamp_position(),
        }
    }

    pub fn config(&self) -> PlaylistConfig {
        self.config
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }

    pub(crate) fn directory_display(&self) -> String {
        self.base_directory
            .as_deref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
