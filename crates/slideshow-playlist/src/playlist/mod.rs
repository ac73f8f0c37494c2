//! Thread-safe playlist handle.
//!
//! [`Playlist`] owns a [`PlaylistState`] behind one mutex and a worker thread. Directory
//! watchers post [`ReloadRequest`]s on a channel; the worker drains it one request at a time
//! and reloads under the same lock the caller's navigation uses, so a reload never overlaps
//! another reload, a directory switch, or a navigation step.

mod error;
mod events;
mod state;

pub use error::PlaylistError;
pub use events::PlaylistEvent;
pub use state::PlaylistState;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::file_system::{DirectoryDiff, DirectoryLister, FileEntry, LocalDirectoryLister, ReloadRequest};
use crate::ignore_poison::IgnorePoison;
use crate::settings::PlaylistConfig;

type Subscribers = Arc<Mutex<Vec<Sender<PlaylistEvent>>>>;

/// An image playlist bound to one directory at a time.
pub struct Playlist {
    state: Arc<Mutex<PlaylistState>>,
    subscribers: Subscribers,
    worker: Option<JoinHandle<()>>,
}

impl Playlist {
    /// Creates a playlist that reads the local file system.
    pub fn new(config: PlaylistConfig) -> Self {
        Self::with_lister(config, Arc::new(LocalDirectoryLister))
    }

    /// Creates a playlist with a custom directory lister.
    pub fn with_lister(config: PlaylistConfig, lister: Arc<dyn DirectoryLister>) -> Self {
        let (reload_tx, reload_rx) = mpsc::channel();
        let state = Arc::new(Mutex::new(PlaylistState::new(config, lister, reload_tx)));
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));

        let worker_state = Arc::clone(&state);
        let worker_subscribers = Arc::clone(&subscribers);
        let worker = std::thread::spawn(move || run_reload_worker(worker_state, worker_subscribers, reload_rx));

        Self {
            state,
            subscribers,
            worker: Some(worker),
        }
    }

    /// Returns a receiver for playlist events. Dropping it unsubscribes.
    pub fn subscribe(&self) -> Receiver<PlaylistEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock_ignore_poison().push(tx);
        rx
    }

    /// Loads `path` and starts watching it, replacing any previous directory and watcher.
    ///
    /// A watcher that fails to start still leaves the new list in place, so `Loaded` is
    /// published before the error is returned.
    pub fn set_base_directory(&self, path: impl AsRef<Path>) -> Result<(), PlaylistError> {
        let (event, result) = {
            let mut state = self.state.lock_ignore_poison();
            let result = match state.set_base_directory(path.as_ref()) {
                Ok(()) => Ok(()),
                Err(err @ PlaylistError::Watch { .. }) => Err(err),
                Err(err) => return Err(err),
            };
            let event = PlaylistEvent::Loaded {
                directory: state.directory_display(),
                size: state.size(),
            };
            (event, result)
        };
        log::info!("Playlist loaded: {:?}", event);
        publish(&self.subscribers, vec![event]);
        result
    }

    /// Rebuilds the list from disk now, as a watcher event would.
    pub fn reload(&self) -> Result<DirectoryDiff, PlaylistError> {
        let (diff, event) = {
            let mut state = self.state.lock_ignore_poison();
            let diff = state.reload()?;
            let event = PlaylistEvent::Reloaded {
                directory: state.directory_display(),
                trigger: None,
                diff: diff.clone(),
                size: state.size(),
                position: state.position(),
            };
            (diff, event)
        };
        publish(&self.subscribers, vec![event]);
        Ok(diff)
    }

    /// Makes the entry at `path` the rotation anchor; see [`PlaylistState::restore_position`].
    pub fn set_position_from_path(&self, path: &str) -> Option<usize> {
        self.state.lock_ignore_poison().set_position_from_path(path)
    }

    pub fn size(&self) -> usize {
        self.state.lock_ignore_poison().size()
    }

    pub fn current_entry(&self) -> Result<FileEntry, PlaylistError> {
        self.state.lock_ignore_poison().current_entry().cloned()
    }

    pub fn remove_current_entry(&self) -> Result<FileEntry, PlaylistError> {
        self.state.lock_ignore_poison().remove_current_entry()
    }

    /// Moves to the next or previous image; with `preview` only looks.
    pub fn advance(&self, forward: bool, preview: bool) -> Result<FileEntry, PlaylistError> {
        self.state.lock_ignore_poison().advance(forward, preview)
    }

    pub fn is_at_first_position(&self) -> bool {
        self.state.lock_ignore_poison().is_at_first_position()
    }

    pub fn is_at_last_position(&self) -> bool {
        self.state.lock_ignore_poison().is_at_last_position()
    }

    pub fn update_config(&self, config: PlaylistConfig) {
        self.state.lock_ignore_poison().update_config(config);
    }

    pub fn config(&self) -> PlaylistConfig {
        self.state.lock_ignore_poison().config()
    }

    pub fn position(&self) -> usize {
        self.state.lock_ignore_poison().position()
    }

    /// Snapshot of the entries in navigation order.
    pub fn entries(&self) -> Vec<FileEntry> {
        self.state.lock_ignore_poison().entries().to_vec()
    }

    pub fn base_directory(&self) -> Option<PathBuf> {
        self.state.lock_ignore_poison().base_directory().map(Path::to_path_buf)
    }

    pub fn is_watching(&self) -> bool {
        self.state.lock_ignore_poison().is_watching()
    }

    /// Runs `f` with the state locked, for reads that need several fields to agree.
    pub fn with_state<T>(&self, f: impl FnOnce(&PlaylistState) -> T) -> T {
        f(&self.state.lock_ignore_poison())
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(PlaylistConfig::default())
    }
}

impl Drop for Playlist {
    fn drop(&mut self) {
        // Dropping the watcher and the state's sender closes the channel, which ends the worker
        self.state.lock_ignore_poison().shutdown();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("Playlist reload worker panicked");
        }
    }
}

fn run_reload_worker(state: Arc<Mutex<PlaylistState>>, subscribers: Subscribers, requests: Receiver<ReloadRequest>) {
    log::debug!("Reload worker started");
    while let Ok(request) = requests.recv() {
        let events = state.lock_ignore_poison().process_reload_request(&request);
        publish(&subscribers, events);
    }
    log::debug!("Reload worker exiting");
}

/// Sends events to every live subscriber and forgets the ones that hung up.
fn publish(subscribers: &Subscribers, events: Vec<PlaylistEvent>) {
    if events.is_empty() {
        return;
    }
    let mut subscribers = subscribers.lock_ignore_poison();
    subscribers.retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
}

#[cfg(test)]
mod playlist_test;
