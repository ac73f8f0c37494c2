//! Tests for the thread-safe playlist handle against a real directory and watcher

use super::{Playlist, PlaylistError, PlaylistEvent};
use crate::file_system::{ChangeKind, DirectoryLister, FileEntry, ListOptions};
use crate::settings::PlaylistConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn make_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for name in names {
        fs::write(dir.path().join(name), "data").unwrap();
    }
    dir
}

/// Moves a file into `dir` from outside, which produces a single rename event.
fn move_in(dir: &Path, name: &str) {
    let staging = tempfile::tempdir().unwrap();
    let staged = staging.path().join(name);
    fs::write(&staged, "data").unwrap();
    fs::rename(&staged, dir.join(name)).unwrap();
}

/// Waits for the first event matching `predicate`, skipping others.
fn wait_for(events: &Receiver<PlaylistEvent>, predicate: impl Fn(&PlaylistEvent) -> bool) -> PlaylistEvent {
    let deadline = Instant::now() + EVENT_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let event = events.recv_timeout(remaining).expect("timed out waiting for playlist event");
        if predicate(&event) {
            return event;
        }
    }
}

fn names(playlist: &Playlist) -> Vec<String> {
    playlist.entries().iter().map(|e| e.name().to_string()).collect()
}

#[test]
fn test_set_base_directory_publishes_loaded() {
    crate::init_test_logging();
    let dir = make_dir(&["b.jpg", "a.jpg"]);
    let playlist = Playlist::default();
    let events = playlist.subscribe();

    playlist.set_base_directory(dir.path()).unwrap();

    let event = wait_for(&events, |e| matches!(e, PlaylistEvent::Loaded { .. }));
    assert_eq!(
        event,
        PlaylistEvent::Loaded {
            directory: dir.path().to_string_lossy().to_string(),
            size: 2,
        }
    );
    assert_eq!(names(&playlist), vec!["a.jpg", "b.jpg"]);
    assert!(playlist.is_watching());
    assert_eq!(playlist.base_directory().as_deref(), Some(dir.path()));
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = make_dir(&[]);
    let playlist = Playlist::default();

    let result = playlist.set_base_directory(dir.path().join("missing"));

    assert!(matches!(result, Err(PlaylistError::ListDirectory { .. })));
    assert_eq!(playlist.size(), 0);
    assert!(!playlist.is_watching());
}

/// Lists a fixed set of files for any path, whether or not it exists on disk.
struct FixedLister(Vec<&'static str>);

impl DirectoryLister for FixedLister {
    fn list(&self, path: &Path, _options: ListOptions) -> Result<Vec<FileEntry>, std::io::Error> {
        Ok(self
            .0
            .iter()
            .map(|name| FileEntry::new(path.join(name).to_string_lossy().to_string(), false))
            .collect())
    }
}

#[test]
fn test_watch_failure_still_publishes_loaded() {
    let playlist = Playlist::with_lister(PlaylistConfig::default(), Arc::new(FixedLister(vec!["a.jpg", "b.jpg"])));
    let events = playlist.subscribe();
    let missing = PathBuf::from("/nonexistent-slideshow-dir");

    let result = playlist.set_base_directory(&missing);

    assert!(matches!(result, Err(PlaylistError::Watch { .. })));
    let event = wait_for(&events, |e| matches!(e, PlaylistEvent::Loaded { .. }));
    assert_eq!(
        event,
        PlaylistEvent::Loaded {
            directory: "/nonexistent-slideshow-dir".to_string(),
            size: 2,
        }
    );
    assert_eq!(playlist.base_directory(), Some(missing));
    assert!(!playlist.is_watching());
}

#[test]
fn test_file_moved_in_triggers_reload_around_current_image() {
    crate::init_test_logging();
    let dir = make_dir(&["a.jpg", "b.jpg", "c.jpg"]);
    let playlist = Playlist::default();
    playlist.set_base_directory(dir.path()).unwrap();
    let events = playlist.subscribe();
    playlist.advance(true, false).unwrap();
    assert_eq!(playlist.current_entry().unwrap().name(), "b.jpg");

    move_in(dir.path(), "d.jpg");

    let event = wait_for(&events, |e| matches!(e, PlaylistEvent::Reloaded { .. }));
    let PlaylistEvent::Reloaded { trigger, diff, size, .. } = event else {
        unreachable!();
    };
    assert!(matches!(trigger, Some(ChangeKind::MovedIn | ChangeKind::Created)));
    assert_eq!(diff.added.len(), 1);
    assert!(diff.added[0].ends_with("d.jpg"));
    assert_eq!(size, 4);
    // The previously current image heads the rotated list
    assert_eq!(playlist.entries()[0].name(), "b.jpg");
}

#[test]
fn test_file_deleted_triggers_reload() {
    crate::init_test_logging();
    let dir = make_dir(&["a.jpg", "b.jpg"]);
    let playlist = Playlist::default();
    playlist.set_base_directory(dir.path()).unwrap();
    let events = playlist.subscribe();

    fs::remove_file(dir.path().join("b.jpg")).unwrap();

    wait_for(&events, |e| match e {
        PlaylistEvent::Reloaded { diff, .. } => diff.removed.iter().any(|p| p.ends_with("b.jpg")),
        _ => false,
    });
    assert_eq!(names(&playlist), vec!["a.jpg"]);
}

#[test]
fn test_deleted_directory_stops_watching() {
    crate::init_test_logging();
    let dir = make_dir(&["a.jpg", "b.jpg"]);
    let path = dir.path().to_path_buf();
    let playlist = Playlist::default();
    playlist.set_base_directory(&path).unwrap();
    let events = playlist.subscribe();

    dir.close().unwrap();

    wait_for(&events, |e| matches!(e, PlaylistEvent::WatchStopped { .. }));
    assert!(!playlist.is_watching());
    // File deletions may have been picked up before the directory went, never more
    assert!(playlist.size() <= 2);
    assert!(playlist.reload().unwrap_err().is_not_found());
}

#[test]
fn test_switching_directories_ignores_old_directory() {
    crate::init_test_logging();
    let first = make_dir(&["a.jpg"]);
    let second = make_dir(&["x.jpg", "y.jpg"]);
    let playlist = Playlist::default();
    playlist.set_base_directory(first.path()).unwrap();
    playlist.set_base_directory(second.path()).unwrap();
    let events = playlist.subscribe();

    move_in(first.path(), "stale.jpg");
    move_in(second.path(), "z.jpg");

    let event = wait_for(&events, |e| matches!(e, PlaylistEvent::Reloaded { .. }));
    let PlaylistEvent::Reloaded { directory, diff, .. } = event else {
        unreachable!();
    };
    assert_eq!(directory, second.path().to_string_lossy());
    assert!(diff.added.iter().all(|p| !p.ends_with("stale.jpg")));
    assert!(playlist.entries().iter().all(|e| e.name() != "stale.jpg"));
    assert_eq!(playlist.with_state(|s| s.watch_generation()), 2);
}

#[test]
fn test_manual_reload() {
    let dir = make_dir(&["a.jpg"]);
    let config = PlaylistConfig {
        watch_directory: false,
        ..PlaylistConfig::default()
    };
    let playlist = Playlist::new(config);
    playlist.set_base_directory(dir.path()).unwrap();
    assert!(!playlist.is_watching());
    fs::write(dir.path().join("b.jpg"), "data").unwrap();

    let diff = playlist.reload().unwrap();

    assert_eq!(diff.added.len(), 1);
    assert_eq!(playlist.size(), 2);
}

#[test]
fn test_navigation_through_handle() {
    let dir = make_dir(&["a.jpg", "b.txt", "c.jpg"]);
    let config = PlaylistConfig {
        stop_on_complete: true,
        watch_directory: false,
        ..PlaylistConfig::default()
    };
    let playlist = Playlist::new(config);
    playlist.set_base_directory(dir.path()).unwrap();

    assert!(playlist.is_at_first_position());
    assert_eq!(playlist.advance(true, true).unwrap().name(), "c.jpg");
    assert_eq!(playlist.position(), 0);
    assert_eq!(playlist.advance(true, false).unwrap().name(), "c.jpg");
    assert!(playlist.is_at_last_position());

    playlist.update_config(PlaylistConfig {
        reverse_order: true,
        ..config
    });
    assert_eq!(playlist.current_entry().unwrap().name(), "c.jpg");
    assert!(playlist.is_at_first_position());

    assert_eq!(playlist.remove_current_entry().unwrap().name(), "c.jpg");
    assert_eq!(playlist.size(), 2);
    assert_eq!(playlist.set_position_from_path("/nowhere"), None);
}

#[test]
fn test_concurrent_navigation_during_reloads() {
    crate::init_test_logging();
    let dir = make_dir(&["a.jpg", "b.jpg", "c.jpg"]);
    let playlist = Arc::new(Playlist::default());
    playlist.set_base_directory(dir.path()).unwrap();

    let navigator = {
        let playlist = Arc::clone(&playlist);
        std::thread::spawn(move || {
            for _ in 0..200 {
                let entry = playlist.advance(true, false).unwrap();
                assert!(entry.is_image());
                let (position, size) = playlist.with_state(|s| (s.position(), s.size()));
                assert!(position < size);
            }
        })
    };
    for i in 0..5 {
        move_in(dir.path(), &format!("new_{i}.jpg"));
    }
    navigator.join().unwrap();

    // Every entry is still unique after interleaved reloads
    let entries = playlist.entries();
    let mut paths: Vec<&str> = entries.iter().map(|e| e.path()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), entries.len());
}

#[test]
fn test_drop_stops_worker() {
    let dir = make_dir(&["a.jpg"]);
    let playlist = Playlist::default();
    playlist.set_base_directory(dir.path()).unwrap();
    let events = playlist.subscribe();

    drop(playlist);

    // The subscriber list died with the playlist
    assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
}
