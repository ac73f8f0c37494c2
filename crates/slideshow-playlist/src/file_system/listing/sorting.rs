//! Ordering policy for playlist entries.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::file_system::listing::entry::FileEntry;
use crate::settings::PlaylistConfig;

/// Sorts entries by their natural order (case-sensitive path comparison).
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort();
}

/// Shuffles entries uniformly at random.
pub fn shuffle_entries<R: Rng + ?Sized>(entries: &mut [FileEntry], rng: &mut R) {
    entries.shuffle(rng);
}

/// Applies the configured order to `entries` in place.
///
/// Random order replaces sorting; reverse order is applied on top of either, so a shuffled
/// list is reversed too. Empty input is left alone.
pub fn apply_ordering<R: Rng + ?Sized>(entries: &mut [FileEntry], config: &PlaylistConfig, rng: &mut R) {
    if entries.is_empty() {
        return;
    }
    if config.random_order {
        shuffle_entries(entries, rng);
    } else {
        sort_entries(entries);
    }
    if config.reverse_order {
        entries.reverse();
    }
}
