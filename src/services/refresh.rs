//! Generation-tagged refreshes
//!
//! A view reloads the collection whenever it regains focus. Loads can
//! overlap, and the one that finishes last is not necessarily the one that
//! started last. [`RefreshTracker`] hands out a generation per load and only
//! installs a snapshot whose generation is at least as new as everything
//! installed so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Token for one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Latest-wins holder for loaded snapshots
#[derive(Debug)]
pub struct RefreshTracker<T> {
    issued: AtomicU64,
    current: Mutex<Option<(Generation, T)>>,
}

impl<T> Default for RefreshTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RefreshTracker<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Start a load
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install `snapshot` unless a newer load already completed
    ///
    /// Returns whether the snapshot was installed.
    pub fn complete(&self, generation: Generation, snapshot: T) -> bool {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((installed, _)) = current.as_ref() {
            if *installed > generation {
                log::debug!(
                    "discarding stale refresh {:?} (have {:?})",
                    generation,
                    installed
                );
                return false;
            }
        }

        *current = Some((generation, snapshot));
        true
    }

    /// Whether `generation` is the most recently started load
    pub fn is_latest(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation.0
    }
}

impl<T: Clone> RefreshTracker<T> {
    /// The installed snapshot, if any load has completed
    pub fn snapshot(&self) -> Option<T> {
        let current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        current.as_ref().map(|(_, snapshot)| snapshot.clone())
    }
}
