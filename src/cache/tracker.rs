//! Expiry Tracker
//!
//! Process-local map of expected expiry instants, used to short-circuit
//! remote TTL checks.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

// == Expiry Tracker ==
/// Advisory map from key path to the instant the entry is expected to
/// expire.
///
/// Presence of a key is treated as "known not yet expired"; the stored
/// instant is only consulted by the scheduler sweep. Entries are never
/// evicted by a local timer, only overwritten or explicitly removed, so a
/// hint can go stale. The worst case of a stale hint is one extra cache
/// miss; all durable state lives in the external store.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    entries: HashMap<String, DateTime<Utc>>,
}

impl ExpiryTracker {
    // == Constructor ==
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Records the expected expiry instant (now + TTL) for a key path,
    /// overwriting any prior entry.
    pub fn record(&mut self, key_path: &str, ttl_seconds: u64) {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
        self.entries.insert(key_path.to_string(), expires_at);
    }

    // == Contains ==
    /// Membership check; presence alone means "known not yet expired".
    pub fn contains(&self, key_path: &str) -> bool {
        self.entries.contains_key(key_path)
    }

    /// Expected expiry instant for a key path, if tracked.
    pub fn expires_at(&self, key_path: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key_path).copied()
    }

    // == Remove ==
    /// Removes a hint. Idempotent.
    ///
    /// # Returns
    /// `true` when an entry was actually removed.
    pub fn remove(&mut self, key_path: &str) -> bool {
        self.entries.remove(key_path).is_some()
    }

    /// Snapshot of the tracked key paths, taken by the scheduler sweep.
    pub fn key_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the number of tracked key paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
