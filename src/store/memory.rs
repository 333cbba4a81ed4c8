//! In-Memory Store
//!
//! A TTL-respecting in-memory implementation of the [`Store`] trait, used by
//! the test suites and usable standalone when no external store is deployed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::Store;

/// TTL reported for an absent or expired key, matching the redis convention.
const TTL_MISSING: i64 = -2;

// == Store Entry ==
/// A single stored value with its expiration instant.
#[derive(Debug, Clone)]
struct StoreEntry {
    /// The stored value
    value: String,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: u64,
}

impl StoreEntry {
    fn new(value: String, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: current_timestamp_ms() + ttl_seconds * 1000,
        }
    }

    /// An entry is expired once the current time reaches its expiration
    /// instant.
    fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    /// Remaining TTL in whole seconds, rounded up so a live entry never
    /// reports zero.
    fn ttl_remaining(&self) -> i64 {
        let now = current_timestamp_ms();
        ((self.expires_at.saturating_sub(now) + 999) / 1000) as i64
    }
}

// == Memory Store ==
/// In-memory key-value store with per-entry TTL.
///
/// Expired entries are treated as absent by every command and lazily removed
/// on write paths; [`MemoryStore::purge_expired`] removes them eagerly.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, StoreEntry>>,
    /// Test affordance: while set, every command fails as unavailable
    offline: AtomicBool,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing the store connection; all commands fail until
    /// cleared again.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// # Returns
    /// The number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;

        let expired_keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            entries.remove(&key);
        }

        count
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    /// Returns true when the store holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;

        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), StoreError> {
        self.check_online()?;

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), StoreEntry::new(value.to_string(), seconds));
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool, StoreError> {
        self.check_online()?;

        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = current_timestamp_ms() + seconds * 1000;
                Ok(true)
            }
            Some(_) => {
                // Expired entries count as absent; drop them on the way out.
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        self.check_online()?;

        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.ttl_remaining())
            .unwrap_or(TTL_MISSING))
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        self.check_online()?;

        let mut entries = self.entries.write().await;
        match entries.remove(key) {
            Some(entry) if !entry.is_expired() => Ok(1),
            _ => Ok(0),
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 300).await.unwrap();
        let value = store.get("key1").await.unwrap();

        assert_eq!(value, Some("value1".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new();

        let value = store.get("nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 300).await.unwrap();
        store.set_ex("key1", "value2", 300).await.unwrap();

        assert_eq!(store.get("key1").await.unwrap(), Some("value2".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_del_counts_removed_entries() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 300).await.unwrap();

        assert_eq!(store.del("key1").await.unwrap(), 1);
        assert_eq!(store.del("key1").await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_expire_missing_key() {
        let store = MemoryStore::new();

        let applied = store.expire("nonexistent", 60).await.unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_store_expire_refreshes_ttl() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 1).await.unwrap();
        let applied = store.expire("key1", 300).await.unwrap();

        assert!(applied);
        assert!(store.ttl("key1").await.unwrap() > 1);
    }

    #[tokio::test]
    async fn test_store_ttl_missing_key() {
        let store = MemoryStore::new();

        assert_eq!(store.ttl("nonexistent").await.unwrap(), TTL_MISSING);
    }

    #[tokio::test]
    async fn test_store_ttl_live_entry_positive() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 10).await.unwrap();
        let ttl = store.ttl("key1").await.unwrap();

        assert!(ttl > 0);
        assert!(ttl <= 10);
    }

    #[tokio::test]
    async fn test_store_entry_expiration() {
        let store = MemoryStore::new();

        store.set_ex("key1", "value1", 1).await.unwrap();
        assert!(store.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("key1").await.unwrap(), None);
        assert_eq!(store.ttl("key1").await.unwrap(), TTL_MISSING);
        assert_eq!(store.del("key1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_purge_expired() {
        let store = MemoryStore::new();

        store.set_ex("expire_soon", "value", 1).await.unwrap();
        store.set_ex("long_lived", "value", 300).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let removed = store.purge_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("long_lived").await.unwrap().is_some());
    }

    #[test]
    fn test_store_offline_fails_every_command() {
        let store = MemoryStore::new();
        store.set_offline(true);

        tokio_test::block_on(async {
            assert!(store.get("key1").await.is_err());
            assert!(store.set_ex("key1", "value", 300).await.is_err());
            assert!(store.expire("key1", 300).await.is_err());
            assert!(store.ttl("key1").await.is_err());
            assert!(store.del("key1").await.is_err());
        });

        store.set_offline(false);
        tokio_test::block_on(async {
            assert!(store.get("key1").await.is_ok());
        });
    }
}
