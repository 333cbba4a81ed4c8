//! Store Module
//!
//! Abstraction over the external redis-compatible key-value store.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

// == Store Trait ==
/// Minimal contract required from the backing key-value store.
///
/// Mirrors the redis commands the facade relies on: `GET`, `SET` with
/// expiry, `EXPIRE`, `TTL` and `DEL`. Implementations must be safe to share
/// between the cache and its scheduler through a single `Arc` handle.
/// Durability and replication are entirely the store's concern.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the value stored at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Creates or overwrites `key` with `value` and a TTL in seconds.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), StoreError>;

    /// Applies a TTL to an existing key.
    ///
    /// # Returns
    /// `false` when the key does not exist (the TTL was not applied).
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool, StoreError>;

    /// Returns the remaining TTL in seconds.
    ///
    /// Zero or negative means the key is absent or already expired.
    async fn ttl(&self, key: &str) -> Result<i64, StoreError>;

    /// Deletes `key`, returning the number of entries removed.
    async fn del(&self, key: &str) -> Result<u64, StoreError>;
}
