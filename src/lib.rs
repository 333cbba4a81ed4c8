//! Tagcache - a namespaced, TTL-governed cache facade
//!
//! Builds composite key paths from a fixed namespace root, tag-dimension
//! contexts and logical identifiers; keeps local expiry hints to avoid
//! redundant TTL round-trips; and runs a background scheduler that keeps
//! tracked entries alive in a redis-compatible store.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod scheduler;
pub mod store;

pub use cache::{Cache, CacheEvent, CacheOptions, ExpiryTracker, SetOptions};
pub use config::Config;
pub use error::{CacheError, Result, StoreError};
pub use key::{KeyContext, KeyPathBuilder};
pub use scheduler::{CacheScheduler, SchedulerState};
pub use store::{MemoryStore, Store};
