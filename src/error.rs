//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Errors surfaced by the external store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached (connectivity, timeout)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store reported a command failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Read misses never surface here: `get` swallows store and payload errors
/// and reports a miss instead. Writes and deletes propagate store errors so
/// callers never lose a mutation silently.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error propagated from the external store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Value could not be serialized for storage
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Scheduler failed its start transition
    #[error("Scheduler start failed: {0}")]
    SchedulerStart(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
