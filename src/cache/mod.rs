//! Cache Module
//!
//! Facade orchestrating get/set/drop/expiry checks against the external
//! store, with composite key construction, local expiry hints and a
//! keep-alive scheduler lifecycle.

mod options;
mod tracker;


// Re-export public types
pub use options::{
    CacheOptions, SetOptions, DEFAULT_SWEEP_INTERVAL_SECONDS, DEFAULT_TTL_SECONDS, NAMESPACE_ROOT,
};
pub use tracker::ExpiryTracker;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};

use crate::error::Result;
use crate::key::{KeyContext, KeyPathBuilder};
use crate::scheduler::{CacheScheduler, SchedulerState};
use crate::store::Store;

/// Sentinel payload written when an entry is a pure existence flag.
pub const SENTINEL_PAYLOAD: &str = "true";

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

// == Cache Events ==
/// Side-channel notifications emitted by the cache and its scheduler.
///
/// These are observability signals for external subscribers (e.g. health
/// checks), not part of the data contract; delivery is best-effort and
/// never exactly-once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// The keep-alive scheduler finished its start transition
    SchedulerStarted,
    /// The keep-alive scheduler was stopped and released
    SchedulerStopped,
    /// A sweep found a tracked entry gone from the store
    EntryExpired(String),
}

// == Cache ==
/// Namespaced, TTL-governed cache facade over an external redis-compatible
/// store.
///
/// Every operation first renders a physical key path from the instance
/// options merged with per-call overrides, consults or updates the local
/// [`ExpiryTracker`], then talks to the store. The store handle is shared
/// with the scheduler and must outlive it; holding it in an `Arc` enforces
/// that.
pub struct Cache {
    /// Shared handle on the external store
    store: Arc<dyn Store>,
    /// Instance-level key-construction and TTL configuration
    options: CacheOptions,
    /// Local expected-expiry hints, shared with the scheduler sweep
    tracker: Arc<RwLock<ExpiryTracker>>,
    /// At most one scheduler lives per cache instance
    scheduler: Mutex<Option<CacheScheduler>>,
    /// Lifecycle event channel
    events: broadcast::Sender<CacheEvent>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache facade over the given store handle.
    pub fn new(store: Arc<dyn Store>, options: CacheOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            store,
            options,
            tracker: Arc::new(RwLock::new(ExpiryTracker::new())),
            scheduler: Mutex::new(None),
            events,
        }
    }

    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    // == Key Construction ==
    /// Returns the instance options merged with per-call overrides, with
    /// the prefix rooted under the fixed `cache` namespace.
    ///
    /// Exposed so consumers (the scheduler included) can predict a key path
    /// without performing an operation.
    pub fn build_options(&self, overrides: Option<&SetOptions>) -> CacheOptions {
        self.options.merged(overrides)
    }

    /// Renders the physical key path for a logical id and optional context.
    ///
    /// A per-call context wins over the instance default context.
    pub fn build_key(&self, id: Option<&str>, context: Option<&KeyContext>) -> String {
        let options = self.build_options(None);

        let mut builder = KeyPathBuilder::new();
        if let Some(prefix) = options.prefix {
            builder = builder.prefix(prefix);
        }
        if let Some(context) = context.cloned().or(options.context) {
            builder = builder.context(context);
        }
        if let Some(id) = id {
            builder = builder.id(id);
        }
        if let Some(suffix) = options.suffix {
            builder = builder.suffix(suffix);
        }

        builder.build()
    }

    fn resolve_seconds(&self, overrides: Option<&SetOptions>) -> u64 {
        overrides
            .and_then(|options| options.seconds)
            .or(self.options.seconds)
            .unwrap_or(DEFAULT_TTL_SECONDS)
    }

    // == Is Expired ==
    /// Returns whether the entry is expired or absent.
    ///
    /// A tracker hint short-circuits the remote TTL query: if the key path
    /// is tracked, the entry is reported live without a store round-trip.
    pub async fn is_expired(&self, id: &str, context: Option<&KeyContext>) -> Result<bool> {
        let key_path = self.build_key(Some(id), context);

        if self.tracker.read().await.contains(&key_path) {
            return Ok(false);
        }

        let ttl = self.store.ttl(&key_path).await?;
        Ok(ttl <= 0)
    }

    // == Set ==
    /// Serializes and writes a value with a TTL, always overwriting, and
    /// records the expected expiry locally.
    ///
    /// The TTL resolves from the call override, else the instance default,
    /// else the fixed 300 second fallback.
    pub async fn set<T: Serialize>(
        &self,
        id: &str,
        value: &T,
        options: Option<SetOptions>,
    ) -> Result<()> {
        let key_path = self.build_key(Some(id), options.as_ref().and_then(|o| o.context.as_ref()));
        let seconds = self.resolve_seconds(options.as_ref());

        let payload = serde_json::to_string(value)?;
        self.store.set_ex(&key_path, &payload, seconds).await?;

        self.tracker.write().await.record(&key_path, seconds);
        debug!(key = %key_path, seconds, "cache entry written");
        Ok(())
    }

    // == Touch ==
    /// Keep-alive form of `set` carrying no payload: refreshes the TTL of
    /// an existing key, creating it with the sentinel payload when the
    /// refresh reports that the key does not exist.
    pub async fn touch(&self, id: &str, options: Option<SetOptions>) -> Result<()> {
        let key_path = self.build_key(Some(id), options.as_ref().and_then(|o| o.context.as_ref()));
        let seconds = self.resolve_seconds(options.as_ref());

        let refreshed = self.store.expire(&key_path, seconds).await?;
        if !refreshed {
            self.store.set_ex(&key_path, SENTINEL_PAYLOAD, seconds).await?;
        }

        self.tracker.write().await.record(&key_path, seconds);
        debug!(key = %key_path, seconds, refreshed, "cache entry kept alive");
        Ok(())
    }

    // == Get ==
    /// Reads and deserializes an entry.
    ///
    /// Missing keys, store errors and corrupt payloads all read as a miss;
    /// availability wins over surfacing corruption.
    pub async fn get<T: DeserializeOwned>(&self, id: &str, context: Option<&KeyContext>) -> Option<T> {
        let key_path = self.build_key(Some(id), context);

        let entry = match self.store.get(&key_path).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                debug!(key = %key_path, error = %e, "store read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&entry) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = %key_path, error = %e, "corrupt cache payload, treating as miss");
                None
            }
        }
    }

    // == Drop ==
    /// Removes the local hint and deletes the remote key.
    ///
    /// # Returns
    /// `true` when the remote delete removed exactly one entry.
    pub async fn drop(&self, id: &str, context: Option<&KeyContext>) -> Result<bool> {
        let key_path = self.build_key(Some(id), context);

        self.tracker.write().await.remove(&key_path);

        let removed = self.store.del(&key_path).await?;
        Ok(removed == 1)
    }

    // == Scheduler Lifecycle ==
    /// Lazily creates and starts the keep-alive scheduler.
    ///
    /// Repeated or concurrent calls while one is running short-circuit on
    /// the cached instance; the lock guarantees at most one scheduler ever
    /// runs per cache. A start failure leaves the slot empty and the cache
    /// fully usable for direct operations.
    pub async fn start_scheduler(&self) -> Result<()> {
        let mut slot = self.scheduler.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let mut scheduler = CacheScheduler::new(
            Arc::clone(&self.store),
            self.build_options(None),
            Arc::clone(&self.tracker),
            self.events.clone(),
        );
        scheduler.start().await?;

        *slot = Some(scheduler);
        let _ = self.events.send(CacheEvent::SchedulerStarted);
        info!("cache scheduler started");
        Ok(())
    }

    /// Stops and releases the scheduler, waiting for any in-flight sweep to
    /// finish. No-op when none is running; the next `start_scheduler`
    /// creates a fresh instance.
    pub async fn stop_scheduler(&self) {
        let mut slot = self.scheduler.lock().await;
        if let Some(mut scheduler) = slot.take() {
            scheduler.stop().await;
            let _ = self.events.send(CacheEvent::SchedulerStopped);
            info!("cache scheduler stopped");
        }
    }

    /// Current scheduler lifecycle state.
    pub async fn scheduler_state(&self) -> SchedulerState {
        match self.scheduler.lock().await.as_ref() {
            Some(scheduler) => scheduler.state(),
            None => SchedulerState::Stopped,
        }
    }
}
