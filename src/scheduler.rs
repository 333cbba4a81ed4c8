//! Cache Scheduler
//!
//! Background task that periodically sweeps the tracked key set, renewing
//! remote TTLs for entries still considered active and pruning hints for
//! entries that lapsed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEvent, CacheOptions, ExpiryTracker, DEFAULT_SWEEP_INTERVAL_SECONDS, DEFAULT_TTL_SECONDS,
};
use crate::error::{CacheError, Result};
use crate::key::KeyPathBuilder;
use crate::store::Store;

// == Scheduler State ==
/// Lifecycle stage of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

// == Cache Scheduler ==
/// Timer-driven maintenance task bound to the same store handle and key
/// construction rules as the cache that owns it.
///
/// The sweep reconciles the shared [`ExpiryTracker`] with remote TTL state:
/// entries whose local expected expiry is still in the future are treated
/// as active and get their remote TTL renewed; entries whose hint lapsed
/// are pruned once the store confirms they are gone, emitting an
/// [`CacheEvent::EntryExpired`] notification. A store failure aborts the
/// pass and the loop retries on the next tick.
pub struct CacheScheduler {
    /// Shared handle on the external store
    store: Arc<dyn Store>,
    /// Merged options of the owning cache, including the rooted prefix
    options: CacheOptions,
    /// Expiry hints shared with the owning cache
    tracker: Arc<RwLock<ExpiryTracker>>,
    /// Event channel shared with the owning cache
    events: broadcast::Sender<CacheEvent>,
    state: SchedulerState,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl CacheScheduler {
    // == Constructor ==
    /// Creates a stopped scheduler over the given store handle, merged
    /// cache options, shared tracker and event channel.
    pub fn new(
        store: Arc<dyn Store>,
        options: CacheOptions,
        tracker: Arc<RwLock<ExpiryTracker>>,
        events: broadcast::Sender<CacheEvent>,
    ) -> Self {
        Self {
            store,
            options,
            tracker,
            events,
            state: SchedulerState::Stopped,
            shutdown: None,
            handle: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    // == Start ==
    /// Starts the sweep loop. No-op when already running.
    ///
    /// The store is probed first so an unreachable store rejects the
    /// transition before any task is spawned, leaving the state `Stopped`.
    pub async fn start(&mut self) -> Result<()> {
        if self.state == SchedulerState::Running {
            return Ok(());
        }

        self.state = SchedulerState::Starting;

        let probe_key = self.probe_key();
        if let Err(e) = self.store.ttl(&probe_key).await {
            self.state = SchedulerState::Stopped;
            return Err(CacheError::SchedulerStart(e.to_string()));
        }

        let interval_secs = self
            .options
            .sweep_interval_secs
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS);
        let renew_secs = self.options.seconds.unwrap_or(DEFAULT_TTL_SECONDS);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let tracker = Arc::clone(&self.tracker);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs, renew_secs, "scheduler sweep loop started");

            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of an interval resolves immediately; consume it
            // so the initial sweep lands one full interval after start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        run_sweep(&store, &tracker, &events, renew_secs).await;
                    }
                }
            }

            debug!("scheduler sweep loop exited");
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
        self.state = SchedulerState::Running;
        Ok(())
    }

    // == Stop ==
    /// Signals the loop to exit and waits for any in-flight sweep to
    /// finish, so the store is never touched after teardown. No-op when the
    /// scheduler never started.
    pub async fn stop(&mut self) {
        if self.state != SchedulerState::Running {
            return;
        }

        self.state = SchedulerState::Stopping;

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "scheduler task ended abnormally");
            }
        }

        self.state = SchedulerState::Stopped;
    }

    /// Key probed at startup: the namespace root, built with the same rules
    /// the cache uses, so the probe exercises the exact key space the sweep
    /// will touch.
    fn probe_key(&self) -> String {
        let mut builder = KeyPathBuilder::new();
        if let Some(prefix) = &self.options.prefix {
            builder = builder.prefix(prefix.clone());
        }
        builder.build()
    }
}

// == Sweep ==
/// One maintenance pass over the tracked key set.
async fn run_sweep(
    store: &Arc<dyn Store>,
    tracker: &Arc<RwLock<ExpiryTracker>>,
    events: &broadcast::Sender<CacheEvent>,
    renew_secs: u64,
) {
    let key_paths = tracker.read().await.key_paths();
    if key_paths.is_empty() {
        return;
    }

    let now = Utc::now();
    let mut renewed: usize = 0;
    let mut pruned: usize = 0;

    for key_path in key_paths {
        let expires_at = match tracker.read().await.expires_at(&key_path) {
            Some(expires_at) => expires_at,
            // Dropped by a foreground operation since the snapshot.
            None => continue,
        };

        if expires_at > now {
            // Active entry: renew the remote TTL and keep the hint fresh.
            match store.expire(&key_path, renew_secs).await {
                Ok(true) => {
                    tracker.write().await.record(&key_path, renew_secs);
                    renewed += 1;
                }
                Ok(false) => {
                    // The key vanished remotely (evicted or deleted out of
                    // band); the hint no longer reflects anything.
                    tracker.write().await.remove(&key_path);
                    let _ = events.send(CacheEvent::EntryExpired(key_path.clone()));
                    pruned += 1;
                }
                Err(e) => {
                    warn!(error = %e, "store unavailable, skipping sweep pass");
                    return;
                }
            }
        } else {
            // Lapsed hint: consult the remote TTL before pruning.
            match store.ttl(&key_path).await {
                Ok(ttl) if ttl <= 0 => {
                    tracker.write().await.remove(&key_path);
                    let _ = events.send(CacheEvent::EntryExpired(key_path.clone()));
                    pruned += 1;
                }
                Ok(_) => {
                    // Still alive remotely; the next pass re-checks.
                }
                Err(e) => {
                    warn!(error = %e, "store unavailable, skipping sweep pass");
                    return;
                }
            }
        }
    }

    if renewed > 0 || pruned > 0 {
        debug!(renewed, pruned, "sweep pass complete");
    }
}
