//! Configuration Module
//!
//! Handles loading cache facade settings from environment variables.

use std::env;

use crate::cache::{CacheOptions, DEFAULT_SWEEP_INTERVAL_SECONDS, DEFAULT_TTL_SECONDS};

/// Cache facade configuration.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// User namespace segment, composed under the fixed `cache` root
    pub prefix: Option<String>,
    /// Default TTL in seconds for entries without an explicit override
    pub default_ttl: u64,
    /// Interval between scheduler maintenance passes, in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - user namespace segment (default: none)
    /// - `CACHE_DEFAULT_TTL` - default TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL` - sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            prefix: env::var("CACHE_PREFIX").ok().filter(|v| !v.is_empty()),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECONDS),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS),
        }
    }

    /// Converts the configuration into instance-level cache options.
    pub fn to_options(&self) -> CacheOptions {
        CacheOptions {
            prefix: self.prefix.clone(),
            seconds: Some(self.default_ttl),
            sweep_interval_secs: Some(self.sweep_interval),
            ..CacheOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: None,
            default_ttl: DEFAULT_TTL_SECONDS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}
