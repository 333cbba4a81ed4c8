//! Cache Options
//!
//! Key-construction and TTL configuration, merged per call.

use crate::key::KeyContext;

// == Public Constants ==
/// Top-level namespace segment fixed for every key this subsystem produces.
pub const NAMESPACE_ROOT: &str = "cache";

/// Fallback TTL in seconds when neither the call nor the instance sets one.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Default interval between scheduler maintenance passes, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 30;

// == Cache Options ==
/// Instance-level configuration for key construction and TTLs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions {
    /// User namespace segment, composed under the fixed `cache` root
    pub prefix: Option<String>,
    /// Static qualifier appended after the identifier
    pub suffix: Option<String>,
    /// Default TTL in seconds when a call does not override it
    pub seconds: Option<u64>,
    /// Default tag-dimension context when a call does not override it
    pub context: Option<KeyContext>,
    /// Interval between scheduler maintenance passes, in seconds
    pub sweep_interval_secs: Option<u64>,
}

// == Set Options ==
/// Per-call overrides for write operations.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// TTL in seconds for this call, overriding the instance default
    pub seconds: Option<u64>,
    /// Context for this call, overriding the instance default
    pub context: Option<KeyContext>,
}

impl CacheOptions {
    /// Merges per-call overrides over the instance defaults and roots the
    /// prefix under the fixed namespace, so keys from this subsystem never
    /// collide with unrelated keys in a shared store.
    pub fn merged(&self, overrides: Option<&SetOptions>) -> CacheOptions {
        let prefix = match &self.prefix {
            Some(prefix) => format!("{}.{}", NAMESPACE_ROOT, prefix),
            None => NAMESPACE_ROOT.to_string(),
        };

        CacheOptions {
            prefix: Some(prefix),
            suffix: self.suffix.clone(),
            seconds: overrides
                .and_then(|options| options.seconds)
                .or(self.seconds),
            context: overrides
                .and_then(|options| options.context.clone())
                .or_else(|| self.context.clone()),
            sweep_interval_secs: self.sweep_interval_secs,
        }
    }
}
