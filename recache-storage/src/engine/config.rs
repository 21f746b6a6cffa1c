//! Engine-wide configuration.

use recache_core::{CacheError, CacheResult, ConfigError};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::InMemoryEngine`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Serve an expired value when the loader fails instead of failing.
    pub use_expired_data_if_loader_not_available: bool,
    /// Maximum number of persisted slots. Expirable slots are reclaimed
    /// oldest-first once this is exceeded. `None` means unbounded.
    pub max_entries: Option<usize>,
}

impl EngineConfig {
    /// Create a new engine config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch expired records instead of failing when the loader fails.
    pub fn with_expired_data_fallback(mut self, enabled: bool) -> Self {
        self.use_expired_data_if_loader_not_available = enabled;
        self
    }

    /// Set the persisted-tier capacity.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `RECACHE_USE_EXPIRED_DATA`: `true`/`false` (default: false)
    /// - `RECACHE_MAX_ENTRIES`: persisted-tier capacity (default: unbounded)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            use_expired_data_if_loader_not_available: std::env::var("RECACHE_USE_EXPIRED_DATA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.use_expired_data_if_loader_not_available),
            max_entries: std::env::var("RECACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(defaults.max_entries),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CacheResult<()> {
        if self.max_entries == Some(0) {
            return Err(CacheError::Config(ConfigError::InvalidValue {
                field: "max_entries".to_string(),
                value: "0".to_string(),
                reason: "max_entries must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}
