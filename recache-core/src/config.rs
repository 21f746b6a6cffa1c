//! Per-slot configuration

use crate::{CacheError, CacheKey, CacheResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration a handle passes to the engine on every call.
///
/// Built once when a handle is created and never mutated afterwards; the
/// `with_*` methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    key: CacheKey,
    /// `None` means the value never expires passively.
    lifetime: Option<Duration>,
    /// Whether the engine may reclaim the entry under storage pressure.
    expirable: bool,
    encrypted: bool,
}

impl CacheConfig {
    /// Create a config for `key` with the library defaults: no lifetime,
    /// expirable, not encrypted.
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            lifetime: None,
            expirable: true,
            encrypted: false,
        }
    }

    /// Set how long a stored value stays valid.
    pub fn with_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_expirable(mut self, expirable: bool) -> Self {
        self.expirable = expirable;
        self
    }

    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Return a copy addressing `group` under the same primary key.
    pub fn for_group(&self, group: &str) -> Self {
        Self {
            key: self.key.in_group(group),
            ..self.clone()
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    pub fn is_expirable(&self) -> bool {
        self.expirable
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Validate the configuration.
    ///
    /// Validates that the primary key is not empty. A zero lifetime is
    /// valid and means records expire as soon as they are written.
    pub fn validate(&self) -> CacheResult<()> {
        if self.key.primary().is_empty() {
            return Err(CacheError::Config(ConfigError::MissingRequired {
                field: "key".to_string(),
            }));
        }

        Ok(())
    }
}
