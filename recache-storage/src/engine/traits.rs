//! Cache engine trait and shared engine types.
//!
//! The engine is the collaborator that actually persists slots. Handles only
//! ever talk to it through [`CacheEngine::fetch`] and
//! [`CacheEngine::evict_all`].

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use recache_core::{CacheConfig, CacheResult, Cacheable, Reply};
use serde::{Deserialize, Serialize};

/// A deferred computation producing one value or one failure.
///
/// Engines may drop a loader without polling it; loaders must tolerate that.
pub type Loader<T> = BoxFuture<'static, CacheResult<T>>;

/// Cache engine trait for pluggable engine implementations.
///
/// # Fetch Contract
///
/// `fetch` looks up the slot named by `config.key()`:
///
/// - If `force_evict` is set, the eviction scope of the key
///   ([`recache_core::CacheKey::eviction_mode`]) is discarded first.
/// - A present, unexpired value is returned without polling `loader`.
/// - Otherwise `loader` runs. On success its value is stored and returned with
///   [`recache_core::Source::Cloud`]. On failure the engine returns
///   `CacheError::Aggregate([loader error, NotFound])`, unless it is
///   configured to fall back to an expired value.
///
/// A store replaces the slot as a whole or not at all.
#[async_trait]
pub trait CacheEngine: Send + Sync {
    /// Fetch a slot, falling back to `loader` on miss or expiry.
    async fn fetch<T: Cacheable>(
        &self,
        config: &CacheConfig,
        loader: Loader<T>,
        force_evict: bool,
    ) -> CacheResult<Reply<T>>;

    /// Clear every slot the engine manages.
    async fn evict_all(&self) -> CacheResult<()>;
}

/// Statistics about engine usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the memory or persisted tier.
    pub hits: u64,
    /// Lookups that had to poll the loader.
    pub misses: u64,
    /// Loader polls that failed.
    pub loader_failures: u64,
    /// Slots removed by eviction or capacity reclaim.
    pub evictions: u64,
    /// Number of slots currently persisted.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
