//! Two-tier in-memory engine.
//!
//! Slots live in a memory tier of decoded JSON values backed by a persisted
//! tier of serialized bytes. Dropping the memory tier with
//! [`InMemoryEngine::clear_memory`] leaves the persisted tier intact, the way
//! a process restart would.
//!
//! # Thread Safety
//!
//! Both tiers and the statistics sit behind one `RwLock`, so a store updates
//! both tiers in a single critical section. The lock is never held across a
//! loader poll.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recache_core::{
    CacheConfig, CacheError, CacheKey, CacheResult, Cacheable, EngineError, EvictionMode, Reply,
    Source,
};
use serde_json::Value;

use super::config::EngineConfig;
use super::traits::{CacheEngine, CacheStats, Loader};

/// Metadata stored alongside every slot.
#[derive(Debug, Clone)]
struct RecordMeta {
    saved_at: DateTime<Utc>,
    lifetime: Option<Duration>,
    expirable: bool,
    encrypted: bool,
}

impl RecordMeta {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(lifetime) = self.lifetime else {
            return false;
        };
        let age = now
            .signed_duration_since(self.saved_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age >= lifetime
    }
}

#[derive(Debug, Clone)]
struct MemoryRecord {
    value: Value,
    meta: RecordMeta,
}

#[derive(Debug, Clone)]
struct PersistedRecord {
    bytes: Vec<u8>,
    meta: RecordMeta,
}

#[derive(Debug, Default)]
struct Tiers {
    memory: HashMap<CacheKey, MemoryRecord>,
    persisted: HashMap<CacheKey, PersistedRecord>,
    stats: CacheStats,
}

impl Tiers {
    fn remove_where(&mut self, mode: &EvictionMode) -> u64 {
        self.memory.retain(|key, _| !mode.covers(key));
        let before = self.persisted.len();
        self.persisted.retain(|key, _| !mode.covers(key));
        let removed = (before - self.persisted.len()) as u64;
        self.stats.evictions += removed;
        self.stats.entry_count = self.persisted.len() as u64;
        removed
    }

    fn remove_key(&mut self, key: &CacheKey) {
        self.memory.remove(key);
        if self.persisted.remove(key).is_some() {
            self.stats.evictions += 1;
        }
        self.stats.entry_count = self.persisted.len() as u64;
    }
}

/// A value found in one of the tiers.
struct Found {
    value: Value,
    source: Source,
    encrypted: bool,
}

impl Found {
    fn decode<T: Cacheable>(self, key: &CacheKey) -> CacheResult<Reply<T>> {
        let data = serde_json::from_value(self.value).map_err(|e| EngineError::Deserialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Reply::new(data, self.source, self.encrypted))
    }
}

enum Lookup {
    Fresh(Found),
    Expired(Found),
    Missing,
}

/// In-memory cache engine with a memory tier and a persisted tier.
///
/// # Example
///
/// ```ignore
/// let engine = InMemoryEngine::new(EngineConfig::default());
/// let config = CacheConfig::new(CacheKey::new("users"));
///
/// let reply = engine
///     .fetch(&config, async { Ok(vec!["ada".to_string()]) }.boxed(), false)
///     .await?;
/// assert_eq!(reply.source(), Source::Cloud);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    config: EngineConfig,
    tiers: RwLock<Tiers>,
}

impl InMemoryEngine {
    /// Create a new engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tiers: RwLock::new(Tiers::default()),
        }
    }

    /// Create a new engine after validating `config`.
    pub fn try_new(config: EngineConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of persisted slots.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.read_tiers()?.persisted.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether a slot is persisted for `key`, expired or not.
    pub fn contains(&self, key: &CacheKey) -> CacheResult<bool> {
        Ok(self.read_tiers()?.persisted.contains_key(key))
    }

    /// Drop the memory tier, keeping persisted slots.
    pub fn clear_memory(&self) -> CacheResult<()> {
        let mut tiers = self.write_tiers()?;
        let dropped = tiers.memory.len();
        tiers.memory.clear();
        tracing::debug!(dropped, "Cleared memory tier");
        Ok(())
    }

    /// Get engine statistics.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        Ok(self.read_tiers()?.stats.clone())
    }

    fn read_tiers(&self) -> CacheResult<std::sync::RwLockReadGuard<'_, Tiers>> {
        self.tiers
            .read()
            .map_err(|_| CacheError::Engine(EngineError::LockPoisoned))
    }

    fn write_tiers(&self) -> CacheResult<RwLockWriteGuard<'_, Tiers>> {
        self.tiers
            .write()
            .map_err(|_| CacheError::Engine(EngineError::LockPoisoned))
    }

    fn evict(&self, mode: &EvictionMode) -> CacheResult<u64> {
        let removed = self.write_tiers()?.remove_where(mode);
        tracing::debug!(scope = ?mode, removed, "Evicted slots");
        Ok(removed)
    }

    fn lookup(&self, key: &CacheKey) -> CacheResult<Lookup> {
        let mut tiers = self.write_tiers()?;
        let now = Utc::now();

        let memory_hit = tiers.memory.get(key).cloned();
        let (found, meta) = match memory_hit {
            Some(record) => {
                let found = Found {
                    value: record.value,
                    source: Source::Memory,
                    encrypted: record.meta.encrypted,
                };
                (found, record.meta)
            }
            None => {
                let Some(record) = tiers.persisted.get(key).cloned() else {
                    return Ok(Lookup::Missing);
                };
                let value: Value = serde_json::from_slice(&record.bytes).map_err(|e| {
                    EngineError::Deserialization {
                        key: key.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                tiers.memory.insert(
                    key.clone(),
                    MemoryRecord {
                        value: value.clone(),
                        meta: record.meta.clone(),
                    },
                );
                let found = Found {
                    value,
                    source: Source::Persistence,
                    encrypted: record.meta.encrypted,
                };
                (found, record.meta)
            }
        };

        if !meta.is_expired(now) {
            tiers.stats.hits += 1;
            return Ok(Lookup::Fresh(found));
        }

        if self.config.use_expired_data_if_loader_not_available {
            return Ok(Lookup::Expired(found));
        }

        tracing::debug!(key = %key, "Dropping expired slot");
        tiers.remove_key(key);
        Ok(Lookup::Missing)
    }

    fn store<T: Cacheable>(&self, config: &CacheConfig, data: &T) -> CacheResult<()> {
        let key = config.key();
        let serialization_error = |e: serde_json::Error| EngineError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let value = serde_json::to_value(data).map_err(serialization_error)?;
        let bytes = serde_json::to_vec(&value).map_err(serialization_error)?;
        let meta = RecordMeta {
            saved_at: Utc::now(),
            lifetime: config.lifetime(),
            expirable: config.is_expirable(),
            encrypted: config.is_encrypted(),
        };

        let mut tiers = self.write_tiers()?;
        tiers.memory.insert(
            key.clone(),
            MemoryRecord {
                value,
                meta: meta.clone(),
            },
        );
        tiers.persisted.insert(key.clone(), PersistedRecord { bytes, meta });
        tiers.stats.entry_count = tiers.persisted.len() as u64;

        if let Some(max) = self.config.max_entries {
            Self::reclaim(&mut tiers, max);
        }
        Ok(())
    }

    /// Remove expirable slots, oldest first, until at most `max` remain.
    fn reclaim(tiers: &mut Tiers, max: usize) {
        let excess = tiers.persisted.len().saturating_sub(max);
        if excess == 0 {
            return;
        }

        let mut candidates: Vec<(DateTime<Utc>, CacheKey)> = tiers
            .persisted
            .iter()
            .filter(|(_, record)| record.meta.expirable)
            .map(|(key, record)| (record.meta.saved_at, key.clone()))
            .collect();
        candidates.sort();

        let reclaimed: Vec<CacheKey> = candidates
            .into_iter()
            .take(excess)
            .map(|(_, key)| key)
            .collect();
        for key in &reclaimed {
            tiers.remove_key(key);
        }

        tracing::debug!(
            reclaimed = reclaimed.len(),
            remaining = tiers.persisted.len(),
            max,
            "Reclaimed expirable slots over capacity"
        );
    }

    fn record_loader_failure(&self) -> CacheResult<()> {
        self.write_tiers()?.stats.loader_failures += 1;
        Ok(())
    }

    fn record_miss(&self) -> CacheResult<()> {
        self.write_tiers()?.stats.misses += 1;
        Ok(())
    }
}

#[async_trait]
impl CacheEngine for InMemoryEngine {
    async fn fetch<T: Cacheable>(
        &self,
        config: &CacheConfig,
        loader: Loader<T>,
        force_evict: bool,
    ) -> CacheResult<Reply<T>> {
        config.validate()?;
        let key = config.key();

        if force_evict {
            self.evict(&key.eviction_mode())?;
        }

        let stale = match self.lookup(key)? {
            Lookup::Fresh(found) => {
                tracing::debug!(key = %key, source = %found.source, "Cache hit");
                return found.decode(key);
            }
            Lookup::Expired(found) => Some(found),
            Lookup::Missing => None,
        };

        self.record_miss()?;
        tracing::debug!(key = %key, expired = stale.is_some(), "Cache miss, polling loader");

        match loader.await {
            Ok(data) => {
                self.store(config, &data)?;
                Ok(Reply::new(data, Source::Cloud, config.is_encrypted()))
            }
            Err(error) => {
                self.record_loader_failure()?;
                if let Some(found) = stale {
                    tracing::debug!(key = %key, "Loader failed, serving expired value");
                    return found.decode(key);
                }
                tracing::debug!(key = %key, error = %error, "Loader failed with no fallback");
                Err(CacheError::Aggregate(vec![error, CacheError::not_found(key)]))
            }
        }
    }

    async fn evict_all(&self) -> CacheResult<()> {
        self.evict(&EvictionMode::All)?;
        Ok(())
    }
}
