//! Cache root: the entry point handing out configured handles.

use std::sync::Arc;

use recache_core::{CacheResult, Cacheable};
use recache_storage::{CacheEngine, EngineConfig, InMemoryEngine};

use crate::builder::ProviderBuilder;
use crate::provider::Provider;
use crate::provider_group::ProviderGroup;

/// Factory for handles over one shared engine.
///
/// ```ignore
/// let cache = ReactiveCache::builder().max_entries(1_000).build()?;
/// let mocks = cache.provider_list::<Mock>().with_key("mocks");
/// mocks.replace(async { Ok(vec![Mock::new("a")]) }).await?;
/// mocks.entries().add_last(Mock::new("b")).await?;
/// ```
pub struct ReactiveCache<E = InMemoryEngine> {
    engine: Arc<E>,
}

impl<E> Clone for ReactiveCache<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: CacheEngine> ReactiveCache<E> {
    pub fn new(engine: E) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    /// Build a root over an engine that is also used elsewhere.
    pub fn from_shared(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Start configuring a single-slot handle.
    pub fn provider<T: Cacheable>(&self) -> ProviderBuilder<Provider<T, E>, E> {
        ProviderBuilder::new(Arc::clone(&self.engine))
    }

    /// Start configuring a grouped handle.
    pub fn provider_group<T: Cacheable>(&self) -> ProviderBuilder<ProviderGroup<T, E>, E> {
        ProviderBuilder::new(Arc::clone(&self.engine))
    }

    /// Start configuring a single-slot handle over a list, which exposes
    /// [`Provider::entries`].
    pub fn provider_list<T: Cacheable>(&self) -> ProviderBuilder<Provider<Vec<T>, E>, E> {
        self.provider()
    }

    /// Start configuring a grouped handle over lists, which exposes
    /// [`ProviderGroup::entries`].
    pub fn provider_group_list<T: Cacheable>(
        &self,
    ) -> ProviderBuilder<ProviderGroup<Vec<T>, E>, E> {
        self.provider_group()
    }

    /// Clear every slot in the engine, whatever its key or group.
    pub async fn evict_all(&self) -> CacheResult<()> {
        tracing::debug!("Evicting every slot");
        self.engine.evict_all().await
    }
}

impl ReactiveCache<InMemoryEngine> {
    /// Configure a root over an [`InMemoryEngine`].
    pub fn builder() -> ReactiveCacheBuilder {
        ReactiveCacheBuilder::default()
    }
}

/// Builder for a [`ReactiveCache`] over an [`InMemoryEngine`].
#[derive(Debug, Clone, Default)]
pub struct ReactiveCacheBuilder {
    config: EngineConfig,
}

impl ReactiveCacheBuilder {
    /// Serve an expired value when the loader fails.
    pub fn use_expired_data_if_loader_not_available(mut self, enabled: bool) -> Self {
        self.config = self.config.with_expired_data_fallback(enabled);
        self
    }

    /// Bound the number of persisted slots.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.config = self.config.with_max_entries(max);
        self
    }

    /// Replace every option with `config`, e.g. one from
    /// [`EngineConfig::from_env`].
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the options and build the root.
    pub fn build(self) -> CacheResult<ReactiveCache<InMemoryEngine>> {
        let engine = InMemoryEngine::try_new(self.config)?;
        Ok(ReactiveCache::new(engine))
    }
}
