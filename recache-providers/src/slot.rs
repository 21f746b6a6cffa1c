//! Operations shared by every handle kind.
//!
//! A [`Slot`] is a configured accessor over one primary key. Every operation
//! goes through [`CacheEngine::fetch`]; reads and evictions supply loaders
//! that can never produce a value and then reclassify the failure they cause.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::{self, FutureExt};
use recache_core::{classify, CacheConfig, CacheResult, Cacheable, Reply};
use recache_storage::{CacheEngine, Loader};

pub(crate) struct Slot<T, E> {
    engine: Arc<E>,
    config: CacheConfig,
    _value: PhantomData<fn() -> T>,
}

impl<T, E> Clone for Slot<T, E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
            _value: PhantomData,
        }
    }
}

/// Loader for plain reads. Polling it means nothing was cached.
fn placeholder_loader<T: Cacheable>() -> Loader<T> {
    future::ready(Err(classify::placeholder_error())).boxed()
}

/// Loader for evictions, which only exist for their side effect.
fn eviction_loader<T: Cacheable>() -> Loader<T> {
    future::ready(Err(classify::eviction_error())).boxed()
}

impl<T, E> Slot<T, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    pub(crate) fn new(engine: Arc<E>, config: CacheConfig) -> Self {
        Self {
            engine,
            config,
            _value: PhantomData,
        }
    }

    pub(crate) fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn config_for(&self, group: Option<&str>) -> Cow<'_, CacheConfig> {
        match group {
            Some(group) => Cow::Owned(self.config.for_group(group)),
            None => Cow::Borrowed(&self.config),
        }
    }

    pub(crate) async fn read(&self, group: Option<&str>) -> CacheResult<T> {
        let config = self.config_for(group);
        tracing::trace!(key = %config.key(), "Reading slot");
        self.engine
            .fetch(&config, placeholder_loader::<T>(), false)
            .await
            .map(Reply::into_data)
            .map_err(classify::strip_sentinel)
    }

    pub(crate) async fn read_nullable(&self, group: Option<&str>) -> CacheResult<Option<T>> {
        match self.read(group).await {
            Ok(data) => Ok(Some(data)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub(crate) async fn read_with_loader(
        &self,
        group: Option<&str>,
        loader: Loader<T>,
    ) -> CacheResult<Reply<T>> {
        let config = self.config_for(group);
        tracing::trace!(key = %config.key(), "Reading slot with loader");
        self.engine.fetch(&config, loader, false).await
    }

    /// Poll the loader first; the slot is only touched once it succeeded.
    pub(crate) async fn replace(
        &self,
        group: Option<&str>,
        loader: Loader<T>,
    ) -> CacheResult<Reply<T>> {
        let data = loader.await?;
        let config = self.config_for(group);
        tracing::trace!(key = %config.key(), "Replacing slot");
        self.engine
            .fetch(&config, future::ready(Ok(data)).boxed(), true)
            .await
    }

    pub(crate) async fn evict(&self, group: Option<&str>) -> CacheResult<()> {
        let config = self.config_for(group);
        tracing::trace!(key = %config.key(), "Evicting slot");
        match self
            .engine
            .fetch(&config, eviction_loader::<T>(), true)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => classify::complete_on_eviction_error(error),
        }
    }
}
