//! Handle over a single slot.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::FutureExt;
use recache_core::{CacheConfig, CacheResult, Cacheable, Reply};
use recache_storage::CacheEngine;

use crate::actions::{ActionsList, SlotEntries};
use crate::builder::BuildHandle;
use crate::slot::Slot;

/// Typed handle over one cache slot.
///
/// Handles are cheap to clone and hold no state of their own; every call
/// delegates to the engine.
pub struct Provider<T, E> {
    slot: Slot<T, E>,
}

impl<T, E> Clone for Provider<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T, E> BuildHandle<E> for Provider<T, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    fn build(engine: Arc<E>, config: CacheConfig) -> Self {
        Self {
            slot: Slot::new(engine, config),
        }
    }
}

impl<T, E> Provider<T, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    /// The slot configuration this handle was built with.
    pub fn config(&self) -> &CacheConfig {
        self.slot.config()
    }

    /// Read the cached value.
    ///
    /// Fails with [`recache_core::CacheError::NotFound`] when nothing usable
    /// is stored.
    pub async fn read(&self) -> CacheResult<T> {
        self.slot.read(None).await
    }

    /// Read the cached value, mapping "nothing cached" to `None`.
    pub async fn read_nullable(&self) -> CacheResult<Option<T>> {
        self.slot.read_nullable(None).await
    }

    /// Read through `loader`: a cached value wins, otherwise the loader's
    /// value is stored and returned.
    pub async fn read_with_loader<F>(&self, loader: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.read_with_loader_as_reply(loader)
            .await
            .map(Reply::into_data)
    }

    /// Like [`Provider::read_with_loader`], keeping provenance.
    pub async fn read_with_loader_as_reply<F>(&self, loader: F) -> CacheResult<Reply<T>>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.slot.read_with_loader(None, loader.boxed()).await
    }

    /// Run `loader` and overwrite the slot with its value.
    ///
    /// A failing loader propagates and leaves the slot untouched.
    pub async fn replace<F>(&self, loader: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.replace_as_reply(loader).await.map(Reply::into_data)
    }

    /// Like [`Provider::replace`], keeping provenance.
    pub async fn replace_as_reply<F>(&self, loader: F) -> CacheResult<Reply<T>>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.slot.replace(None, loader.boxed()).await
    }

    /// Remove the slot. Evicting an empty slot succeeds.
    pub async fn evict(&self) -> CacheResult<()> {
        self.slot.evict(None).await
    }
}

impl<T, E> Provider<Vec<T>, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    /// Positional mutations over the stored list.
    pub fn entries(&self) -> ActionsList<T, SlotEntries<T, E>> {
        ActionsList::with(SlotEntries::new(self.slot.clone(), None))
    }
}
