//! Handle over a family of slots sharing one primary key.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::FutureExt;
use recache_core::{CacheConfig, CacheResult, Cacheable, Reply};
use recache_storage::CacheEngine;

use crate::actions::{ActionsList, SlotEntries};
use crate::builder::BuildHandle;
use crate::slot::Slot;

/// Typed handle over a primary key whose slots are partitioned by group.
///
/// Every operation names the group it addresses. An empty group is a group
/// like any other. [`ProviderGroup::evict`] clears every group at once.
pub struct ProviderGroup<T, E> {
    slot: Slot<T, E>,
}

impl<T, E> Clone for ProviderGroup<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T, E> BuildHandle<E> for ProviderGroup<T, E>
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

impl<T, E> ProviderGroup<T, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    pub fn config(&self) -> &CacheConfig {
        self.slot.config()
    }

    pub async fn read(&self, group: impl AsRef<str>) -> CacheResult<T> {
        self.slot.read(Some(group.as_ref())).await
    }

    pub async fn read_nullable(&self, group: impl AsRef<str>) -> CacheResult<Option<T>> {
        self.slot.read_nullable(Some(group.as_ref())).await
    }

    pub async fn read_with_loader<F>(&self, group: impl AsRef<str>, loader: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.read_with_loader_as_reply(group, loader)
            .await
            .map(Reply::into_data)
    }

    pub async fn read_with_loader_as_reply<F>(
        &self,
        group: impl AsRef<str>,
        loader: F,
    ) -> CacheResult<Reply<T>>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.slot
            .read_with_loader(Some(group.as_ref()), loader.boxed())
            .await
    }

    /// Run `loader` and overwrite the group's slot. Other groups keep their
    /// values.
    pub async fn replace<F>(&self, group: impl AsRef<str>, loader: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.replace_as_reply(group, loader)
            .await
            .map(Reply::into_data)
    }

    pub async fn replace_as_reply<F>(
        &self,
        group: impl AsRef<str>,
        loader: F,
    ) -> CacheResult<Reply<T>>
    where
        F: Future<Output = CacheResult<T>> + Send + 'static,
    {
        self.slot.replace(Some(group.as_ref()), loader.boxed()).await
    }

    /// Remove every group under this primary key.
    pub async fn evict(&self) -> CacheResult<()> {
        self.slot.evict(None).await
    }

    /// Remove one group, leaving its siblings in place.
    pub async fn evict_group(&self, group: impl AsRef<str>) -> CacheResult<()> {
        self.slot.evict(Some(group.as_ref())).await
    }
}

impl<T, E> ProviderGroup<Vec<T>, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    /// Positional mutations over the list stored under `group`.
    pub fn entries(&self, group: impl Into<String>) -> ActionsList<T, SlotEntries<T, E>> {
        ActionsList::with(SlotEntries::new(self.slot.clone(), Some(group.into())))
    }
}

#[cfg(test)]
mod tests {
    use recache_storage::InMemoryEngine;

    use crate::ReactiveCache;

    #[tokio::test]
    async fn test_groups_are_independent() {
        let cache = ReactiveCache::new(InMemoryEngine::default());
        let group = cache.provider_group::<String>().with_key("profile");

        group
            .replace("alice", async { Ok("a".to_string()) })
            .await
            .unwrap();
        group
            .replace("bob", async { Ok("b".to_string()) })
            .await
            .unwrap();

        assert_eq!(group.read("alice").await.unwrap(), "a");
        assert_eq!(group.read("bob").await.unwrap(), "b");
        assert!(group.read("carol").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_evict_group_keeps_siblings() {
        let cache = ReactiveCache::new(InMemoryEngine::default());
        let group = cache.provider_group::<u32>().with_key("score");
        group.replace("1", async { Ok(10) }).await.unwrap();
        group.replace("2", async { Ok(20) }).await.unwrap();

        group.evict_group("1").await.unwrap();

        assert_eq!(group.read_nullable("1").await.unwrap(), None);
        assert_eq!(group.read_nullable("2").await.unwrap(), Some(20));
    }

    #[tokio::test]
    async fn test_evict_clears_family() {
        let cache = ReactiveCache::new(InMemoryEngine::default());
        let group = cache.provider_group::<u32>().with_key("score");
        group.replace("1", async { Ok(10) }).await.unwrap();
        group.replace("2", async { Ok(20) }).await.unwrap();

        group.evict().await.unwrap();

        assert_eq!(group.read_nullable("1").await.unwrap(), None);
        assert_eq!(group.read_nullable("2").await.unwrap(), None);
    }
}
