//! List entry scenarios over real engines.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future;
use proptest::prelude::*;
use recache_providers::{
    ActionsList, CacheEngine, CacheError, CacheResult, InMemoryEngine, ListStore, Provider,
    ReactiveCache,
};
use recache_test_utils::assertions::{assert_engine_error, assert_not_found};
use recache_test_utils::fixtures::{digit_mocks, messages, Mock};
use recache_test_utils::generators::arb_mocks;
use recache_test_utils::{init_test_tracing, FaultyEngine};
use tokio::sync::Barrier;

fn cache() -> ReactiveCache<InMemoryEngine> {
    init_test_tracing();
    ReactiveCache::new(InMemoryEngine::default())
}

async fn seeded(
    cache: &ReactiveCache<InMemoryEngine>,
    n: usize,
) -> Provider<Vec<Mock>, InMemoryEngine> {
    let provider = cache.provider_list::<Mock>().with_key("mocks");
    provider
        .replace(future::ready(Ok(digit_mocks(n))))
        .await
        .unwrap();
    provider
}

#[tokio::test]
async fn evict_first_n_on_digits() {
    let cache = cache();
    let provider = seeded(&cache, 10).await;

    provider.entries().evict_first_n(4).await.unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(messages(&mocks), vec!["4", "5", "6", "7", "8", "9"]);
}

#[tokio::test]
async fn evict_last_n_on_digits() {
    let cache = cache();
    let provider = seeded(&cache, 10).await;

    provider.entries().evict_last_n(4).await.unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(messages(&mocks), vec!["0", "1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn evict_all_keeping_first_and_last_on_digits() {
    let cache = cache();
    let provider = seeded(&cache, 10).await;
    provider.entries().evict_all_keeping_first_n(3).await.unwrap();
    assert_eq!(
        messages(&provider.read().await.unwrap()),
        vec!["0", "1", "2"]
    );

    let provider = seeded(&cache, 10).await;
    provider.entries().evict_all_keeping_last_n(7).await.unwrap();
    assert_eq!(
        messages(&provider.read().await.unwrap()),
        vec!["3", "4", "5", "6", "7", "8", "9"]
    );
}

#[tokio::test]
async fn evict_last_n_beyond_length_empties_list() {
    let cache = cache();
    let provider = seeded(&cache, 3).await;

    provider.entries().evict_last_n(10).await.unwrap();

    assert!(provider.read().await.unwrap().is_empty());
}

#[tokio::test]
async fn count_gated_evictions_on_digits() {
    let cache = cache();
    let provider = seeded(&cache, 10).await;
    let entries = provider.entries();

    entries.evict_first_when(|count| count > 10).await.unwrap();
    assert_eq!(provider.read().await.unwrap().len(), 10);

    entries.evict_first_when(|count| count > 9).await.unwrap();
    entries.evict_last_when(|count| count > 8).await.unwrap();
    entries
        .evict_last_n_when(|count| count > 5, 2)
        .await
        .unwrap();
    entries
        .evict_first_n_when(|count| count > 5, 2)
        .await
        .unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(messages(&mocks), vec!["3", "4", "5", "6"]);
}

#[tokio::test]
async fn add_and_update_through_entries() {
    let cache = cache();
    let provider = seeded(&cache, 2).await;
    let entries = provider.entries();

    entries.add_first(Mock::new("first")).await.unwrap();
    entries.add_last(Mock::new("last")).await.unwrap();
    entries
        .add(|position, _| position == 1, Mock::new("second"))
        .await
        .unwrap();
    entries
        .update(|mock| mock.message == "0", |_| Mock::new("zero"))
        .await
        .unwrap();
    entries
        .update_iterable_indexed(
            |position, count, _| position + 1 == count,
            |mock| Mock::new(format!("{}!", mock.message)),
        )
        .await
        .unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(
        messages(&mocks),
        vec!["first", "second", "zero", "1", "last!"]
    );
}

#[tokio::test]
async fn grouped_entries_touch_only_their_group() {
    let cache = cache();
    let group = cache.provider_group_list::<Mock>().with_key("mocks");
    group
        .replace("a", future::ready(Ok(digit_mocks(3))))
        .await
        .unwrap();
    group
        .replace("b", future::ready(Ok(digit_mocks(3))))
        .await
        .unwrap();

    group.entries("a").evict_first().await.unwrap();
    group.entries("b").evict_last().await.unwrap();

    assert_eq!(messages(&group.read("a").await.unwrap()), vec!["1", "2"]);
    assert_eq!(messages(&group.read("b").await.unwrap()), vec!["0", "1"]);
}

#[tokio::test]
async fn entries_on_empty_group_keep_siblings() {
    let cache = cache();
    let group = cache.provider_group_list::<Mock>().with_key("mocks");
    group
        .replace("a", future::ready(Ok(digit_mocks(2))))
        .await
        .unwrap();
    group
        .replace("", future::ready(Ok(digit_mocks(3))))
        .await
        .unwrap();

    group.entries("").evict_first().await.unwrap();

    assert_eq!(messages(&group.read("").await.unwrap()), vec!["1", "2"]);
    assert_eq!(messages(&group.read("a").await.unwrap()), vec!["0", "1"]);
}

#[tokio::test]
async fn mutation_on_missing_list_fails_with_not_found() {
    let provider = cache().provider_list::<Mock>().with_key("mocks");

    let result = provider.entries().add_first(Mock::new("x")).await;

    assert_not_found(&result);
    assert_eq!(provider.read_nullable().await.unwrap(), None);
}

#[tokio::test]
async fn mutation_store_failure_leaves_list_unchanged() {
    init_test_tracing();
    let cache = ReactiveCache::new(FaultyEngine::new(InMemoryEngine::default()));
    let provider = cache.provider_list::<Mock>().with_key("mocks");
    provider
        .replace(future::ready(Ok(digit_mocks(3))))
        .await
        .unwrap();

    cache.engine().fail_forced_fetches(true);
    let result = provider.entries().evict_first().await;
    assert_engine_error(&result);

    cache.engine().fail_forced_fetches(false);
    assert_eq!(
        messages(&provider.read().await.unwrap()),
        vec!["0", "1", "2"]
    );
}

#[tokio::test]
async fn empty_list_is_written_back() {
    init_test_tracing();
    let cache = ReactiveCache::new(FaultyEngine::new(InMemoryEngine::default()));
    let provider = cache.provider_list::<Mock>().with_key("mocks");
    provider.replace(future::ready(Ok(Vec::new()))).await.unwrap();
    let before = cache.engine().fetch_count();

    provider.entries().evict_last().await.unwrap();

    // one read, one store
    assert_eq!(cache.engine().fetch_count(), before + 2);
    assert!(provider.read().await.unwrap().is_empty());
}

// ============================================================================
// LOST UPDATES
// ============================================================================

/// Store that parks every load until both racing mutators have loaded.
struct RendezvousStore<E> {
    provider: Provider<Vec<Mock>, E>,
    barrier: Arc<Barrier>,
}

#[async_trait]
impl<E: CacheEngine> ListStore<Mock> for RendezvousStore<E> {
    async fn load(&self) -> CacheResult<Vec<Mock>> {
        let items = self.provider.read().await?;
        self.barrier.wait().await;
        Ok(items)
    }

    async fn store(&self, items: Vec<Mock>) -> CacheResult<()> {
        self.provider
            .replace(future::ready(Ok(items)))
            .await
            .map(|_| ())
    }
}

/// Mutations are not serialized per slot: when two cycles load the same
/// snapshot, the later store discards the earlier edit.
#[tokio::test]
async fn racing_mutations_lose_an_update() {
    let cache = cache();
    let provider = seeded(&cache, 1).await;
    let barrier = Arc::new(Barrier::new(2));

    let spawn_add = |message: &'static str| {
        let actions = ActionsList::with(RendezvousStore {
            provider: provider.clone(),
            barrier: Arc::clone(&barrier),
        });
        tokio::spawn(async move { actions.add_last(Mock::new(message)).await })
    };
    let first = spawn_add("a");
    let second = spawn_add("b");

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(mocks.len(), 2);
    assert_eq!(mocks[0], Mock::new("0"));
    assert!(mocks[1] == Mock::new("a") || mocks[1] == Mock::new("b"));
}

#[tokio::test]
async fn sequential_mutations_keep_every_update() {
    let cache = cache();
    let provider = seeded(&cache, 1).await;
    let entries = provider.entries();

    entries.add_last(Mock::new("a")).await.unwrap();
    entries.add_last(Mock::new("b")).await.unwrap();

    let mocks = provider.read().await.unwrap();
    assert_eq!(messages(&mocks), vec!["0", "a", "b"]);
}

#[tokio::test]
async fn loader_error_is_not_swallowed_by_entries() {
    let cache = cache();
    let provider = cache.provider_list::<Mock>().with_key("mocks");

    let err = provider
        .replace(future::ready(Err(CacheError::loader("offline"))))
        .await
        .unwrap_err();

    assert_eq!(err, CacheError::loader("offline"));
    assert_not_found(&provider.entries().evict_first().await);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Appending and trimming through entries matches the same edits on a Vec.
    #[test]
    fn prop_entries_follow_vec_edits(
        seed in arb_mocks(8),
        extra in arb_mocks(3),
        n in 0usize..12,
    ) {
        runtime().block_on(async {
            let provider = cache().provider_list::<Mock>().with_key("mocks");
            provider.replace(future::ready(Ok(seed.clone()))).await.unwrap();
            let entries = provider.entries();

            for mock in &extra {
                entries.add_last(mock.clone()).await.unwrap();
            }
            entries.evict_first_n(n).await.unwrap();

            let expected: Vec<Mock> = seed.iter().chain(&extra).skip(n).cloned().collect();
            assert_eq!(provider.read().await.unwrap(), expected);
        });
    }
}
