//! Positional mutations over a cached list.
//!
//! Every operation is one read-mutate-store cycle: load the current list,
//! run a pure scan from [`crate::mutations`], store the result as a single
//! replacement. A failed load aborts before anything is stored; a failed
//! store leaves the slot at its previous value.
//!
//! Cycles are not serialized against each other. Two mutations racing on
//! the same slot each store their own result and the later store wins.
//! Callers that need every edit to land should serialize calls per slot
//! above this layer, e.g. by wrapping their [`ListStore`] in a mutex.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures_util::future::{self, FutureExt};
use recache_core::{CacheResult, Cacheable};
use recache_storage::CacheEngine;

use crate::mutations;
use crate::slot::Slot;

// ============================================================================
// STORE
// ============================================================================

/// Where an [`ActionsList`] loads its list from and stores it back to.
#[async_trait]
pub trait ListStore<T: Send + 'static>: Send + Sync {
    /// Load the current list. Fails when nothing is stored.
    async fn load(&self) -> CacheResult<Vec<T>>;

    /// Replace the stored list as a whole.
    async fn store(&self, items: Vec<T>) -> CacheResult<()>;
}

/// A [`ListStore`] backed by one provider slot.
pub struct SlotEntries<T, E> {
    slot: Slot<Vec<T>, E>,
    group: Option<String>,
}

impl<T, E> SlotEntries<T, E> {
    pub(crate) fn new(slot: Slot<Vec<T>, E>, group: Option<String>) -> Self {
        Self { slot, group }
    }
}

#[async_trait]
impl<T, E> ListStore<T> for SlotEntries<T, E>
where
    T: Cacheable,
    E: CacheEngine,
{
    async fn load(&self) -> CacheResult<Vec<T>> {
        self.slot.read(self.group.as_deref()).await
    }

    async fn store(&self, items: Vec<T>) -> CacheResult<()> {
        self.slot
            .replace(self.group.as_deref(), future::ready(Ok(items)).boxed())
            .await
            .map(|_| ())
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Positional add, evict and update operations over a stored list.
///
/// Predicates receive `(position, count)` or `(position, count, element)`,
/// where `count` is the length of the list as loaded. Count gates receive
/// `count` alone.
pub struct ActionsList<T, S> {
    store: S,
    _element: PhantomData<fn() -> T>,
}

impl<T, S> ActionsList<T, S>
where
    T: Send + 'static,
    S: ListStore<T>,
{
    /// Build a mutator over `store`.
    pub fn with(store: S) -> Self {
        Self {
            store,
            _element: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn mutate<F>(&self, action: &'static str, edit: F) -> CacheResult<()>
    where
        F: FnOnce(Vec<T>) -> Vec<T> + Send,
    {
        let items = self.store.load().await?;
        let before = items.len();
        let items = edit(items);
        tracing::trace!(action, before, after = items.len(), "Storing edited list");
        self.store.store(items).await
    }

    // ------------------------------------------------------------------
    // add
    // ------------------------------------------------------------------

    /// Insert `element` at the first position in `0..=count` accepted by
    /// `position`. No match leaves the list as it was.
    pub async fn add<P>(&self, position: P, element: T) -> CacheResult<()>
    where
        P: Fn(usize, usize) -> bool + Send,
    {
        self.add_all(position, vec![element]).await
    }

    pub async fn add_first(&self, element: T) -> CacheResult<()> {
        self.add_all_first(vec![element]).await
    }

    pub async fn add_last(&self, element: T) -> CacheResult<()> {
        self.add_all_last(vec![element]).await
    }

    /// Insert `elements` as one contiguous block at the first position
    /// accepted by `position`.
    pub async fn add_all<P>(&self, position: P, elements: Vec<T>) -> CacheResult<()>
    where
        P: Fn(usize, usize) -> bool + Send,
    {
        self.mutate("add_all", move |items| {
            mutations::insert_at(items, position, elements)
        })
        .await
    }

    pub async fn add_all_first(&self, elements: Vec<T>) -> CacheResult<()> {
        self.add_all(|position, _| position == 0, elements).await
    }

    pub async fn add_all_last(&self, elements: Vec<T>) -> CacheResult<()> {
        self.add_all(|position, count| position == count, elements)
            .await
    }

    // ------------------------------------------------------------------
    // evict
    // ------------------------------------------------------------------

    /// Remove the first element accepted by `predicate`.
    pub async fn evict<P>(&self, predicate: P) -> CacheResult<()>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.evict_indexed(move |_, _, element| predicate(element))
            .await
    }

    /// Remove the first element accepted by `predicate`.
    pub async fn evict_indexed<P>(&self, predicate: P) -> CacheResult<()>
    where
        P: Fn(usize, usize, &T) -> bool + Send,
    {
        self.mutate("evict", move |items| {
            mutations::remove_first(items, predicate)
        })
        .await
    }

    pub async fn evict_first(&self) -> CacheResult<()> {
        self.evict_indexed(|position, _, _| position == 0).await
    }

    pub async fn evict_last(&self) -> CacheResult<()> {
        self.evict_indexed(|position, count, _| position + 1 == count)
            .await
    }

    /// Remove the first element if `gate(count)` holds.
    pub async fn evict_first_when<G>(&self, gate: G) -> CacheResult<()>
    where
        G: Fn(usize) -> bool + Send,
    {
        self.evict_indexed(move |position, count, _| position == 0 && gate(count))
            .await
    }

    /// Remove the last element if `gate(count)` holds.
    pub async fn evict_last_when<G>(&self, gate: G) -> CacheResult<()>
    where
        G: Fn(usize) -> bool + Send,
    {
        self.evict_indexed(move |position, count, _| position + 1 == count && gate(count))
            .await
    }

    /// Remove the first `min(n, count)` elements.
    pub async fn evict_first_n(&self, n: usize) -> CacheResult<()> {
        self.evict_first_n_when(|_| true, n).await
    }

    /// Remove the last `min(n, count)` elements.
    pub async fn evict_last_n(&self, n: usize) -> CacheResult<()> {
        self.evict_last_n_when(|_| true, n).await
    }

    pub async fn evict_first_n_when<G>(&self, gate: G, n: usize) -> CacheResult<()>
    where
        G: Fn(usize) -> bool + Send,
    {
        self.evict_iterable(move |position, count, _| position < n && gate(count))
            .await
    }

    pub async fn evict_last_n_when<G>(&self, gate: G, n: usize) -> CacheResult<()>
    where
        G: Fn(usize) -> bool + Send,
    {
        self.mutate("evict_last_n", move |items| {
            let marks = mutations::tail_window_marks(&items, n, gate);
            mutations::remove_marked(items, &marks)
        })
        .await
    }

    /// Keep positions `0..n` and remove the rest.
    pub async fn evict_all_keeping_first_n(&self, n: usize) -> CacheResult<()> {
        self.evict_iterable(move |position, _, _| position >= n)
            .await
    }

    /// Keep the last `n` elements and remove the rest.
    pub async fn evict_all_keeping_last_n(&self, n: usize) -> CacheResult<()> {
        self.evict_iterable(move |position, count, _| position < count.saturating_sub(n))
            .await
    }

    /// Remove every element accepted by `predicate` in one pass.
    pub async fn evict_iterable<P>(&self, predicate: P) -> CacheResult<()>
    where
        P: Fn(usize, usize, &T) -> bool + Send,
    {
        self.mutate("evict_iterable", move |items| {
            mutations::remove_all(items, predicate)
        })
        .await
    }

    // ------------------------------------------------------------------
    // update
    // ------------------------------------------------------------------

    /// Replace the first element accepted by `predicate` with
    /// `replace(element)`.
    pub async fn update<P, R>(&self, predicate: P, replace: R) -> CacheResult<()>
    where
        P: Fn(&T) -> bool + Send,
        R: FnOnce(T) -> T + Send,
    {
        self.update_indexed(move |_, _, element| predicate(element), replace)
            .await
    }

    pub async fn update_indexed<P, R>(&self, predicate: P, replace: R) -> CacheResult<()>
    where
        P: Fn(usize, usize, &T) -> bool + Send,
        R: FnOnce(T) -> T + Send,
    {
        self.mutate("update", move |items| {
            mutations::replace_first(items, predicate, replace)
        })
        .await
    }

    /// Replace every element accepted by `predicate`.
    pub async fn update_iterable<P, R>(&self, predicate: P, replace: R) -> CacheResult<()>
    where
        P: Fn(&T) -> bool + Send,
        R: FnMut(T) -> T + Send,
    {
        self.update_iterable_indexed(move |_, _, element| predicate(element), replace)
            .await
    }

    pub async fn update_iterable_indexed<P, R>(&self, predicate: P, replace: R) -> CacheResult<()>
    where
        P: Fn(usize, usize, &T) -> bool + Send,
        R: FnMut(T) -> T + Send,
    {
        self.mutate("update_iterable", move |items| {
            mutations::replace_all(items, predicate, replace)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use recache_core::{CacheError, CacheKey};

    use super::*;

    /// Vec-backed store that counts writes.
    #[derive(Default)]
    struct VecStore {
        items: Mutex<Option<Vec<u32>>>,
        stores: Mutex<usize>,
        fail_store: bool,
    }

    impl VecStore {
        fn holding(items: Vec<u32>) -> Self {
            Self {
                items: Mutex::new(Some(items)),
                ..Default::default()
            }
        }

        fn items(&self) -> Option<Vec<u32>> {
            self.items.lock().unwrap().clone()
        }

        fn stores(&self) -> usize {
            *self.stores.lock().unwrap()
        }
    }

    #[async_trait]
    impl ListStore<u32> for VecStore {
        async fn load(&self) -> CacheResult<Vec<u32>> {
            self.items
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CacheError::not_found(&CacheKey::new("list")))
        }

        async fn store(&self, items: Vec<u32>) -> CacheResult<()> {
            if self.fail_store {
                return Err(CacheError::loader("disk full"));
            }
            *self.stores.lock().unwrap() += 1;
            *self.items.lock().unwrap() = Some(items);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_list_aborts_without_store() {
        let actions = ActionsList::with(VecStore::default());

        let err = actions.add_first(1).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(actions.store().stores(), 0);
        assert_eq!(actions.store().items(), None);
    }

    #[tokio::test]
    async fn test_empty_list_is_still_stored() {
        let actions = ActionsList::with(VecStore::holding(Vec::new()));

        actions.evict_first().await.unwrap();
        actions.evict_last_n(3).await.unwrap();

        assert_eq!(actions.store().stores(), 2);
        assert_eq!(actions.store().items(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_failed_store_keeps_previous_list() {
        let store = VecStore {
            fail_store: true,
            ..VecStore::holding(vec![1, 2, 3])
        };
        let actions = ActionsList::with(store);

        let err = actions.evict_first().await.unwrap_err();
        assert_eq!(err, CacheError::loader("disk full"));
        assert_eq!(actions.store().items(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_count_gates() {
        let actions = ActionsList::with(VecStore::holding((0..10).collect::<Vec<u32>>()));

        actions.evict_first_when(|count| count > 10).await.unwrap();
        actions.evict_last_when(|count| count > 10).await.unwrap();
        assert_eq!(actions.store().items().map(|i| i.len()), Some(10));

        actions.evict_first_when(|count| count > 9).await.unwrap();
        actions.evict_last_when(|count| count > 8).await.unwrap();
        assert_eq!(actions.store().items(), Some((1..9).collect::<Vec<u32>>()));

        actions.evict_first_n_when(|count| count > 100, 3).await.unwrap();
        actions.evict_last_n_when(|count| count > 100, 3).await.unwrap();
        assert_eq!(actions.store().items(), Some((1..9).collect::<Vec<u32>>()));
    }

    #[tokio::test]
    async fn test_add_variants() {
        let actions = ActionsList::with(VecStore::holding(vec![2, 3]));

        actions.add_first(1).await.unwrap();
        actions.add_last(4).await.unwrap();
        actions.add_all_first(vec![0]).await.unwrap();
        actions.add_all_last(vec![5, 6]).await.unwrap();
        actions.add(|position, _| position == 3, 99).await.unwrap();

        assert_eq!(
            actions.store().items(),
            Some(vec![0, 1, 2, 99, 3, 4, 5, 6])
        );
    }

    #[tokio::test]
    async fn test_evict_and_update_by_element() {
        let actions = ActionsList::with(VecStore::holding(vec![1, 2, 1, 2]));

        actions.evict(|e| *e == 2).await.unwrap();
        assert_eq!(actions.store().items(), Some(vec![1, 1, 2]));

        actions.update(|e| *e == 1, |e| e + 10).await.unwrap();
        assert_eq!(actions.store().items(), Some(vec![11, 1, 2]));

        actions.update_iterable(|e| *e < 10, |e| e * 2).await.unwrap();
        assert_eq!(actions.store().items(), Some(vec![11, 2, 4]));

        actions
            .update_iterable(|e| *e > 100, |e| e * 2)
            .await
            .unwrap();
        assert_eq!(actions.store().items(), Some(vec![11, 2, 4]));
    }
}
