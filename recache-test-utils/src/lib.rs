//! recache Test Utilities
//!
//! Shared test infrastructure for the recache workspace:
//! - Proptest generators for keys, groups and errors
//! - Fixtures for list scenarios
//! - A fault-injecting engine wrapper
//! - Custom assertions for the error taxonomy
//! - Tracing setup for tests

pub use recache_core::{CacheError, CacheKey, CacheResult, Cacheable, EngineError, Reply};
pub use recache_storage::{CacheEngine, EngineConfig, InMemoryEngine, Loader};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::future::{self, FutureExt};
use recache_core::CacheConfig;

// ============================================================================
// FAULTY ENGINE
// ============================================================================

/// Engine wrapper that injects failures on demand.
///
/// Disarmed, it forwards every call to the wrapped engine unchanged.
#[derive(Debug, Default)]
pub struct FaultyEngine<E> {
    inner: E,
    fail_forced: AtomicBool,
    fail_unforced: AtomicBool,
    fail_beside_loader: AtomicBool,
    fetches: AtomicUsize,
}

impl<E> FaultyEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            fail_forced: AtomicBool::new(false),
            fail_unforced: AtomicBool::new(false),
            fail_beside_loader: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Fail force-evicting fetches (replace, evict, list stores) with a
    /// backend error, leaving the wrapped engine untouched.
    pub fn fail_forced_fetches(&self, armed: bool) {
        self.fail_forced.store(armed, Ordering::SeqCst);
    }

    /// Fail plain fetches (reads, loader reads) with a backend error.
    pub fn fail_unforced_fetches(&self, armed: bool) {
        self.fail_unforced.store(armed, Ordering::SeqCst);
    }

    /// When a loader fails, report its error aggregated with an unrelated
    /// backend error instead of the usual `NotFound`.
    pub fn fail_beside_loader(&self, armed: bool) {
        self.fail_beside_loader.store(armed, Ordering::SeqCst);
    }

    /// Number of fetches seen so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// The backend error injected by [`FaultyEngine`].
pub fn injected_failure(key: &CacheKey) -> CacheError {
    CacheError::Engine(EngineError::Backend {
        reason: format!("injected failure for {key}"),
    })
}

#[async_trait]
impl<E: CacheEngine> CacheEngine for FaultyEngine<E> {
    async fn fetch<T: Cacheable>(
        &self,
        config: &CacheConfig,
        loader: Loader<T>,
        force_evict: bool,
    ) -> CacheResult<Reply<T>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let armed = if force_evict {
            &self.fail_forced
        } else {
            &self.fail_unforced
        };
        if armed.load(Ordering::SeqCst) {
            return Err(injected_failure(config.key()));
        }

        if !self.fail_beside_loader.load(Ordering::SeqCst) {
            return self.inner.fetch(config, loader, force_evict).await;
        }

        match loader.await {
            Ok(data) => {
                self.inner
                    .fetch(config, future::ready(Ok(data)).boxed(), force_evict)
                    .await
            }
            Err(error) => Err(CacheError::Aggregate(vec![
                error,
                injected_failure(config.key()),
            ])),
        }
    }

    async fn evict_all(&self) -> CacheResult<()> {
        self.inner.evict_all().await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for recache types.

    use super::*;
    use proptest::prelude::*;

    /// A non-empty primary key.
    pub fn arb_primary_key() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}"
    }

    /// A non-empty group name.
    pub fn arb_group() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    pub fn arb_key() -> impl Strategy<Value = CacheKey> {
        (arb_primary_key(), proptest::option::of(arb_group())).prop_map(|(primary, group)| {
            let key = CacheKey::new(primary);
            match group {
                Some(group) => key.in_group(group),
                None => key,
            }
        })
    }

    pub fn arb_mock() -> impl Strategy<Value = fixtures::Mock> {
        "[ -~]{0,12}".prop_map(fixtures::Mock::new)
    }

    pub fn arb_mocks(max: usize) -> impl Strategy<Value = Vec<fixtures::Mock>> {
        prop::collection::vec(arb_mock(), 0..=max)
    }

    /// A genuine failure: never `NotFound`, never a sentinel.
    pub fn arb_genuine_error() -> impl Strategy<Value = CacheError> {
        prop_oneof![
            "[a-z ]{1,20}".prop_map(|reason| CacheError::loader(reason)),
            "[a-z ]{1,20}".prop_map(|reason| CacheError::Engine(EngineError::Backend { reason })),
            Just(CacheError::Engine(EngineError::LockPoisoned)),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common scenarios.

    use serde::{Deserialize, Serialize};

    /// Minimal cached value used throughout the tests.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Mock {
        pub message: String,
    }

    impl Mock {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }
    }

    /// `"0"`, `"1"`, ... up to `n - 1`.
    pub fn digits(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    /// One [`Mock`] per entry of [`digits`].
    pub fn digit_mocks(n: usize) -> Vec<Mock> {
        digits(n).into_iter().map(Mock::new).collect()
    }

    /// The messages of `mocks`, in order.
    pub fn messages(mocks: &[Mock]) -> Vec<&str> {
        mocks.iter().map(|mock| mock.message.as_str()).collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over the error taxonomy.

    use super::*;

    /// Assert that a result failed with `NotFound`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CacheResult<T>) {
        match result {
            Err(CacheError::NotFound { .. }) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    /// Assert that a result failed with a loader error carrying `reason`.
    #[track_caller]
    pub fn assert_loader_error<T: std::fmt::Debug>(result: &CacheResult<T>, reason: &str) {
        match result {
            Err(CacheError::Loader { reason: actual }) => assert_eq!(actual, reason),
            other => panic!("Expected Loader error ({reason}), got: {:?}", other),
        }
    }

    /// Assert that a result failed with an engine error.
    #[track_caller]
    pub fn assert_engine_error<T: std::fmt::Debug>(result: &CacheResult<T>) {
        match result {
            Err(CacheError::Engine(_)) => {}
            other => panic!("Expected Engine error, got: {:?}", other),
        }
    }

    /// Assert that no internal sentinel leaked into a caller-visible error.
    #[track_caller]
    pub fn assert_no_sentinel(error: &CacheError) {
        assert!(
            error.causes().iter().all(|cause| !cause.is_sentinel()),
            "Sentinel leaked into {:?}",
            error
        );
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a fmt subscriber for tests. Honours `RUST_LOG`, defaulting to
/// `recache=debug`. Safe to call from every test.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recache=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TESTS
// ============================================================================
