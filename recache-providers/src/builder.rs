//! Fluent builder shared by every handle kind.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use recache_core::{CacheConfig, CacheKey};

/// A handle that can be assembled from an engine and a slot configuration.
///
/// Implemented by [`crate::Provider`] and [`crate::ProviderGroup`]; the
/// builder is generic over the handle so one set of options serves both.
pub trait BuildHandle<E>: Sized {
    /// Assemble the handle.
    fn build(engine: Arc<E>, config: CacheConfig) -> Self;
}

/// Builder returned by [`crate::ReactiveCache`] for configuring a handle.
///
/// Defaults: no lifetime, expirable, not encrypted.
pub struct ProviderBuilder<H, E> {
    engine: Arc<E>,
    lifetime: Option<Duration>,
    expirable: bool,
    encrypted: bool,
    _handle: PhantomData<fn() -> H>,
}

impl<H, E> ProviderBuilder<H, E>
where
    H: BuildHandle<E>,
{
    pub(crate) fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            lifetime: None,
            expirable: true,
            encrypted: false,
            _handle: PhantomData,
        }
    }

    /// Time after which a stored value counts as expired. A zero lifetime
    /// expires every value as soon as it is stored.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Whether the engine may reclaim this slot under capacity pressure.
    pub fn expirable(mut self, expirable: bool) -> Self {
        self.expirable = expirable;
        self
    }

    /// Ask the engine to store the slot encrypted.
    pub fn encrypt(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Finish the builder with the slot's primary key.
    pub fn with_key(self, key: impl Into<String>) -> H {
        let config = CacheConfig::new(CacheKey::new(key))
            .with_lifetime(self.lifetime)
            .with_expirable(self.expirable)
            .with_encrypted(self.encrypted);
        H::build(self.engine, config)
    }
}
