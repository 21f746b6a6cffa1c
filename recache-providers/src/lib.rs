//! recache Providers - Typed Handles and List Actions
//!
//! The user-facing layer of recache. A [`ReactiveCache`] hands out
//! [`Provider`] and [`ProviderGroup`] handles bound to one key; handles read,
//! replace and evict through the [`recache_storage::CacheEngine`] they were
//! built over. Handles over lists expose an [`ActionsList`] for positional
//! edits performed as read-mutate-store cycles.

mod actions;
mod builder;
pub mod mutations;
mod provider;
mod provider_group;
mod reactive_cache;
mod slot;

pub use actions::{ActionsList, ListStore, SlotEntries};
pub use builder::{BuildHandle, ProviderBuilder};
pub use provider::Provider;
pub use provider_group::ProviderGroup;
pub use reactive_cache::{ReactiveCache, ReactiveCacheBuilder};

pub use recache_core::{CacheError, CacheResult, Cacheable, Reply, Source};
pub use recache_storage::{CacheEngine, EngineConfig, InMemoryEngine};
