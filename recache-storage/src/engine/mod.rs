//! Cache engines.
//!
//! An engine owns stored slots: their bytes, their lifetimes, and their
//! eviction. Handles in `recache-providers` are generic over
//! [`CacheEngine`] and never touch storage directly.
//!
//! # Tiers
//!
//! [`InMemoryEngine`] answers from a memory tier first, then from a persisted
//! tier, and finally from the caller's loader. The [`recache_core::Reply`]
//! it returns records which of the three answered.

pub mod config;
pub mod in_memory;
pub mod traits;

pub use config::EngineConfig;
pub use in_memory::InMemoryEngine;
pub use traits::{CacheEngine, CacheStats, Loader};
