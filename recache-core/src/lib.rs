//! recache Core - Data Types and Error Taxonomy
//!
//! Pure data structures shared by every recache crate: slot keys, per-slot
//! configuration, the provenance wrapper returned by engines, and the error
//! taxonomy together with the classifier that separates "nothing cached" from
//! genuine failures. No I/O lives here.

use serde::{de::DeserializeOwned, Serialize};

pub mod classify;
pub mod config;
pub mod error;
pub mod key;
pub mod reply;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult, ConfigError, EngineError, Sentinel};
pub use key::{CacheKey, EvictionMode};
pub use reply::{Reply, Source};

/// Marker trait for values that can be stored in a cache slot.
///
/// Engines own the stored representation, so values must round-trip through
/// serde and be shareable across tasks.
pub trait Cacheable: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Cacheable for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}
