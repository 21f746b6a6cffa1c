//! recache Storage - Engine Trait and In-Memory Engine
//!
//! Defines the engine abstraction every cache handle is written against,
//! plus a tiered in-memory implementation used by default and in tests.

pub mod engine;

pub use engine::{CacheEngine, CacheStats, EngineConfig, InMemoryEngine, Loader};
