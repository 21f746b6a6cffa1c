//! Error types for recache operations

use crate::CacheKey;
use thiserror::Error;

/// Faults raised by a cache engine's own storage layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to serialize value for {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Failed to deserialize value for {key}: {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Engine lock poisoned")]
    LockPoisoned,

    #[error("Backend failure: {reason}")]
    Backend { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Internal marker raised by loaders that must never produce a value.
///
/// Handles route reads and evictions through the engine's fetch channel with
/// one of these loaders, then strip the marker back out with the functions
/// in [`crate::classify`]. Callers never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel {
    kind: SentinelKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentinelKind {
    NoData,
    EvictOnly,
}

impl Sentinel {
    /// Raised by the placeholder loader of a plain read.
    #[doc(hidden)]
    pub fn no_data() -> Self {
        Self {
            kind: SentinelKind::NoData,
        }
    }

    /// Raised by the loader of an eviction, which only exists for its side effect.
    #[doc(hidden)]
    pub fn evict_only() -> Self {
        Self {
            kind: SentinelKind::EvictOnly,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.kind == SentinelKind::NoData
    }
}

/// Master error type for all recache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The slot holds no usable value and nothing could produce one.
    #[error("No data available for {key}")]
    NotFound { key: CacheKey },

    /// A caller-supplied loader failed.
    #[error("Loader failed: {reason}")]
    Loader { reason: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Several causes raised together, in the order they were raised.
    #[error("{} errors occurred: {}", .0.len(), join_causes(.0))]
    Aggregate(Vec<CacheError>),

    #[doc(hidden)]
    #[error("Placeholder loader invoked")]
    Sentinel(Sentinel),
}

fn join_causes(causes: &[CacheError]) -> String {
    causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CacheError {
    pub fn not_found(key: &CacheKey) -> Self {
        Self::NotFound { key: key.clone() }
    }

    pub fn loader(reason: impl Into<String>) -> Self {
        Self::Loader {
            reason: reason.into(),
        }
    }

    /// The member causes of this error, in order.
    ///
    /// An aggregate yields its members; any other error is a single cause.
    pub fn causes(&self) -> &[CacheError] {
        match self {
            Self::Aggregate(causes) => causes,
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate(_))
    }

    /// True only for a plain, un-aggregated `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel(_))
    }
}

/// Result type alias for recache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = CacheError::not_found(&CacheKey::new("mock").in_group("page"));
        let msg = format!("{}", err);
        assert!(msg.contains("No data available"));
        assert!(msg.contains("mock[page]"));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Deserialization {
            key: "mock".to_string(),
            reason: "expected a string".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("deserialize"));
        assert!(msg.contains("mock"));
        assert!(msg.contains("expected a string"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "max_entries".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("max_entries"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_aggregate_display_lists_members() {
        let err = CacheError::Aggregate(vec![
            CacheError::loader("timeout"),
            CacheError::not_found(&CacheKey::new("mock")),
        ]);
        let msg = format!("{}", err);
        assert!(msg.starts_with("2 errors occurred"));
        assert!(msg.contains("timeout"));
        assert!(msg.contains("No data available for mock"));
    }

    #[test]
    fn test_causes_of_single_error() {
        let err = CacheError::loader("boom");
        assert_eq!(err.causes(), &[CacheError::loader("boom")]);
    }

    #[test]
    fn test_causes_of_aggregate() {
        let err = CacheError::Aggregate(vec![CacheError::loader("a"), CacheError::loader("b")]);
        assert_eq!(err.causes().len(), 2);
        assert!(err.is_aggregate());
    }

    #[test]
    fn test_from_variants() {
        let engine = CacheError::from(EngineError::LockPoisoned);
        assert!(matches!(engine, CacheError::Engine(_)));

        let config = CacheError::from(ConfigError::MissingRequired {
            field: "key".to_string(),
        });
        assert!(matches!(config, CacheError::Config(_)));
    }

    #[test]
    fn test_sentinel_kinds_differ() {
        assert_ne!(Sentinel::no_data(), Sentinel::evict_only());
        assert!(Sentinel::no_data().is_no_data());
        assert!(!Sentinel::evict_only().is_no_data());
    }
}
