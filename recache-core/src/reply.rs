//! Provenance wrapper for values returned by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a value was finally obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// The in-memory tier.
    Memory,
    /// Persisted storage.
    Persistence,
    /// Freshly produced by the loader, not found cached.
    Cloud,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Persistence => "persistence",
            Self::Cloud => "cloud",
        };
        f.write_str(name)
    }
}

/// A value plus provenance and encryption metadata.
///
/// Purely informational: nothing in the library branches on the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply<T> {
    data: T,
    source: Source,
    encrypted: bool,
}

impl<T> Reply<T> {
    pub fn new(data: T, source: Source, encrypted: bool) -> Self {
        Self {
            data,
            source,
            encrypted,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> Reply<U>
    where
        F: FnOnce(T) -> U,
    {
        Reply {
            data: f(self.data),
            source: self.source,
            encrypted: self.encrypted,
        }
    }
}

impl<T> AsRef<T> for Reply<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}
