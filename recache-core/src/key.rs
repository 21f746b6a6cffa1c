//! Slot identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a cache slot.
///
/// A key is a primary name plus an optional group. Two handles built with
/// equal keys address the same stored value. The empty string is a group
/// like any other: `CacheKey::new("k").in_group("")` is a grouped slot,
/// distinct from the group-less `CacheKey::new("k")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    primary: String,
    group: Option<String>,
}

impl CacheKey {
    /// Create a group-less key.
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            group: None,
        }
    }

    /// Return a copy of this key scoped to `group`.
    pub fn in_group(&self, group: impl Into<String>) -> Self {
        Self {
            primary: self.primary.clone(),
            group: Some(group.into()),
        }
    }

    /// Return a copy of this key with the group removed.
    pub fn without_group(&self) -> Self {
        Self::new(self.primary.clone())
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    /// The scope a forced eviction through this key targets.
    ///
    /// A grouped key evicts only its own slot. A group-less key evicts the
    /// whole family of slots stored under the primary name.
    pub fn eviction_mode(&self) -> EvictionMode {
        match &self.group {
            Some(group) => EvictionMode::ByGroup {
                primary: self.primary.clone(),
                group: group.clone(),
            },
            None => EvictionMode::Exact {
                primary: self.primary.clone(),
            },
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}[{}]", self.primary, group),
            None => f.write_str(&self.primary),
        }
    }
}

/// Scope targeted by a single eviction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvictionMode {
    /// Every slot under the primary name, grouped or not.
    Exact { primary: String },
    /// The one slot for `group` under the primary name.
    ByGroup { primary: String, group: String },
    /// Every slot the engine manages.
    All,
}

impl EvictionMode {
    /// Whether a slot stored under `key` falls inside this scope.
    pub fn covers(&self, key: &CacheKey) -> bool {
        match self {
            Self::Exact { primary } => key.primary() == primary,
            Self::ByGroup { primary, group } => {
                key.primary() == primary && key.group() == Some(group.as_str())
            }
            Self::All => true,
        }
    }
}
