//! Error classification for the shared fetch channel.
//!
//! Reads and evictions reuse the engine's fetch-or-load path with loaders that
//! can never succeed. The engine then reports the loader's [`Sentinel`] inside
//! an aggregate alongside its own `NotFound`. These functions turn those
//! expected failures back into "no value" or "completed" without swallowing
//! genuine failures raised next to them.

use crate::{CacheError, CacheResult, Sentinel};

/// Classify the failure of a forced eviction.
///
/// A plain error completes only if it is itself a `NotFound` or a sentinel.
/// An aggregate completes if any member is; the remaining members are
/// dropped, and logged. Everything else is returned unchanged.
pub fn complete_on_eviction_error(error: CacheError) -> CacheResult<()> {
    if !error.is_aggregate() {
        return if is_eviction_placeholder(&error) {
            Ok(())
        } else {
            Err(error)
        };
    }

    let causes = error.causes();
    if !causes.iter().any(is_eviction_placeholder) {
        return Err(error);
    }

    let unrelated: Vec<&CacheError> = causes
        .iter()
        .filter(|cause| !is_eviction_placeholder(cause))
        .collect();
    if !unrelated.is_empty() {
        tracing::warn!(
            discarded = unrelated.len(),
            causes = ?unrelated,
            "Eviction completed; discarding unrelated causes raised alongside it"
        );
    }

    Ok(())
}

/// Remove the read placeholder from a failed read.
///
/// A non-aggregate passes through untouched. From an aggregate every
/// no-data sentinel is removed: one survivor is returned on its own, several
/// are returned as a new aggregate in their original order.
pub fn strip_sentinel(error: CacheError) -> CacheError {
    let CacheError::Aggregate(causes) = error else {
        return error;
    };

    let mut remaining: Vec<CacheError> = causes
        .into_iter()
        .filter(|cause| !is_no_data(cause))
        .collect();

    debug_assert!(
        !remaining.is_empty(),
        "aggregate held nothing but placeholder sentinels"
    );

    if remaining.len() == 1 {
        remaining.remove(0)
    } else {
        CacheError::Aggregate(remaining)
    }
}

/// The error every read placeholder loader fails with.
#[doc(hidden)]
pub fn placeholder_error() -> CacheError {
    CacheError::Sentinel(Sentinel::no_data())
}

/// The error every eviction loader fails with.
#[doc(hidden)]
pub fn eviction_error() -> CacheError {
    CacheError::Sentinel(Sentinel::evict_only())
}

fn is_eviction_placeholder(error: &CacheError) -> bool {
    error.is_not_found() || error.is_sentinel()
}

fn is_no_data(error: &CacheError) -> bool {
    matches!(error, CacheError::Sentinel(sentinel) if sentinel.is_no_data())
}
