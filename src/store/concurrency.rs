//! Optimistic concurrency: version markers, write outcomes and conflict resolution.
//!
//! A store never locks an entity across a caller's read-modify-write cycle.
//! Each row carries a [`Version`] that starts at [`Version::INITIAL`] and is
//! bumped on every successful update. A write that names an expected version
//! the row no longer has, or that targets a row that is gone, comes back as
//! [`WriteOutcome::Conflict`]; [`resolve_conflict`] then turns it into either
//! `NotFound` or `ConcurrencyConflict`. Nothing is merged or retried.

use std::fmt;

use tracing::{error, warn};

use super::{EntityId, StoreError};

/// Monotonic per-entity version marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    pub const INITIAL: Version = Version(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub entity: T,
    pub version: Version,
}

/// Why a write was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The row was gone when the write reached it.
    Vanished,
    /// The row exists at a different version than the caller expected.
    Stale { expected: Version, found: Version },
}

/// Tagged result of a single replace attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied(Version),
    Conflict(Conflict),
}

/// Decides the caller-visible outcome of a conflicted write after re-checking
/// whether the row still exists.
///
/// A row that no longer exists is `NotFound`, whatever the conflict looked like
/// at write time. A row that still exists was altered underneath the caller and
/// the conflict is surfaced unchanged.
pub fn resolve_conflict(
    entity: &'static str,
    id: EntityId,
    conflict: Conflict,
    still_exists: bool,
) -> StoreError {
    if !still_exists {
        warn!(entity, id, "Write target vanished");
        return StoreError::NotFound { entity, id };
    }

    let (expected, found) = match conflict {
        Conflict::Stale { expected, found } => (Some(expected), Some(found)),
        Conflict::Vanished => (None, None),
    };
    error!(
        entity,
        id,
        expected = ?expected,
        found = ?found,
        "Concurrency conflict"
    );
    StoreError::ConcurrencyConflict {
        entity,
        id,
        expected,
        found,
    }
}
