use rust_decimal::Decimal;
use thiserror::Error;

use super::{EntityId, Version};

/// Input that cannot be stored as given. Nothing is mutated when this is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} value {value} does not fit decimal({precision},{scale})")]
    Overflow {
        field: &'static str,
        value: Decimal,
        precision: u32,
        scale: u32,
    },
}

/// Failures of a store operation.
///
/// Everything except `IdSpaceExhausted` is recoverable by the caller: fix the
/// input, re-read, or retry. `ConcurrencyConflict` is reported as-is and never
/// retried or merged by the store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{entity} validation error: {source}")]
    Validation {
        entity: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{entity} id mismatch: path id {path_id}, body id {body_id}")]
    IdentityMismatch {
        entity: &'static str,
        path_id: EntityId,
        body_id: EntityId,
    },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: EntityId },
    #[error("{entity} {id} was modified concurrently")]
    ConcurrencyConflict {
        entity: &'static str,
        id: EntityId,
        expected: Option<Version>,
        found: Option<Version>,
    },
    #[error("{entity} id space exhausted")]
    IdSpaceExhausted { entity: &'static str },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}
