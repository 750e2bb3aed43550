use std::fmt::Debug;

use crate::schema::TableSchema;
use super::ValidationError;

/// Integer identity of a stored entity. Assigned by the store, starting at 1.
pub type EntityId = i32;

/// Trait that any domain entity must implement to be managed by [`super::EntityStore`].
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Singular name used in errors and log fields ("Product", "Order").
    const NAME: &'static str;

    /// Table this entity persists to.
    const TABLE: TableSchema;

    fn id(&self) -> EntityId;

    /// Called by the store on create. Entities never pick their own id.
    fn assign_id(&mut self, id: EntityId);

    /// Checks the per-type rules and fits every column to its storage format.
    ///
    /// Runs before any mutation; an `Err` leaves the store untouched.
    fn into_storable(self) -> Result<Self, ValidationError>;
}
