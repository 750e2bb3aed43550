//! Generic entity persistence with optimistic concurrency control.

pub mod concurrency;
pub mod entity;
pub mod entity_store;
pub mod error;

pub use concurrency::*;
pub use entity::*;
pub use entity_store::*;
pub use error::*;
