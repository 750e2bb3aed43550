//! System construction, tracing setup and configuration.

pub mod config;
pub mod store_system;
pub mod tracing;

pub use config::*;
pub use store_system::*;
pub use self::tracing::*;
