//! Thin axum adapter mapping each store operation to one REST endpoint.

pub mod error;
pub mod resource;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_system::StoreSystem;

pub use error::ApiError;

/// `/api/products` and `/api/orders`, each backed by its own store.
pub fn router(system: &StoreSystem) -> Router {
    Router::new()
        .merge(resource::routes(system.product_client.clone()))
        .merge(resource::routes(system.order_client.clone()))
        .layer(TraceLayer::new_for_http())
}
