use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::clients::{OrderClient, ProductClient};
use crate::domain::{Order, Product};
use crate::store::{Entity, EntityStore};

/// Owns one store per entity type and hands out clients to them.
///
/// Built once per process and passed to whatever needs it; there is no global
/// store.
#[derive(Clone)]
pub struct StoreSystem {
    pub product_client: ProductClient,
    pub order_client: OrderClient,
}

impl Default for StoreSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSystem {
    #[instrument(name = "store_system")]
    pub fn new() -> Self {
        info!("Starting store system");

        let product_client = ProductClient::new(Arc::new(EntityStore::<Product>::new()));
        let order_client = OrderClient::new(Arc::new(EntityStore::<Order>::new()));

        for table in [Product::TABLE, Order::TABLE] {
            debug!(table = table.name, ddl = %table.create_table_sql(), "Expected table layout");
        }

        info!("Store system started");
        Self {
            product_client,
            order_client,
        }
    }
}
