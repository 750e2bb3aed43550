//! Cloneable handles through which every caller reaches a store.
//!
//! A client owns no state of its own; it wraps the shared [`EntityStore`] and
//! opens a tracing span per operation so a request can be followed from the
//! HTTP layer into the store.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{Order, Product};
use crate::store::{Entity, EntityId, EntityStore, StoreError, Version, Versioned};

pub type ProductClient = ResourceClient<Product>;
pub type OrderClient = ResourceClient<Order>;

pub struct ResourceClient<T: Entity> {
    store: Arc<EntityStore<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(store: Arc<EntityStore<T>>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(entity = T::NAME))]
    pub async fn list(&self) -> Vec<T> {
        debug!("Listing");
        self.store.list().await
    }

    #[instrument(skip(self), fields(entity = T::NAME))]
    pub async fn get(&self, id: EntityId) -> Result<Versioned<T>, StoreError> {
        debug!("Fetching");
        self.store.get_versioned(id).await
    }

    #[instrument(skip(self, entity), fields(entity = T::NAME))]
    pub async fn create(&self, entity: T) -> Result<Versioned<T>, StoreError> {
        debug!("Creating");
        self.store.create(entity).await
    }

    #[instrument(skip(self, entity), fields(entity = T::NAME, body_id = entity.id()))]
    pub async fn update(
        &self,
        id: EntityId,
        entity: T,
        expected: Version,
    ) -> Result<Version, StoreError> {
        debug!(expected = %expected, "Updating");
        self.store.update(id, entity, expected).await
    }

    #[instrument(skip(self), fields(entity = T::NAME))]
    pub async fn delete(&self, id: EntityId) -> Result<(), StoreError> {
        debug!("Deleting");
        self.store.delete(id).await
    }

    #[instrument(skip(self), fields(entity = T::NAME))]
    pub async fn exists(&self, id: EntityId) -> bool {
        self.store.exists(id).await
    }
}
