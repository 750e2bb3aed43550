use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{
    resolve_conflict, Conflict, Entity, EntityId, StoreError, Version, Versioned, WriteOutcome,
};

struct Row<T> {
    value: T,
    version: Version,
}

/// One entity's cell. `None` once the entity has been deleted, so a writer that
/// grabbed the slot before the delete sees the row vanish.
type Slot<T> = Arc<RwLock<Option<Row<T>>>>;

/// Authoritative keyed collection of one entity type.
///
/// The map lock is held only to find a slot or to insert/remove one; it is
/// never held while waiting on a row. Each row has its own lock, so writes to
/// different ids run in parallel and writes to the same id serialize. Reads take
/// shared locks only.
///
/// Ids come from a monotonic counter and are never reused, which is why the map
/// iterates in insertion order and why a row found missing stays missing.
pub struct EntityStore<T: Entity> {
    rows: RwLock<BTreeMap<EntityId, Slot<T>>>,
    next_id: AtomicI32,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// All live entities, in insertion order.
    pub async fn list(&self) -> Vec<T> {
        let slots: Vec<Slot<T>> = self.rows.read().await.values().cloned().collect();

        let mut entities = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(row) = slot.read().await.as_ref() {
                entities.push(row.value.clone());
            }
        }
        debug!(entity = T::NAME, count = entities.len(), "Listed entities");
        entities
    }

    pub async fn get(&self, id: EntityId) -> Result<T, StoreError> {
        self.get_versioned(id).await.map(|v| v.entity)
    }

    pub async fn get_versioned(&self, id: EntityId) -> Result<Versioned<T>, StoreError> {
        let slot = self.slot(id).await.ok_or_else(|| Self::not_found(id))?;
        let guard = slot.read().await;
        match guard.as_ref() {
            Some(row) => {
                debug!(entity = T::NAME, id, version = %row.version, "Entity found");
                Ok(Versioned {
                    entity: row.value.clone(),
                    version: row.version,
                })
            }
            None => Err(Self::not_found(id)),
        }
    }

    pub async fn exists(&self, id: EntityId) -> bool {
        self.rows.read().await.contains_key(&id)
    }

    /// Validates `entity`, assigns it a fresh id and inserts it at version 1.
    /// Any id carried by `entity` is ignored.
    pub async fn create(&self, entity: T) -> Result<Versioned<T>, StoreError> {
        let mut entity = entity.into_storable().map_err(Self::invalid)?;

        let id = self.allocate_id()?;
        entity.assign_id(id);

        let row = Row {
            value: entity.clone(),
            version: Version::INITIAL,
        };
        self.rows
            .write()
            .await
            .insert(id, Arc::new(RwLock::new(Some(row))));

        info!(entity = T::NAME, id, "Entity created");
        Ok(Versioned {
            entity,
            version: Version::INITIAL,
        })
    }

    /// Replaces the stored record for `id` with `entity`.
    ///
    /// `expected` is the version the caller last read. Of two writers holding
    /// the same version, only the first one to reach the row succeeds.
    pub async fn update(
        &self,
        id: EntityId,
        entity: T,
        expected: Version,
    ) -> Result<Version, StoreError> {
        if entity.id() != id {
            warn!(
                entity = T::NAME,
                path_id = id,
                body_id = entity.id(),
                "Identity mismatch"
            );
            return Err(StoreError::IdentityMismatch {
                entity: T::NAME,
                path_id: id,
                body_id: entity.id(),
            });
        }
        let entity = entity.into_storable().map_err(Self::invalid)?;

        match self.try_replace(id, entity, expected).await {
            WriteOutcome::Applied(version) => {
                info!(entity = T::NAME, id, version = %version, "Entity updated");
                Ok(version)
            }
            WriteOutcome::Conflict(conflict) => {
                let still_exists = self.exists(id).await;
                Err(resolve_conflict(T::NAME, id, conflict, still_exists))
            }
        }
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), StoreError> {
        let removed = self.rows.write().await.remove(&id);
        let Some(slot) = removed else {
            warn!(entity = T::NAME, id, "Delete target not found");
            return Err(Self::not_found(id));
        };

        // Only the caller that removed the slot from the map gets here.
        if slot.write().await.take().is_none() {
            return Err(Self::not_found(id));
        }
        info!(entity = T::NAME, id, "Entity deleted");
        Ok(())
    }

    /// The single write primitive: overwrite the row if it is still the one the
    /// caller expects.
    async fn try_replace(&self, id: EntityId, entity: T, expected: Version) -> WriteOutcome {
        let Some(slot) = self.slot(id).await else {
            return WriteOutcome::Conflict(Conflict::Vanished);
        };

        let mut guard = slot.write().await;
        let Some(row) = guard.as_mut() else {
            return WriteOutcome::Conflict(Conflict::Vanished);
        };
        if expected != row.version {
            return WriteOutcome::Conflict(Conflict::Stale {
                expected,
                found: row.version,
            });
        }

        row.value = entity;
        row.version = row.version.next();
        WriteOutcome::Applied(row.version)
    }

    async fn slot(&self, id: EntityId) -> Option<Slot<T>> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Hands out the counter's current value. The counter parks at 0 once
    /// `EntityId::MAX` has been issued, so every positive id is used exactly once.
    fn allocate_id(&self) -> Result<EntityId, StoreError> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| {
                (id > 0).then(|| id.checked_add(1).unwrap_or(0))
            })
            .map_err(|_| StoreError::IdSpaceExhausted { entity: T::NAME })
    }

    fn not_found(id: EntityId) -> StoreError {
        StoreError::NotFound { entity: T::NAME, id }
    }

    fn invalid(source: super::ValidationError) -> StoreError {
        warn!(entity = T::NAME, error = %source, "Validation failed");
        StoreError::Validation {
            entity: T::NAME,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, TableSchema};
    use crate::store::ValidationError;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: EntityId,
        text: String,
    }

    impl Note {
        fn new(text: &str) -> Self {
            Self {
                id: 0,
                text: text.to_string(),
            }
        }
    }

    impl Entity for Note {
        const NAME: &'static str = "Note";
        const TABLE: TableSchema = TableSchema {
            name: "Notes",
            columns: &[Column::key("Id"), Column::new("Text", ColumnType::Text)],
        };

        fn id(&self) -> EntityId {
            self.id
        }

        fn assign_id(&mut self, id: EntityId) {
            self.id = id;
        }

        fn into_storable(self) -> Result<Self, ValidationError> {
            if self.text.is_empty() {
                return Err(ValidationError::Required { field: "text" });
            }
            Ok(self)
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_ignores_caller_id() {
        let store = EntityStore::<Note>::new();

        let mut first = Note::new("a");
        first.id = 42;
        let first = store.create(first).await.unwrap();
        let second = store.create(Note::new("b")).await.unwrap();

        assert_eq!(first.entity.id, 1);
        assert_eq!(second.entity.id, 2);
        assert_eq!(first.version, Version::INITIAL);
        assert!(!store.exists(42).await);
    }

    #[tokio::test]
    async fn create_rejects_invalid_entity_without_consuming_state() {
        let store = EntityStore::<Note>::new();

        let err = store.create(Note::new("")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation {
                entity: "Note",
                source: ValidationError::Required { field: "text" },
            }
        );
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn list_returns_insertion_order_without_deleted() {
        let store = EntityStore::<Note>::new();
        for text in ["a", "b", "c"] {
            store.create(Note::new(text)).await.unwrap();
        }
        store.delete(2).await.unwrap();

        let texts: Vec<String> = store.list().await.into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn update_bumps_version_and_replaces_value() {
        let store = EntityStore::<Note>::new();
        let created = store.create(Note::new("draft")).await.unwrap();

        let mut edited = created.entity.clone();
        edited.text = "final".into();
        let version = store.update(1, edited, created.version).await.unwrap();

        assert_eq!(version, Version::new(2));
        let read = store.get_versioned(1).await.unwrap();
        assert_eq!(read.entity.text, "final");
        assert_eq!(read.version, Version::new(2));
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts_and_keeps_row() {
        let store = EntityStore::<Note>::new();
        let created = store.create(Note::new("v1")).await.unwrap();

        let mut first = created.entity.clone();
        first.text = "v2".into();
        store.update(1, first, created.version).await.unwrap();

        let mut late = created.entity.clone();
        late.text = "lost".into();
        let err = store.update(1, late, created.version).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::ConcurrencyConflict {
                entity: "Note",
                id: 1,
                expected: Some(Version::new(1)),
                found: Some(Version::new(2)),
            }
        );
        assert_eq!(store.get(1).await.unwrap().text, "v2");
    }

    #[tokio::test]
    async fn update_with_mismatched_id_changes_nothing() {
        let store = EntityStore::<Note>::new();
        store.create(Note::new("keep")).await.unwrap();

        let mut other = Note::new("other");
        other.id = 2;
        let err = store.update(1, other, Version::INITIAL).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::IdentityMismatch {
                entity: "Note",
                path_id: 1,
                body_id: 2,
            }
        );
        let read = store.get_versioned(1).await.unwrap();
        assert_eq!(read.entity.text, "keep");
        assert_eq!(read.version, Version::INITIAL);
    }

    #[tokio::test]
    async fn operations_on_absent_ids_are_not_found() {
        let store = EntityStore::<Note>::new();
        let mut ghost = Note::new("ghost");
        ghost.id = 7;

        assert!(store.get(7).await.unwrap_err().is_not_found());
        assert!(store
            .update(7, ghost, Version::INITIAL)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_after_delete_is_not_found_not_conflict() {
        let store = EntityStore::<Note>::new();
        let created = store.create(Note::new("gone")).await.unwrap();
        store.delete(1).await.unwrap();

        let err = store
            .update(1, created.entity, created.version)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists(1).await);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = EntityStore::<Note>::new();
        store.create(Note::new("a")).await.unwrap();
        store.delete(1).await.unwrap();

        let next = store.create(Note::new("b")).await.unwrap();
        assert_eq!(next.entity.id, 2);
        assert!(store.get(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn last_id_is_issued_before_the_space_is_exhausted() {
        let store = EntityStore::<Note> {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(EntityId::MAX),
        };

        let last = store.create(Note::new("last")).await.unwrap();
        assert_eq!(last.entity.id, EntityId::MAX);

        let err = store.create(Note::new("late")).await.unwrap_err();
        assert_eq!(err, StoreError::IdSpaceExhausted { entity: "Note" });
        assert_eq!(store.list().await.len(), 1);
    }
}
