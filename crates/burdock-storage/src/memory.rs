//! In-memory collaborators for testing
//!
//! [`MemoryStore`] holds all tracked data in `RwLock`-guarded maps and is the
//! backend the engine's tests run against. [`AllowAllAccess`] and
//! [`StaticActorResolver`] are the matching permissive collaborators.

use crate::error::{StorageError, StorageResult};
use crate::traits::{AccessControl, ActorResolver, RelationshipStore};
use async_trait::async_trait;
use burdock_core::{
    Actor, EndpointRef, Enrollment, EnrollmentId, Event, EventId, RelationshipId,
    RelationshipType, RelationshipTypeId, StoredRelationship, TrackedEntity, TrackedEntityId,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend
pub struct MemoryStore {
    relationship_types: RwLock<HashMap<RelationshipTypeId, RelationshipType>>,
    tracked_entities: RwLock<HashMap<TrackedEntityId, TrackedEntity>>,
    enrollments: RwLock<HashMap<EnrollmentId, Enrollment>>,
    events: RwLock<HashMap<EventId, Event>>,
    relationships: RwLock<HashMap<RelationshipId, StoredRelationship>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            relationship_types: RwLock::new(HashMap::new()),
            tracked_entities: RwLock::new(HashMap::new()),
            enrollments: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            relationships: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a relationship type
    pub fn put_relationship_type(&self, relationship_type: RelationshipType) -> StorageResult<()> {
        let mut types = self
            .relationship_types
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        types.insert(relationship_type.id.clone(), relationship_type);
        Ok(())
    }

    /// Seed a tracked entity
    pub fn put_tracked_entity(&self, entity: TrackedEntity) -> StorageResult<()> {
        let mut entities = self
            .tracked_entities
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Seed an enrollment
    pub fn put_enrollment(&self, enrollment: Enrollment) -> StorageResult<()> {
        let mut enrollments = self
            .enrollments
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        enrollments.insert(enrollment.id.clone(), enrollment);
        Ok(())
    }

    /// Seed an event
    pub fn put_event(&self, event: Event) -> StorageResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        events.insert(event.id.clone(), event);
        Ok(())
    }

    /// Number of persisted relationships
    pub fn relationship_count(&self) -> StorageResult<usize> {
        let relationships = self
            .relationships
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(relationships.len())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn find_relationship_type(
        &self,
        id: &RelationshipTypeId,
    ) -> StorageResult<Option<RelationshipType>> {
        let types = self
            .relationship_types
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(types.get(id).cloned())
    }

    async fn find_relationship_types_by_ids(
        &self,
        ids: &[RelationshipTypeId],
    ) -> StorageResult<Vec<RelationshipType>> {
        let types = self
            .relationship_types
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(ids.iter().filter_map(|id| types.get(id).cloned()).collect())
    }

    async fn find_tracked_entities_by_ids(
        &self,
        ids: &[TrackedEntityId],
        _actor: &Actor,
    ) -> StorageResult<Vec<TrackedEntity>> {
        let entities = self
            .tracked_entities
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(ids
            .iter()
            .filter_map(|id| entities.get(id).cloned())
            .collect())
    }

    async fn find_enrollments_by_ids(
        &self,
        ids: &[EnrollmentId],
    ) -> StorageResult<Vec<Enrollment>> {
        let enrollments = self
            .enrollments
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(ids
            .iter()
            .filter_map(|id| enrollments.get(id).cloned())
            .collect())
    }

    async fn find_events_by_ids(&self, ids: &[EventId]) -> StorageResult<Vec<Event>> {
        let events = self
            .events
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(ids.iter().filter_map(|id| events.get(id).cloned()).collect())
    }

    async fn relationship_exists(&self, id: &RelationshipId) -> StorageResult<bool> {
        let relationships = self
            .relationships
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(relationships.contains_key(id))
    }

    async fn get_relationship(
        &self,
        id: &RelationshipId,
    ) -> StorageResult<Option<StoredRelationship>> {
        let relationships = self
            .relationships
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(relationships.get(id).cloned())
    }

    async fn get_relationships_for_endpoint(
        &self,
        endpoint: &EndpointRef,
    ) -> StorageResult<Vec<StoredRelationship>> {
        let relationships = self
            .relationships
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(relationships
            .values()
            .filter(|r| r.from.to_ref() == *endpoint || r.to.to_ref() == *endpoint)
            .cloned()
            .collect())
    }

    async fn add_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()> {
        let mut relationships = self
            .relationships
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        relationships.insert(relationship.id.clone(), relationship.clone());
        Ok(())
    }

    async fn update_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()> {
        let mut relationships = self
            .relationships
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        relationships.insert(relationship.id.clone(), relationship.clone());
        Ok(())
    }

    async fn delete_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()> {
        let mut relationships = self
            .relationships
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        relationships.remove(&relationship.id);
        Ok(())
    }

    async fn release_chunk_resources(&self) -> StorageResult<()> {
        // Nothing chunk-scoped to release in memory
        Ok(())
    }
}

/// Access-control collaborator that grants everything
pub struct AllowAllAccess;

#[async_trait]
impl AccessControl for AllowAllAccess {
    async fn can_read(&self, _actor: &Actor, _relationship: &StoredRelationship) -> Vec<String> {
        Vec::new()
    }

    async fn can_write(&self, _actor: &Actor, _relationship: &StoredRelationship) -> Vec<String> {
        Vec::new()
    }
}

/// Actor resolver that always yields the same actor
pub struct StaticActorResolver {
    actor: Actor,
}

impl StaticActorResolver {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl ActorResolver for StaticActorResolver {
    async fn current_actor(&self) -> StorageResult<Actor> {
        Ok(self.actor.clone())
    }

    async fn reload_actor(&self, _actor: &Actor) -> StorageResult<Actor> {
        Ok(self.actor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burdock_core::{Constraint, StoredEndpoint};
    use chrono::Utc;

    fn stored_relationship(id: &str, from_te: &str, to_ev: &str) -> StoredRelationship {
        StoredRelationship {
            id: RelationshipId::new(id),
            relationship_type: RelationshipType::new(
                "rtA",
                "person-to-event",
                Constraint::TrackedEntity {
                    entity_type: "person".into(),
                },
                Constraint::Event {
                    program: None,
                    program_stage: None,
                },
            ),
            from: StoredEndpoint::TrackedEntity(TrackedEntity::new(from_te, "person")),
            to: StoredEndpoint::Event(Event::new(to_ev, "stage1", "progP")),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_batched_lookups_skip_unknown_ids() {
        let store = MemoryStore::new();
        store
            .put_tracked_entity(TrackedEntity::new("teA", "person"))
            .unwrap();

        let actor = Actor::new("u1", "alice");
        let found = store
            .find_tracked_entities_by_ids(
                &[TrackedEntityId::new("teA"), TrackedEntityId::new("nope")],
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "teA");
    }

    #[tokio::test]
    async fn test_relationship_crud() {
        let store = MemoryStore::new();
        let relationship = stored_relationship("relA", "teA", "evB");

        assert!(!store
            .relationship_exists(&relationship.id)
            .await
            .unwrap());

        store.add_relationship(&relationship).await.unwrap();
        assert!(store.relationship_exists(&relationship.id).await.unwrap());

        let fetched = store
            .get_relationship(&relationship.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.from.uid(), "teA");

        store.delete_relationship(&relationship).await.unwrap();
        assert!(!store
            .relationship_exists(&relationship.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_get_relationships_for_endpoint_matches_either_side() {
        let store = MemoryStore::new();
        store
            .add_relationship(&stored_relationship("relA", "teA", "evB"))
            .await
            .unwrap();
        store
            .add_relationship(&stored_relationship("relB", "teC", "evB"))
            .await
            .unwrap();

        let by_from = store
            .get_relationships_for_endpoint(&EndpointRef::tracked_entity("teA"))
            .await
            .unwrap();
        assert_eq!(by_from.len(), 1);

        let by_to = store
            .get_relationships_for_endpoint(&EndpointRef::event("evB"))
            .await
            .unwrap();
        assert_eq!(by_to.len(), 2);
    }
}
