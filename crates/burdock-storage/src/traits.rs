//! Collaborator trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use burdock_core::{
    Actor, EndpointRef, Enrollment, EnrollmentId, Event, EventId, RelationshipId,
    RelationshipType, RelationshipTypeId, StoredRelationship, TrackedEntity, TrackedEntityId,
};

/// Trait for the storage collaborator
///
/// Batched lookups are expected to provide their own transactionality; the
/// import engine never issues per-record queries for endpoint resolution.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Schema Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a relationship type by identifier
    async fn find_relationship_type(
        &self,
        id: &RelationshipTypeId,
    ) -> StorageResult<Option<RelationshipType>>;

    /// Get all relationship types matching the given identifiers
    ///
    /// Unknown identifiers are omitted from the result, not errors.
    async fn find_relationship_types_by_ids(
        &self,
        ids: &[RelationshipTypeId],
    ) -> StorageResult<Vec<RelationshipType>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Endpoint Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Get all tracked entities matching the given identifiers, scoped to
    /// what the actor may see
    async fn find_tracked_entities_by_ids(
        &self,
        ids: &[TrackedEntityId],
        actor: &Actor,
    ) -> StorageResult<Vec<TrackedEntity>>;

    /// Get all enrollments matching the given identifiers
    async fn find_enrollments_by_ids(&self, ids: &[EnrollmentId])
        -> StorageResult<Vec<Enrollment>>;

    /// Get all events matching the given identifiers
    async fn find_events_by_ids(&self, ids: &[EventId]) -> StorageResult<Vec<Event>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a relationship with this identifier is persisted
    async fn relationship_exists(&self, id: &RelationshipId) -> StorageResult<bool>;

    /// Get a relationship by identifier
    async fn get_relationship(
        &self,
        id: &RelationshipId,
    ) -> StorageResult<Option<StoredRelationship>>;

    /// Get all relationships touching the given endpoint on either side
    async fn get_relationships_for_endpoint(
        &self,
        endpoint: &EndpointRef,
    ) -> StorageResult<Vec<StoredRelationship>>;

    /// Persist a new relationship
    async fn add_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()>;

    /// Persist changes to an existing relationship
    async fn update_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()>;

    /// Remove a relationship
    async fn delete_relationship(&self, relationship: &StoredRelationship) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Chunk Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Release chunk-scoped resources, called at each flush boundary
    async fn release_chunk_resources(&self) -> StorageResult<()>;
}

/// Trait for the access-control collaborator
///
/// Methods return violation descriptions; an empty list means access is
/// granted.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Can the actor read this relationship?
    async fn can_read(&self, actor: &Actor, relationship: &StoredRelationship) -> Vec<String>;

    /// Can the actor create, modify, or delete this relationship?
    async fn can_write(&self, actor: &Actor, relationship: &StoredRelationship) -> Vec<String>;
}

/// Trait for resolving the acting user
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// The actor of the current call context
    async fn current_actor(&self) -> StorageResult<Actor>;

    /// Re-fetch an actor's current state, used at chunk boundaries
    async fn reload_actor(&self, actor: &Actor) -> StorageResult<Actor>;
}
