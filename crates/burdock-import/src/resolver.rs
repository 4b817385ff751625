//! Endpoint resolution
//!
//! Batch-loads everything a chunk of records references: first the
//! relationship types, then, grouped by the entity kind each type declares
//! on each side, the endpoints themselves. One batched lookup per populated
//! kind; never one query per record.

use crate::cache::BatchCaches;
use burdock_core::{
    Actor, EnrollmentId, EntityKind, EventId, RelationshipRecord, RelationshipTypeId,
    TrackedEntityId,
};
use burdock_storage::{RelationshipStore, StorageResult};
use std::collections::HashMap;
use tracing::debug;

/// Build fresh caches for one chunk of records
///
/// Identifiers with no match in storage are simply absent from the result;
/// the validator reports them as conflicts later. Uids are grouped by the
/// entity kind the relationship type declares for their side, not by the
/// reference's own variant, so a mis-kinded reference also surfaces as a
/// "not found" conflict.
pub async fn prepare_caches(
    records: &[RelationshipRecord],
    actor: &Actor,
    store: &dyn RelationshipStore,
) -> StorageResult<BatchCaches> {
    let mut caches = BatchCaches::new();

    let mut records_by_type: HashMap<RelationshipTypeId, Vec<&RelationshipRecord>> =
        HashMap::new();
    for record in records {
        if record.relationship_type.is_empty() {
            continue;
        }
        records_by_type
            .entry(record.relationship_type.clone())
            .or_default()
            .push(record);
    }

    // Load the relationship types first, so we know what the uids refer to
    let type_ids: Vec<RelationshipTypeId> = records_by_type.keys().cloned().collect();
    for relationship_type in store.find_relationship_types_by_ids(&type_ids).await? {
        caches
            .relationship_types
            .insert(relationship_type.id.clone(), relationship_type);
    }

    // Group endpoint uids by the entity kind each side's constraint declares
    let mut uids_by_kind: HashMap<EntityKind, Vec<String>> = HashMap::new();
    for relationship_type in caches.relationship_types.values() {
        let Some(records_of_type) = records_by_type.get(&relationship_type.id) else {
            continue;
        };

        let from_uids = records_of_type
            .iter()
            .map(|r| r.from_uid().to_string())
            .filter(|uid| !uid.is_empty());
        uids_by_kind
            .entry(relationship_type.from_constraint.kind())
            .or_default()
            .extend(from_uids);

        let to_uids = records_of_type
            .iter()
            .map(|r| r.to_uid().to_string())
            .filter(|uid| !uid.is_empty());
        uids_by_kind
            .entry(relationship_type.to_constraint.kind())
            .or_default()
            .extend(to_uids);
    }

    // One batched lookup per populated kind
    if let Some(uids) = uids_by_kind.get(&EntityKind::TrackedEntity) {
        let ids: Vec<TrackedEntityId> = uids.iter().map(|u| TrackedEntityId::new(u.as_str())).collect();
        for entity in store.find_tracked_entities_by_ids(&ids, actor).await? {
            caches.tracked_entities.insert(entity.id.clone(), entity);
        }
    }

    if let Some(uids) = uids_by_kind.get(&EntityKind::Enrollment) {
        let ids: Vec<EnrollmentId> = uids.iter().map(|u| EnrollmentId::new(u.as_str())).collect();
        for enrollment in store.find_enrollments_by_ids(&ids).await? {
            caches.enrollments.insert(enrollment.id.clone(), enrollment);
        }
    }

    if let Some(uids) = uids_by_kind.get(&EntityKind::Event) {
        let ids: Vec<EventId> = uids.iter().map(|u| EventId::new(u.as_str())).collect();
        for event in store.find_events_by_ids(&ids).await? {
            caches.events.insert(event.id.clone(), event);
        }
    }

    debug!(
        types = caches.relationship_types.len(),
        tracked_entities = caches.tracked_entities.len(),
        enrollments = caches.enrollments.len(),
        events = caches.events.len(),
        "prepared chunk caches"
    );

    Ok(caches)
}
