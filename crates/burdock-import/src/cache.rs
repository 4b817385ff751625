//! Chunk-scoped lookup caches

use burdock_core::{
    Enrollment, EnrollmentId, Event, EventId, RelationshipType, RelationshipTypeId, TrackedEntity,
    TrackedEntityId,
};
use std::collections::HashMap;

/// Lookup caches for one processing chunk
///
/// Populated once by the resolver, consulted many times by the validator,
/// and dropped at the flush boundary. Caches are never shared or reused
/// across chunks; entity identity is only assumed stable for the duration
/// of the chunk that loaded it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchCaches {
    pub relationship_types: HashMap<RelationshipTypeId, RelationshipType>,
    pub tracked_entities: HashMap<TrackedEntityId, TrackedEntity>,
    pub enrollments: HashMap<EnrollmentId, Enrollment>,
    pub events: HashMap<EventId, Event>,
}

impl BatchCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relationship_type(&self, id: &RelationshipTypeId) -> Option<&RelationshipType> {
        self.relationship_types.get(id)
    }

    pub fn tracked_entity(&self, uid: &str) -> Option<&TrackedEntity> {
        self.tracked_entities.get(&TrackedEntityId::new(uid))
    }

    pub fn enrollment(&self, uid: &str) -> Option<&Enrollment> {
        self.enrollments.get(&EnrollmentId::new(uid))
    }

    pub fn event(&self, uid: &str) -> Option<&Event> {
        self.events.get(&EventId::new(uid))
    }

    pub fn clear(&mut self) {
        self.relationship_types.clear();
        self.tracked_entities.clear();
        self.enrollments.clear();
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burdock_core::TrackedEntity;

    #[test]
    fn test_lookup_by_uid() {
        let mut caches = BatchCaches::new();
        let entity = TrackedEntity::new("teA", "person");
        caches.tracked_entities.insert(entity.id.clone(), entity);

        assert!(caches.tracked_entity("teA").is_some());
        assert!(caches.tracked_entity("teB").is_none());

        caches.clear();
        assert!(caches.tracked_entity("teA").is_none());
    }
}
