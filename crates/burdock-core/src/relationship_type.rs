//! Relationship type schema
//!
//! A relationship type declares, for each side of the relationship, which
//! kind of entity is allowed there and which sub-type narrows it further.

use crate::id::{ProgramId, ProgramStageId, RelationshipTypeId, TrackedEntityTypeId};
use serde::{Deserialize, Serialize};

/// The kind of entity an endpoint may point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    TrackedEntity,
    Enrollment,
    Event,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackedEntity => write!(f, "TrackedEntity"),
            Self::Enrollment => write!(f, "Enrollment"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// Constraint on one side of a relationship
///
/// Each variant carries the sub-type requirement for its entity kind:
/// tracked entities must match an entity type, enrollments an owning program,
/// and events optionally a program or a specific stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    TrackedEntity {
        entity_type: TrackedEntityTypeId,
    },
    Enrollment {
        program: ProgramId,
    },
    Event {
        program: Option<ProgramId>,
        program_stage: Option<ProgramStageId>,
    },
}

impl Constraint {
    /// The entity kind this constraint admits
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::TrackedEntity { .. } => EntityKind::TrackedEntity,
            Self::Enrollment { .. } => EntityKind::Enrollment,
            Self::Event { .. } => EntityKind::Event,
        }
    }
}

/// A relationship type, immutable once loaded for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipType {
    /// Unique identifier
    pub id: RelationshipTypeId,

    /// Human-readable name
    pub name: String,

    /// Constraint on the `from` side
    pub from_constraint: Constraint,

    /// Constraint on the `to` side
    pub to_constraint: Constraint,
}

impl RelationshipType {
    pub fn new(
        id: impl Into<RelationshipTypeId>,
        name: impl Into<String>,
        from_constraint: Constraint,
        to_constraint: Constraint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            from_constraint,
            to_constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_kind() {
        let c = Constraint::TrackedEntity {
            entity_type: "person".into(),
        };
        assert_eq!(c.kind(), EntityKind::TrackedEntity);

        let c = Constraint::Event {
            program: Some("progP".into()),
            program_stage: None,
        };
        assert_eq!(c.kind(), EntityKind::Event);
    }

    #[test]
    fn test_relationship_type_creation() {
        let rt = RelationshipType::new(
            "rtA",
            "person-to-event",
            Constraint::TrackedEntity {
                entity_type: "person".into(),
            },
            Constraint::Event {
                program: Some("progP".into()),
                program_stage: None,
            },
        );
        assert_eq!(rt.id.as_str(), "rtA");
        assert_eq!(rt.from_constraint.kind(), EntityKind::TrackedEntity);
        assert_eq!(rt.to_constraint.kind(), EntityKind::Event);
    }
}
