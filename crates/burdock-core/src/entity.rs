//! Endpoint entity types
//!
//! The three kinds of tracked entities a relationship may point at. The
//! import engine only consults the fields the endpoint constraints check;
//! everything else about these entities lives behind the storage collaborator.

use crate::id::{
    EnrollmentId, EventId, ProgramId, ProgramStageId, TrackedEntityId, TrackedEntityTypeId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked entity (person-like endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    /// Unique identifier
    pub id: TrackedEntityId,

    /// Declared entity type, matched against constraint sub-types
    pub entity_type: TrackedEntityTypeId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TrackedEntity {
    pub fn new(id: impl Into<TrackedEntityId>, entity_type: impl Into<TrackedEntityTypeId>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An enrollment (enrollment-like endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier
    pub id: EnrollmentId,

    /// Owning program, matched against constraint sub-types
    pub program: ProgramId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(id: impl Into<EnrollmentId>, program: impl Into<ProgramId>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            program: program.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An event (event-like endpoint)
///
/// An event always belongs to a program stage; the owning program is carried
/// alongside so constraint checks do not need a separate stage lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: EventId,

    /// Program stage this event was recorded against
    pub program_stage: ProgramStageId,

    /// Program owning the stage
    pub program: ProgramId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        id: impl Into<EventId>,
        program_stage: impl Into<ProgramStageId>,
        program: impl Into<ProgramId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            program_stage: program_stage.into(),
            program: program.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
