//! Burdock Core - data model for the relationship import engine
//!
//! This crate provides the domain types shared by the Burdock storage
//! and import crates: tracked entities, enrollments, events, relationship
//! types with their endpoint constraints, and the import outcome types.

pub mod actor;
pub mod entity;
pub mod error;
pub mod id;
pub mod options;
pub mod relationship;
pub mod relationship_type;
pub mod summary;

pub use actor::Actor;
pub use entity::{Enrollment, Event, TrackedEntity};
pub use error::{Error, Result};
pub use id::{
    EnrollmentId, EventId, ProgramId, ProgramStageId, RelationshipId, RelationshipTypeId,
    TrackedEntityId, TrackedEntityTypeId,
};
pub use options::{ImportOptions, ImportStrategy, ReportMode};
pub use relationship::{EndpointRef, RelationshipRecord, StoredEndpoint, StoredRelationship};
pub use relationship_type::{Constraint, EntityKind, RelationshipType};
pub use summary::{ImportConflict, ImportCount, ImportStatus, ImportSummaries, ImportSummary};
