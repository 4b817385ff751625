//! Relationship records and their endpoints

use crate::entity::{Enrollment, Event, TrackedEntity};
use crate::id::{EnrollmentId, EventId, RelationshipId, RelationshipTypeId, TrackedEntityId};
use crate::relationship_type::RelationshipType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to one endpoint of a relationship
///
/// Exactly one of the three identifier kinds is populated, enforced by the
/// enum representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointRef {
    TrackedEntity(TrackedEntityId),
    Enrollment(EnrollmentId),
    Event(EventId),
}

impl EndpointRef {
    /// The raw identifier, regardless of endpoint kind
    pub fn uid(&self) -> &str {
        match self {
            Self::TrackedEntity(id) => id.as_str(),
            Self::Enrollment(id) => id.as_str(),
            Self::Event(id) => id.as_str(),
        }
    }

    pub fn tracked_entity(id: impl Into<TrackedEntityId>) -> Self {
        Self::TrackedEntity(id.into())
    }

    pub fn enrollment(id: impl Into<EnrollmentId>) -> Self {
        Self::Enrollment(id.into())
    }

    pub fn event(id: impl Into<EventId>) -> Self {
        Self::Event(id.into())
    }
}

/// A caller-supplied relationship record
///
/// This is the transient input/output shape of the import engine. Both
/// endpoints and the identifier are optional so that malformed payloads can
/// be carried through validation and reported as conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    /// Identifier, absent for records created without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipId>,

    /// Reference to the relationship type schema
    pub relationship_type: RelationshipTypeId,

    /// The `from` endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<EndpointRef>,

    /// The `to` endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<EndpointRef>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RelationshipRecord {
    pub fn new(
        relationship_type: impl Into<RelationshipTypeId>,
        from: EndpointRef,
        to: EndpointRef,
    ) -> Self {
        Self {
            relationship: None,
            relationship_type: relationship_type.into(),
            from: Some(from),
            to: Some(to),
            created: None,
            last_updated: None,
        }
    }

    /// Set a preset identifier
    pub fn with_id(mut self, id: impl Into<RelationshipId>) -> Self {
        self.relationship = Some(id.into());
        self
    }

    /// Identifier of the `from` endpoint, empty when the endpoint is missing
    pub fn from_uid(&self) -> &str {
        self.from.as_ref().map(EndpointRef::uid).unwrap_or("")
    }

    /// Identifier of the `to` endpoint, empty when the endpoint is missing
    pub fn to_uid(&self) -> &str {
        self.to.as_ref().map(EndpointRef::uid).unwrap_or("")
    }

    /// Reference string used in conflicts for this record
    pub fn reference(&self) -> &str {
        self.relationship
            .as_ref()
            .map(RelationshipId::as_str)
            .unwrap_or("")
    }
}

/// A fully resolved endpoint of a persisted relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoredEndpoint {
    TrackedEntity(TrackedEntity),
    Enrollment(Enrollment),
    Event(Event),
}

impl StoredEndpoint {
    pub fn uid(&self) -> &str {
        match self {
            Self::TrackedEntity(te) => te.id.as_str(),
            Self::Enrollment(en) => en.id.as_str(),
            Self::Event(ev) => ev.id.as_str(),
        }
    }

    /// Identifier-only reference to this endpoint
    pub fn to_ref(&self) -> EndpointRef {
        match self {
            Self::TrackedEntity(te) => EndpointRef::TrackedEntity(te.id.clone()),
            Self::Enrollment(en) => EndpointRef::Enrollment(en.id.clone()),
            Self::Event(ev) => EndpointRef::Event(ev.id.clone()),
        }
    }
}

/// The persisted form of a relationship
///
/// Endpoints are resolved entity snapshots, not bare identifiers. Instances
/// are constructed by the import engine and handed to the storage
/// collaborator, which owns their lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRelationship {
    /// Unique identifier
    pub id: RelationshipId,

    /// The declaring relationship type
    pub relationship_type: RelationshipType,

    /// Resolved `from` endpoint
    pub from: StoredEndpoint,

    /// Resolved `to` endpoint
    pub to: StoredEndpoint,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredRelationship {
    /// Map back to the record DTO with identifier-only endpoints
    pub fn to_record(&self) -> RelationshipRecord {
        RelationshipRecord {
            relationship: Some(self.id.clone()),
            relationship_type: self.relationship_type.id.clone(),
            from: Some(self.from.to_ref()),
            to: Some(self.to.to_ref()),
            created: Some(self.created_at),
            last_updated: Some(self.updated_at),
        }
    }
}
