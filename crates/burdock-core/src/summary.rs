//! Import outcome types
//!
//! Per-record failures are carried as data in these types; nothing here is
//! an interrupting error. See the crate error type for collaborator-level
//! failures.

use crate::id::RelationshipId;
use serde::{Deserialize, Serialize};

/// Outcome status of one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    #[default]
    Success,
    Warning,
    Error,
}

/// A structured validation failure attached to one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConflict {
    /// The record or field the conflict concerns
    pub object: String,

    /// Human-readable description
    pub message: String,
}

impl ImportConflict {
    pub fn new(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ImportConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.object, self.message)
    }
}

/// Counters for one record or aggregated across a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCount {
    pub imported: u32,
    pub updated: u32,
    pub ignored: u32,
    pub deleted: u32,
}

impl ImportCount {
    pub fn total(&self) -> u32 {
        self.imported + self.updated + self.ignored + self.deleted
    }

    pub fn add(&mut self, other: &ImportCount) {
        self.imported += other.imported;
        self.updated += other.updated;
        self.ignored += other.ignored;
        self.deleted += other.deleted;
    }
}

/// Per-record outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Outcome status, defaults to success
    pub status: ImportStatus,

    /// Identifier of the affected relationship, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<RelationshipId>,

    /// Free-form description, set for non-conflict failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Counters for this record
    pub import_count: ImportCount,

    /// Conflicts found during validation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ImportConflict>,
}

impl ImportSummary {
    /// New success summary referencing a record identifier
    pub fn of(reference: Option<RelationshipId>) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    /// New error summary with a description
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Error,
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// New warning summary with a description
    pub fn warning(description: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Warning,
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: RelationshipId) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Count this record as ignored
    pub fn ignored(mut self) -> Self {
        self.import_count.ignored += 1;
        self
    }

    /// Count this record as deleted
    pub fn deleted(mut self) -> Self {
        self.import_count.deleted += 1;
        self
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Aggregated outcome of a batch, in submission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummaries {
    pub summaries: Vec<ImportSummary>,
}

impl ImportSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: ImportSummary) {
        self.summaries.push(summary);
    }

    pub fn extend(&mut self, other: ImportSummaries) {
        self.summaries.extend(other.summaries);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImportSummary> {
        self.summaries.iter()
    }

    /// Aggregate counters across all summaries
    pub fn count(&self) -> ImportCount {
        let mut count = ImportCount::default();
        for summary in &self.summaries {
            count.add(&summary.import_count);
        }
        count
    }

    /// Drop summaries that carry no conflicts, for terse reporting
    pub fn retain_conflicting(&mut self) {
        self.summaries.retain(ImportSummary::has_conflicts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_builders() {
        let summary = ImportSummary::error("Relationship relA already exists")
            .with_reference(RelationshipId::new("relA"))
            .ignored();
        assert_eq!(summary.status, ImportStatus::Error);
        assert_eq!(summary.import_count.ignored, 1);
        assert_eq!(summary.reference, Some(RelationshipId::new("relA")));
    }

    #[test]
    fn test_aggregate_count() {
        let mut summaries = ImportSummaries::new();
        let mut ok = ImportSummary::of(None);
        ok.import_count.imported = 1;
        summaries.push(ok);
        summaries.push(ImportSummary::warning("skipped").ignored());

        let count = summaries.count();
        assert_eq!(count.imported, 1);
        assert_eq!(count.ignored, 1);
        assert_eq!(count.total(), 2);
    }

    #[test]
    fn test_retain_conflicting_drops_clean_summaries() {
        let mut summaries = ImportSummaries::new();
        summaries.push(ImportSummary::of(None));
        let mut with_conflict = ImportSummary::of(None);
        with_conflict
            .conflicts
            .push(ImportConflict::new("relA", "Missing property 'from'"));
        summaries.push(with_conflict);

        summaries.retain_conflicting();
        assert_eq!(summaries.len(), 1);
        assert!(summaries.summaries[0].has_conflicts());
    }
}
