//! Constraint checking
//!
//! Pure functions over a record and the chunk caches; no storage access and
//! no side effects. An empty conflict list means the record is importable
//! as-is.

use crate::cache::BatchCaches;
use burdock_core::{Constraint, EndpointRef, ImportConflict, RelationshipRecord};

/// Check one record against its relationship type and resolved endpoints
///
/// Structural conflicts (missing references, self-relationships) short-circuit
/// the referential checks; a missing relationship type short-circuits the
/// endpoint checks. Once the type is known, both sides are checked
/// independently and every mismatch yields its own conflict.
pub fn check_relationship(
    record: &RelationshipRecord,
    caches: &BatchCaches,
) -> Vec<ImportConflict> {
    let mut conflicts = Vec::new();
    let reference = record.reference();

    let mut relationship_type = None;

    if record.relationship_type.is_empty() {
        conflicts.push(ImportConflict::new(
            reference,
            "Missing property 'relationshipType'",
        ));
    } else {
        relationship_type = caches.relationship_type(&record.relationship_type);
    }

    if record.from_uid().is_empty() {
        conflicts.push(ImportConflict::new(reference, "Missing property 'from'"));
    }

    if record.to_uid().is_empty() {
        conflicts.push(ImportConflict::new(reference, "Missing property 'to'"));
    }

    if record.from.is_some() && record.from == record.to {
        conflicts.push(ImportConflict::new(
            reference,
            "Self-referencing relationships are not allowed.",
        ));
    }

    if !conflicts.is_empty() {
        return conflicts;
    }

    let Some(relationship_type) = relationship_type else {
        conflicts.push(ImportConflict::new(
            reference,
            format!(
                "relationshipType '{}' not found.",
                record.relationship_type
            ),
        ));
        return conflicts;
    };

    if let (Some(from), Some(to)) = (&record.from, &record.to) {
        conflicts.extend(constraint_conflicts(
            &relationship_type.from_constraint,
            from,
            reference,
            caches,
        ));
        conflicts.extend(constraint_conflicts(
            &relationship_type.to_constraint,
            to,
            reference,
            caches,
        ));
    }

    conflicts
}

/// Conflicts between one endpoint and the constraint declared for its side
fn constraint_conflicts(
    constraint: &Constraint,
    endpoint: &EndpointRef,
    reference: &str,
    caches: &BatchCaches,
) -> Vec<ImportConflict> {
    let uid = endpoint.uid();
    let mut conflicts = Vec::new();

    match constraint {
        Constraint::TrackedEntity { entity_type } => match caches.tracked_entity(uid) {
            None => conflicts.push(ImportConflict::new(
                reference,
                format!("TrackedEntity '{}' not found.", uid),
            )),
            Some(entity) if entity.entity_type != *entity_type => {
                conflicts.push(ImportConflict::new(
                    reference,
                    format!("TrackedEntity '{}' has invalid TrackedEntityType.", uid),
                ));
            }
            Some(_) => {}
        },
        Constraint::Enrollment { program } => match caches.enrollment(uid) {
            None => conflicts.push(ImportConflict::new(
                reference,
                format!("Enrollment '{}' not found.", uid),
            )),
            Some(enrollment) if enrollment.program != *program => {
                conflicts.push(ImportConflict::new(
                    reference,
                    format!("Enrollment '{}' has invalid Program.", uid),
                ));
            }
            Some(_) => {}
        },
        Constraint::Event {
            program,
            program_stage,
        } => match caches.event(uid) {
            None => conflicts.push(ImportConflict::new(
                reference,
                format!("Event '{}' not found.", uid),
            )),
            Some(event) => {
                // A program mismatch takes precedence over the stage check
                if program.as_ref().is_some_and(|p| event.program != *p) {
                    conflicts.push(ImportConflict::new(
                        reference,
                        format!("Event '{}' has invalid Program.", uid),
                    ));
                } else if program_stage
                    .as_ref()
                    .is_some_and(|s| event.program_stage != *s)
                {
                    conflicts.push(ImportConflict::new(
                        reference,
                        format!("Event '{}' has invalid ProgramStage.", uid),
                    ));
                }
            }
        },
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use burdock_core::{Enrollment, Event, RelationshipType, TrackedEntity};

    fn caches() -> BatchCaches {
        let mut caches = BatchCaches::new();
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
        caches.relationship_types.insert(rt.id.clone(), rt);

        let te = TrackedEntity::new("teA", "person");
        caches.tracked_entities.insert(te.id.clone(), te);
        let te = TrackedEntity::new("teOther", "facility");
        caches.tracked_entities.insert(te.id.clone(), te);

        let ev = Event::new("evB", "stage1", "progP");
        caches.events.insert(ev.id.clone(), ev);
        let ev = Event::new("evQ", "stage9", "progQ");
        caches.events.insert(ev.id.clone(), ev);

        let en = Enrollment::new("enC", "progP");
        caches.enrollments.insert(en.id.clone(), en);

        caches
    }

    fn valid_record() -> RelationshipRecord {
        RelationshipRecord::new(
            "rtA",
            EndpointRef::tracked_entity("teA"),
            EndpointRef::event("evB"),
        )
    }

    #[test]
    fn test_valid_record_has_no_conflicts() {
        let conflicts = check_relationship(&valid_record(), &caches());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_missing_properties_are_each_reported() {
        let mut record = valid_record();
        record.relationship_type = "".into();
        record.from = None;
        record.to = None;

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 3);
        assert!(conflicts
            .iter()
            .any(|c| c.message == "Missing property 'relationshipType'"));
        assert!(conflicts
            .iter()
            .any(|c| c.message == "Missing property 'from'"));
        assert!(conflicts
            .iter()
            .any(|c| c.message == "Missing property 'to'"));
    }

    #[test]
    fn test_self_reference_yields_exactly_one_structural_conflict() {
        let mut record = valid_record();
        record.from = Some(EndpointRef::tracked_entity("teA"));
        record.to = Some(EndpointRef::tracked_entity("teA"));

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].message,
            "Self-referencing relationships are not allowed."
        );
    }

    #[test]
    fn test_structural_conflicts_suppress_referential_checks() {
        // Unknown type and a missing endpoint: only the structural conflict
        // is reported, not the type lookup failure.
        let mut record = valid_record();
        record.relationship_type = "unknown".into();
        record.to = None;

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].message, "Missing property 'to'");
    }

    #[test]
    fn test_unknown_type_yields_single_not_found_conflict() {
        let mut record = valid_record();
        record.relationship_type = "unknown".into();

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].message,
            "relationshipType 'unknown' not found."
        );
    }

    #[test]
    fn test_both_sides_checked_independently() {
        let record = RelationshipRecord::new(
            "rtA",
            EndpointRef::tracked_entity("missingTe"),
            EndpointRef::event("missingEv"),
        );

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .any(|c| c.message == "TrackedEntity 'missingTe' not found."));
        assert!(conflicts
            .iter()
            .any(|c| c.message == "Event 'missingEv' not found."));
    }

    #[test]
    fn test_invalid_tracked_entity_type() {
        let mut record = valid_record();
        record.from = Some(EndpointRef::tracked_entity("teOther"));

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].message,
            "TrackedEntity 'teOther' has invalid TrackedEntityType."
        );
    }

    #[test]
    fn test_event_with_wrong_program() {
        let mut record = valid_record();
        record.to = Some(EndpointRef::event("evQ"));

        let conflicts = check_relationship(&record, &caches());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].message, "Event 'evQ' has invalid Program.");
    }

    #[test]
    fn test_program_mismatch_suppresses_stage_check() {
        let mut caches = caches();
        let rt = RelationshipType::new(
            "rtStage",
            "person-to-staged-event",
            Constraint::TrackedEntity {
                entity_type: "person".into(),
            },
            Constraint::Event {
                program: Some("progP".into()),
                program_stage: Some("stage1".into()),
            },
        );
        caches.relationship_types.insert(rt.id.clone(), rt);

        let mut record = valid_record();
        record.relationship_type = "rtStage".into();
        record.to = Some(EndpointRef::event("evQ"));

        let conflicts = check_relationship(&record, &caches);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].message, "Event 'evQ' has invalid Program.");
    }

    #[test]
    fn test_stage_mismatch_reported_when_program_matches() {
        let mut caches = caches();
        let rt = RelationshipType::new(
            "rtStage",
            "person-to-staged-event",
            Constraint::TrackedEntity {
                entity_type: "person".into(),
            },
            Constraint::Event {
                program: None,
                program_stage: Some("stage2".into()),
            },
        );
        caches.relationship_types.insert(rt.id.clone(), rt);

        let mut record = valid_record();
        record.relationship_type = "rtStage".into();

        let conflicts = check_relationship(&record, &caches);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].message,
            "Event 'evB' has invalid ProgramStage."
        );
    }

    #[test]
    fn test_enrollment_with_wrong_program() {
        let mut caches = caches();
        let rt = RelationshipType::new(
            "rtEnr",
            "person-to-enrollment",
            Constraint::TrackedEntity {
                entity_type: "person".into(),
            },
            Constraint::Enrollment {
                program: "progQ".into(),
            },
        );
        caches.relationship_types.insert(rt.id.clone(), rt);

        let mut record = valid_record();
        record.relationship_type = "rtEnr".into();
        record.to = Some(EndpointRef::enrollment("enC"));

        let conflicts = check_relationship(&record, &caches);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].message,
            "Enrollment 'enC' has invalid Program."
        );
    }
}
