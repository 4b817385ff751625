//! Batch import orchestration
//!
//! Drives chunks of records through resolve, validate, and persist, and
//! aggregates per-record outcomes. Processing is sequential and outcomes are
//! produced in submission order; no per-record failure aborts the batch.

use crate::cache::BatchCaches;
use crate::reconciler;
use crate::resolver;
use crate::validator;
use burdock_core::{
    Actor, Constraint, EndpointRef, EntityKind, ImportOptions, ImportStatus, ImportSummaries,
    ImportSummary, RelationshipId, RelationshipRecord, ReportMode, Result, StoredEndpoint,
    StoredRelationship,
};
use burdock_storage::{AccessControl, ActorResolver, RelationshipStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Records processed between flushes of chunk-scoped state
pub const FLUSH_FREQUENCY: usize = 100;

/// The relationship import engine
///
/// Owns no persistent state of its own; all lookups and writes go through
/// the collaborators, and chunk caches live only for the duration of a
/// chunk. Independent batches may run concurrently as long as each call
/// gets its own service or the collaborators tolerate it; within one batch
/// everything is sequential.
pub struct RelationshipImportService {
    store: Arc<dyn RelationshipStore>,
    access: Arc<dyn AccessControl>,
    actors: Arc<dyn ActorResolver>,
}

impl RelationshipImportService {
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        access: Arc<dyn AccessControl>,
        actors: Arc<dyn ActorResolver>,
    ) -> Self {
        Self {
            store,
            access,
            actors,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Batch Entry Point
    // ─────────────────────────────────────────────────────────────────────────

    /// Partition a batch by strategy and run all three passes
    pub async fn process_relationship_list(
        &self,
        records: Vec<RelationshipRecord>,
        options: ImportOptions,
    ) -> Result<ImportSummaries> {
        let options = self.fill_actor(options).await?;
        let total = records.len();
        let batch =
            reconciler::partition(records, options.strategy, self.store.as_ref()).await?;

        debug!(
            total,
            create = batch.create.len(),
            update = batch.update.len(),
            delete = batch.delete.len(),
            strategy = ?options.strategy,
            "partitioned relationship batch"
        );

        let mut summaries = ImportSummaries::new();
        summaries.extend(self.add_many(batch.create, options.clone()).await?);
        summaries.extend(self.update_many(batch.update, options.clone()).await?);
        summaries.extend(self.delete_many(batch.delete, options.clone()).await?);

        if options.report_mode == ReportMode::ErrorsOnly {
            summaries.retain_conflicting();
        }

        info!(total, outcomes = summaries.len(), "processed relationship batch");
        Ok(summaries)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────────

    /// Create relationships, chunk by chunk
    pub async fn add_many(
        &self,
        records: Vec<RelationshipRecord>,
        options: ImportOptions,
    ) -> Result<ImportSummaries> {
        let options = self.fill_actor(options).await?;
        let mut actor = self.actor_of(&options).await?;
        let mut summaries = ImportSummaries::new();

        for chunk in records.chunks(FLUSH_FREQUENCY) {
            actor = self.actors.reload_actor(&actor).await?;
            let caches = resolver::prepare_caches(chunk, &actor, self.store.as_ref()).await?;

            for record in chunk {
                summaries.push(self.add_record(record, &actor, &caches).await?);
            }

            // Flush boundary: caches are dropped, storage releases its own
            // chunk-scoped resources
            self.store.release_chunk_resources().await?;
        }

        Ok(summaries)
    }

    /// Create a single relationship
    pub async fn add_one(
        &self,
        record: &RelationshipRecord,
        options: ImportOptions,
    ) -> Result<ImportSummary> {
        let options = self.fill_actor(options).await?;
        let actor = self.actor_of(&options).await?;
        let caches =
            resolver::prepare_caches(std::slice::from_ref(record), &actor, self.store.as_ref())
                .await?;
        self.add_record(record, &actor, &caches).await
    }

    async fn add_record(
        &self,
        record: &RelationshipRecord,
        actor: &Actor,
        caches: &BatchCaches,
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::of(record.relationship.clone());

        // Duplicates are rejected before any constraint checking
        if let Some(id) = &record.relationship {
            if !id.is_empty() && self.store.relationship_exists(id).await? {
                return Ok(
                    ImportSummary::error(format!("Relationship {} already exists", id))
                        .with_reference(id.clone())
                        .ignored(),
                );
            }
        }

        let conflicts = validator::check_relationship(record, caches);
        if !conflicts.is_empty() {
            summary.status = ImportStatus::Error;
            summary.conflicts = conflicts;
            summary.import_count.ignored += 1;
            return Ok(summary);
        }

        let Some(stored) = build_stored(record, caches) else {
            summary.status = ImportStatus::Error;
            summary.description = Some("Relationship could not be constructed".to_string());
            summary.import_count.ignored += 1;
            return Ok(summary);
        };

        let violations = self.access.can_write(actor, &stored).await;
        if !violations.is_empty() {
            return Ok(ImportSummary::error(violations.join(", ")).ignored());
        }

        self.store.add_relationship(&stored).await?;
        debug!(relationship = %stored.id, "added relationship");

        summary.reference = Some(stored.id);
        summary.import_count.imported += 1;
        Ok(summary)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Update
    // ─────────────────────────────────────────────────────────────────────────

    /// Update relationships, chunk by chunk
    pub async fn update_many(
        &self,
        records: Vec<RelationshipRecord>,
        options: ImportOptions,
    ) -> Result<ImportSummaries> {
        let options = self.fill_actor(options).await?;
        let mut actor = self.actor_of(&options).await?;
        let mut summaries = ImportSummaries::new();

        for chunk in records.chunks(FLUSH_FREQUENCY) {
            actor = self.actors.reload_actor(&actor).await?;
            let caches = resolver::prepare_caches(chunk, &actor, self.store.as_ref()).await?;

            for record in chunk {
                summaries.push(self.update_record(record, &actor, &caches).await?);
            }

            self.store.release_chunk_resources().await?;
        }

        Ok(summaries)
    }

    /// Update a single relationship
    pub async fn update_one(
        &self,
        record: &RelationshipRecord,
        options: ImportOptions,
    ) -> Result<ImportSummary> {
        let options = self.fill_actor(options).await?;
        let actor = self.actor_of(&options).await?;
        let caches =
            resolver::prepare_caches(std::slice::from_ref(record), &actor, self.store.as_ref())
                .await?;
        self.update_record(record, &actor, &caches).await
    }

    async fn update_record(
        &self,
        record: &RelationshipRecord,
        actor: &Actor,
        caches: &BatchCaches,
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::of(record.relationship.clone());

        let existing = match &record.relationship {
            Some(id) if !id.is_empty() => self.store.get_relationship(id).await?,
            _ => None,
        };

        let mut conflicts = validator::check_relationship(record, caches);

        let Some(mut existing) = existing else {
            conflicts.push(burdock_core::ImportConflict::new(
                "Relationship",
                format!("Relationship '{}' does not exist", record.reference()),
            ));
            summary.status = ImportStatus::Error;
            summary.import_count.ignored += 1;
            summary.conflicts = conflicts;
            return Ok(summary);
        };

        // Unlike the create path, access violations and conflicts are
        // evaluated together and reported in one combined outcome
        let violations = self.access.can_write(actor, &existing).await;
        if !violations.is_empty() || !conflicts.is_empty() {
            summary.status = ImportStatus::Error;
            summary.import_count.ignored += 1;
            if !violations.is_empty() {
                summary.description = Some(violations.join(", "));
            }
            summary.conflicts = conflicts;
            return Ok(summary);
        }

        let Some(rebuilt) = build_stored(record, caches) else {
            summary.status = ImportStatus::Error;
            summary.description = Some("Relationship could not be constructed".to_string());
            summary.import_count.ignored += 1;
            return Ok(summary);
        };

        existing.relationship_type = rebuilt.relationship_type;
        existing.from = rebuilt.from;
        existing.to = rebuilt.to;
        existing.updated_at = Utc::now();

        self.store.update_relationship(&existing).await?;
        debug!(relationship = %existing.id, "updated relationship");

        summary.reference = Some(existing.id);
        summary.import_count.updated += 1;
        Ok(summary)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delete
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete relationships
    ///
    /// Deletions are independent, so there is no chunk-level cache
    /// population; chunk resources are still released every
    /// [`FLUSH_FREQUENCY`] deletions.
    pub async fn delete_many(
        &self,
        records: Vec<RelationshipRecord>,
        options: ImportOptions,
    ) -> Result<ImportSummaries> {
        let options = self.fill_actor(options).await?;
        let actor = self.actor_of(&options).await?;
        let mut summaries = ImportSummaries::new();
        let mut counter = 0usize;

        for record in &records {
            let id = record
                .relationship
                .clone()
                .unwrap_or_else(|| RelationshipId::new(""));
            summaries.push(self.delete_record(&id, &actor).await?);

            if counter % FLUSH_FREQUENCY == 0 {
                self.store.release_chunk_resources().await?;
            }
            counter += 1;
        }

        Ok(summaries)
    }

    /// Delete a single relationship by identifier
    pub async fn delete_one(
        &self,
        id: &RelationshipId,
        options: ImportOptions,
    ) -> Result<ImportSummary> {
        let options = self.fill_actor(options).await?;
        let actor = self.actor_of(&options).await?;
        self.delete_record(id, &actor).await
    }

    async fn delete_record(&self, id: &RelationshipId, actor: &Actor) -> Result<ImportSummary> {
        if id.is_empty() {
            return Ok(
                ImportSummary::warning("Missing required property 'relationship'").ignored(),
            );
        }

        let Some(existing) = self.store.get_relationship(id).await? else {
            return Ok(ImportSummary::warning(format!(
                "Relationship {} cannot be deleted as it is not present in the system",
                id
            ))
            .ignored());
        };

        let violations = self.access.can_write(actor, &existing).await;
        if !violations.is_empty() {
            return Ok(ImportSummary::error(violations.join(", "))
                .with_reference(id.clone())
                .ignored());
        }

        self.store.delete_relationship(&existing).await?;
        debug!(relationship = %id, "deleted relationship");

        Ok(ImportSummary {
            status: ImportStatus::Success,
            description: Some(format!("Deletion of relationship {} was successful", id)),
            ..ImportSummary::of(Some(id.clone()))
        }
        .deleted())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// Get one relationship as a record, enforcing read access
    pub async fn get_by_id(&self, id: &RelationshipId) -> Result<Option<RelationshipRecord>> {
        let Some(stored) = self.store.get_relationship(id).await? else {
            return Ok(None);
        };

        let actor = self.actors.current_actor().await?;
        let violations = self.access.can_read(&actor, &stored).await;
        if !violations.is_empty() {
            return Err(burdock_core::Error::AccessDenied(violations.join(", ")));
        }

        Ok(Some(stored.to_record()))
    }

    /// Get all relationships touching one endpoint
    pub async fn get_by_endpoint(
        &self,
        endpoint: &EndpointRef,
        skip_access_check: bool,
    ) -> Result<Vec<RelationshipRecord>> {
        let actor = self.actors.current_actor().await?;
        let mut records = Vec::new();

        for stored in self.store.get_relationships_for_endpoint(endpoint).await? {
            if !skip_access_check {
                let violations = self.access.can_read(&actor, &stored).await;
                if !violations.is_empty() {
                    return Err(burdock_core::Error::AccessDenied(violations.join(", ")));
                }
            }
            records.push(stored.to_record());
        }

        Ok(records)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn fill_actor(&self, mut options: ImportOptions) -> Result<ImportOptions> {
        if options.actor.is_none() {
            options.actor = Some(self.actors.current_actor().await?);
        }
        Ok(options)
    }

    async fn actor_of(&self, options: &ImportOptions) -> Result<Actor> {
        match &options.actor {
            Some(actor) => Ok(actor.clone()),
            None => Ok(self.actors.current_actor().await?),
        }
    }
}

/// Build the persisted form of a validated record from the chunk caches
///
/// Endpoints are resolved through the kind each constraint declares,
/// mirroring how the resolver grouped them. Returns `None` only if a cache
/// entry the validator saw is gone, which a caller reports as an error
/// outcome.
fn build_stored(record: &RelationshipRecord, caches: &BatchCaches) -> Option<StoredRelationship> {
    let relationship_type = caches.relationship_type(&record.relationship_type)?.clone();

    let from = build_endpoint(&relationship_type.from_constraint, record.from.as_ref()?, caches)?;
    let to = build_endpoint(&relationship_type.to_constraint, record.to.as_ref()?, caches)?;

    let now = Utc::now();
    Some(StoredRelationship {
        id: record
            .relationship
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(RelationshipId::generate),
        relationship_type,
        from,
        to,
        created_at: record.created.unwrap_or(now),
        updated_at: now,
    })
}

fn build_endpoint(
    constraint: &Constraint,
    endpoint: &EndpointRef,
    caches: &BatchCaches,
) -> Option<StoredEndpoint> {
    let uid = endpoint.uid();
    match constraint.kind() {
        EntityKind::TrackedEntity => caches
            .tracked_entity(uid)
            .cloned()
            .map(StoredEndpoint::TrackedEntity),
        EntityKind::Enrollment => caches
            .enrollment(uid)
            .cloned()
            .map(StoredEndpoint::Enrollment),
        EntityKind::Event => caches.event(uid).cloned().map(StoredEndpoint::Event),
    }
}
