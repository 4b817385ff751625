//! Batch reconciliation
//!
//! Splits an input batch into create/update/delete lists according to the
//! import strategy, querying storage for existence only in the mixed modes.

use burdock_core::{ImportStrategy, RelationshipRecord};
use burdock_storage::{RelationshipStore, StorageResult};

/// An input batch split into create/update/delete work
#[derive(Debug, Clone, Default)]
pub struct PartitionedBatch {
    pub create: Vec<RelationshipRecord>,
    pub update: Vec<RelationshipRecord>,
    pub delete: Vec<RelationshipRecord>,
}

impl PartitionedBatch {
    /// Total records across all three lists
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition records by strategy
///
/// In the mixed modes, a record without an identifier (or with a blank one)
/// is created; otherwise storage decides between create and update.
pub async fn partition(
    records: Vec<RelationshipRecord>,
    strategy: ImportStrategy,
    store: &dyn RelationshipStore,
) -> StorageResult<PartitionedBatch> {
    let mut batch = PartitionedBatch::default();

    // TODO: Sync should also delete stored relationships absent from the
    // payload; that pass is not implemented yet.
    match strategy {
        ImportStrategy::Create => batch.create = records,
        ImportStrategy::Update => batch.update = records,
        ImportStrategy::Delete => batch.delete = records,
        ImportStrategy::CreateAndUpdate | ImportStrategy::Sync => {
            for record in records {
                match &record.relationship {
                    Some(id) if !id.is_empty() => {
                        if store.relationship_exists(id).await? {
                            batch.update.push(record);
                        } else {
                            batch.create.push(record);
                        }
                    }
                    _ => batch.create.push(record),
                }
            }
        }
    }

    Ok(batch)
}
