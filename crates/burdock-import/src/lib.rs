//! Burdock Import - batch relationship import engine
//!
//! Validates caller-supplied relationship records against their relationship
//! type schema and the existence of their endpoints, partitions them into
//! create/update/delete work, and flushes them through the storage
//! collaborator in bounded chunks. Every failure is isolated to its record's
//! outcome; the batch always runs to completion.

pub mod cache;
pub mod reconciler;
pub mod resolver;
pub mod service;
pub mod validator;

pub use cache::BatchCaches;
pub use reconciler::{partition, PartitionedBatch};
pub use resolver::prepare_caches;
pub use service::{RelationshipImportService, FLUSH_FREQUENCY};
pub use validator::check_relationship;
