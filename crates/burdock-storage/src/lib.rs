//! Burdock Storage - collaborator traits and reference backend
//!
//! Defines the storage, access-control, and actor-resolution interfaces the
//! import engine depends on, plus an in-memory implementation used by tests
//! and as a reference backend.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::{AllowAllAccess, MemoryStore, StaticActorResolver};
pub use traits::{AccessControl, ActorResolver, RelationshipStore};
