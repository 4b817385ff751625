//! Acting user snapshot

use serde::{Deserialize, Serialize};

/// Snapshot of the user a batch is processed on behalf of
///
/// The snapshot is refreshed at each chunk boundary so long-running batches
/// see permission changes made while they run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable user identifier
    pub id: String,

    /// Login name, used in access violation messages
    pub username: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
