//! Per-call import options

use crate::actor::Actor;
use serde::{Deserialize, Serialize};

/// How an input batch is mapped onto create/update/delete work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    /// Every record is created
    Create,

    /// Every record is updated
    Update,

    /// Every record is deleted
    Delete,

    /// Records with an identifier known to storage are updated, the rest
    /// are created
    #[default]
    CreateAndUpdate,

    /// Same split as [`CreateAndUpdate`](Self::CreateAndUpdate); removal of
    /// stored relationships absent from the payload is not performed
    Sync,
}

/// How much of the outcome is reported back to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportMode {
    /// One outcome per record
    #[default]
    Full,

    /// Only outcomes carrying conflicts
    ErrorsOnly,
}

/// Options applying to one import call
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Batch partitioning strategy
    pub strategy: ImportStrategy,

    /// Outcome filtering
    pub report_mode: ReportMode,

    /// Acting user override; resolved from the actor collaborator when absent
    pub actor: Option<Actor>,
}

impl ImportOptions {
    pub fn new(strategy: ImportStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_report_mode(mut self, report_mode: ReportMode) -> Self {
        self.report_mode = report_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_create_and_update() {
        let options = ImportOptions::default();
        assert_eq!(options.strategy, ImportStrategy::CreateAndUpdate);
        assert_eq!(options.report_mode, ReportMode::Full);
        assert!(options.actor.is_none());
    }

    #[test]
    fn test_builder() {
        let options = ImportOptions::new(ImportStrategy::Delete)
            .with_report_mode(ReportMode::ErrorsOnly)
            .with_actor(Actor::new("u1", "alice"));
        assert_eq!(options.strategy, ImportStrategy::Delete);
        assert_eq!(options.report_mode, ReportMode::ErrorsOnly);
        assert_eq!(options.actor.unwrap().username, "alice");
    }
}
