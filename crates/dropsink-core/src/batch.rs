//! Batch fan-in: aggregate per-item outcomes into one verdict.

use crate::error::{MessageCode, SaveError};
use crate::persist::SaveOutcome;

/// Request-level result delivered to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub outcome: SaveOutcome,
    pub message: Option<MessageCode>,
    /// Content type observed for a URL payload, carried for diagnostics.
    pub content_type: Option<String>,
}

impl BatchOutcome {
    pub fn from_outcome(outcome: SaveOutcome) -> Self {
        Self {
            outcome,
            message: None,
            content_type: None,
        }
    }

    pub fn failed(message: Option<MessageCode>) -> Self {
        Self {
            outcome: SaveOutcome::Failed,
            message,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn unsupported() -> Self {
        Self::failed(Some(MessageCode::Unsupported))
    }

    pub fn from_error(err: &SaveError) -> Self {
        Self::failed(err.message_code())
    }

    /// True when some classification branch recognized the request.
    pub fn supported(&self) -> bool {
        self.message != Some(MessageCode::Unsupported)
    }
}

/// Folds item outcomes into one verdict once all items have reported.
///
/// A single `Failed` fails the batch. `Pending` counts as non-failing but
/// keeps the aggregate at `Pending` when nothing failed, so the caller
/// knows completion was not confirmed. An empty batch saved nothing and is
/// `Failed`.
pub fn aggregate(outcomes: &[SaveOutcome]) -> SaveOutcome {
    if outcomes.is_empty() || outcomes.contains(&SaveOutcome::Failed) {
        return SaveOutcome::Failed;
    }
    if outcomes.contains(&SaveOutcome::Pending) {
        return SaveOutcome::Pending;
    }
    SaveOutcome::Succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use SaveOutcome::{Failed, Pending, Succeeded};

    #[test]
    fn all_succeeded() {
        assert_eq!(aggregate(&[Succeeded, Succeeded, Succeeded]), Succeeded);
    }

    #[test]
    fn one_failure_fails_the_batch() {
        assert_eq!(aggregate(&[Succeeded, Failed, Succeeded]), Failed);
    }

    #[test]
    fn pending_is_not_a_failure() {
        assert_eq!(aggregate(&[Succeeded, Pending]), Pending);
        assert_eq!(aggregate(&[Pending, Failed]), Failed);
    }

    #[test]
    fn empty_batch_fails() {
        assert_eq!(aggregate(&[]), Failed);
    }

    #[test]
    fn unsupported_flag() {
        assert!(!BatchOutcome::unsupported().supported());
        assert!(BatchOutcome::from_outcome(Succeeded).supported());
        assert!(BatchOutcome::failed(None).supported());
    }
}
