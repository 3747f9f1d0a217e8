// Coordinator states and outcomes

use crate::domain::{MetadataValue, TaskId};
use crate::error::{CoordinationError, Result};

/// Linear stages of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    ResolvePayload,
    ResolveTimeout,
    WriteMetadata,
    Done,
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationState::ResolvePayload => write!(f, "RESOLVE_PAYLOAD"),
            ActivationState::ResolveTimeout => write!(f, "RESOLVE_TIMEOUT"),
            ActivationState::WriteMetadata => write!(f, "WRITE_METADATA"),
            ActivationState::Done => write!(f, "DONE"),
        }
    }
}

/// Where the written activation value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSource {
    /// The payload carried a scheduled date
    Scheduled,
    /// No scheduled date; activation is immediate
    Immediate,
}

/// Why an invocation ended without writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ContentNodeMissing { path: String },
}

/// Result of a completed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Written {
        task_id: TaskId,
        key: String,
        value: MetadataValue,
        source: ActivationSource,
    },
    Skipped { task_id: TaskId, reason: SkipReason },
}

impl ActivationOutcome {
    /// Final state reached by the invocation
    pub fn state(&self) -> ActivationState {
        match self {
            ActivationOutcome::Written { .. } => ActivationState::Done,
            ActivationOutcome::Skipped { .. } => ActivationState::ResolvePayload,
        }
    }

    pub fn task_id(&self) -> &str {
        match self {
            ActivationOutcome::Written { task_id, .. } => task_id,
            ActivationOutcome::Skipped { task_id, .. } => task_id,
        }
    }

    pub fn written_value(&self) -> Option<&MetadataValue> {
        match self {
            ActivationOutcome::Written { value, .. } => Some(value),
            ActivationOutcome::Skipped { .. } => None,
        }
    }
}

/// Outcomes of a batch run, up to and including its first failure
#[derive(Debug)]
pub struct BatchReport {
    /// Outcomes of the tasks that ran to completion, in input order
    pub completed: Vec<ActivationOutcome>,
    /// Task that stopped the batch, with its error
    pub failure: Option<(TaskId, CoordinationError)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Completed outcomes, or the error that stopped the batch
    pub fn into_result(self) -> Result<Vec<ActivationOutcome>> {
        match self.failure {
            Some((_, error)) => Err(error),
            None => Ok(self.completed),
        }
    }
}
