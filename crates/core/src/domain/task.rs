// Task Domain Model

use super::error::{DomainError, Result};
use super::payload::PayloadRef;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Absolute, timezone-aware point in time
pub type Instant = DateTime<FixedOffset>;

/// Task instance identifier (assigned by the host)
pub type TaskId = String;

/// Workflow instance identifier (the task's owning workflow)
pub type WorkflowId = String;

/// A pending workflow task as seen by one activation invocation.
///
/// Tasks are created and destroyed by the host. The coordinator only reads
/// the id and payload reference; metadata lives behind the
/// [`TaskMetadataStore`](crate::port::TaskMetadataStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub workflow_id: Option<WorkflowId>,
    pub payload: PayloadRef,
}

impl Task {
    /// Create a task bound to a payload
    ///
    /// # Errors
    /// - `DomainError::InvalidTaskId` if `id` is blank
    pub fn new(id: impl Into<String>, payload: PayloadRef) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTaskId(id));
        }

        Ok(Self {
            id,
            workflow_id: None,
            payload,
        })
    }

    /// Attach the owning workflow instance
    pub fn with_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.workflow_id {
            Some(wf) => write!(f, "task {} (workflow {}, payload {})", self.id, wf, self.payload),
            None => write!(f, "task {} (payload {})", self.id, self.payload),
        }
    }
}
