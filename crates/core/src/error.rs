// Central Error Type for the Application

use crate::application::ActivationState;
use crate::port::{ReadError, WriteError};
use thiserror::Error;

/// Failure of one activation invocation, surfaced to the host
///
/// A missing content node is not an error: the coordinator reports it as a
/// skipped outcome instead.
#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error("Failed to read payload {payload}: {source}")]
    Read {
        payload: String,
        #[source]
        source: ReadError,
    },

    #[error("Property {property} on {path} is not a date: {reason}")]
    InvalidProperty {
        path: String,
        property: String,
        reason: String,
    },

    #[error("Failed to write metadata for task {task_id}: {source}")]
    Write {
        task_id: String,
        #[source]
        source: WriteError,
    },
}

impl CoordinationError {
    /// Whether the failure came from the metadata store
    pub fn is_write_failure(&self) -> bool {
        matches!(self, CoordinationError::Write { .. })
    }

    /// Stage the invocation was in when it failed
    pub fn failed_at(&self) -> ActivationState {
        match self {
            CoordinationError::Read { .. } => ActivationState::ResolvePayload,
            CoordinationError::InvalidProperty { .. } => ActivationState::ResolveTimeout,
            CoordinationError::Write { .. } => ActivationState::WriteMetadata,
        }
    }
}

/// Result type alias using CoordinationError
pub type Result<T> = std::result::Result<T, CoordinationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_at_names_the_stage() {
        let read = CoordinationError::Read {
            payload: "/content/page".to_string(),
            source: ReadError::Access("locked".to_string()),
        };
        let invalid = CoordinationError::InvalidProperty {
            path: "/content/page/jcr:content".to_string(),
            property: "scheduledPublishDate".to_string(),
            reason: "boolean".to_string(),
        };
        let write = CoordinationError::Write {
            task_id: "t1".to_string(),
            source: WriteError::TaskNotFound("t1".to_string()),
        };

        assert_eq!(read.failed_at(), ActivationState::ResolvePayload);
        assert_eq!(invalid.failed_at(), ActivationState::ResolveTimeout);
        assert_eq!(write.failed_at(), ActivationState::WriteMetadata);
        assert_eq!(write.failed_at().to_string(), "WRITE_METADATA");
        assert!(write.is_write_failure());
        assert!(!read.is_write_failure());
    }
}
