// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("Invalid payload path: {0:?}")]
    InvalidPayloadPath(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
