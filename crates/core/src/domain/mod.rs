// Domain Layer - Pure entities and value types

pub mod error;
pub mod metadata;
pub mod payload;
pub mod task;

// Re-exports
pub use error::DomainError;
pub use metadata::{Metadata, MetadataValue};
pub use payload::{PayloadRef, PropertyValue, DEFAULT_CONTENT_NODE};
pub use task::{Instant, Task, TaskId, WorkflowId};
