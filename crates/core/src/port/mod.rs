// Port Layer - Interfaces for external dependencies

pub mod payload_reader;
pub mod task_metadata_store;
pub mod time_provider;

// Re-exports
pub use payload_reader::{PayloadReader, ReadError};
pub use task_metadata_store::{TaskMetadataStore, WriteError};
pub use time_provider::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
