// Deferred Activation Infrastructure - SQLite Adapter
// Implements: PayloadReader (content repository), TaskMetadataStore (task graph)

mod connection;
mod content_repository;
mod error;
mod migration;
mod task_store;

pub use connection::create_pool;
pub use content_repository::SqliteContentRepository;
pub use migration::run_migrations;
pub use task_store::SqliteTaskStore;

// Note: sqlx::Error is mapped to the port error types in `error`
// (orphan rules prevent From<sqlx::Error> impls on core types here)
