// SQLite Task Graph (TaskMetadataStore)

use crate::error::write_error;
use activation_core::domain::{Metadata, MetadataValue, PayloadRef, Task};
use activation_core::port::{TaskMetadataStore, TimeProvider, WriteError};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteTaskStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Register a workflow instance for a payload
    pub async fn insert_workflow(
        &self,
        workflow_id: &str,
        payload: &PayloadRef,
    ) -> Result<(), WriteError> {
        sqlx::query("INSERT INTO workflows (id, payload_path, created_at) VALUES (?, ?, ?)")
            .bind(workflow_id)
            .bind(payload.as_str())
            .bind(self.time_provider.now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    /// Remove a workflow and its metadata (its tasks stay behind)
    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<u64, WriteError> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(workflow_id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(result.rows_affected())
    }

    pub async fn insert_task(&self, task: &Task) -> Result<(), WriteError> {
        sqlx::query("INSERT INTO tasks (id, workflow_id, payload_path, created_at) VALUES (?, ?, ?, ?)")
            .bind(&task.id)
            .bind(&task.workflow_id)
            .bind(task.payload.as_str())
            .bind(self.time_provider.now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    pub async fn find_task(&self, task_id: &str) -> Result<Option<Task>, WriteError> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, workflow_id, payload_path FROM tasks WHERE id = ?",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        row.map(TaskRow::into_task).transpose()
    }

    /// Full metadata map reachable from the task
    pub async fn metadata_of(&self, task_id: &str) -> Result<Metadata, WriteError> {
        let workflow_id = self.resolve_workflow(task_id).await?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM workflow_metadata WHERE workflow_id = ? ORDER BY key",
        )
        .bind(&workflow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(write_error)?;

        rows.into_iter()
            .map(|(key, raw)| decode_value(&key, &raw).map(|value| (key, value)))
            .collect()
    }

    /// Walk task -> workflow -> workflow data, typing each broken link
    async fn resolve_workflow(&self, task_id: &str) -> Result<String, WriteError> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT t.workflow_id, w.id
            FROM tasks t
            LEFT JOIN workflows w ON w.id = t.workflow_id
            WHERE t.id = ?
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        match row {
            None => Err(WriteError::TaskNotFound(task_id.to_string())),
            Some((None, _)) => Err(WriteError::Unreachable {
                task_id: task_id.to_string(),
                link: "workflow",
            }),
            Some((Some(_), None)) => Err(WriteError::Unreachable {
                task_id: task_id.to_string(),
                link: "workflow data",
            }),
            Some((Some(workflow_id), Some(_))) => Ok(workflow_id),
        }
    }
}

#[async_trait]
impl TaskMetadataStore for SqliteTaskStore {
    async fn set_attribute(
        &self,
        task_id: &str,
        key: &str,
        value: MetadataValue,
    ) -> Result<(), WriteError> {
        let workflow_id = self.resolve_workflow(task_id).await?;
        let encoded = serde_json::to_string(&value)
            .map_err(|e| WriteError::Access(format!("Cannot encode metadata {}: {}", key, e)))?;

        sqlx::query(
            r#"
            INSERT INTO workflow_metadata (workflow_id, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(workflow_id, key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(&workflow_id)
        .bind(key)
        .bind(&encoded)
        .bind(self.time_provider.now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        debug!(task_id = %task_id, workflow_id = %workflow_id, key = %key, "Metadata stored");
        Ok(())
    }

    async fn get_attribute(
        &self,
        task_id: &str,
        key: &str,
    ) -> Result<Option<MetadataValue>, WriteError> {
        let workflow_id = self.resolve_workflow(task_id).await?;

        let raw: Option<String> = sqlx::query_scalar(
            "SELECT value FROM workflow_metadata WHERE workflow_id = ? AND key = ?",
        )
        .bind(&workflow_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;

        raw.map(|raw| decode_value(key, &raw)).transpose()
    }
}

fn decode_value(key: &str, raw: &str) -> Result<MetadataValue, WriteError> {
    serde_json::from_str(raw)
        .map_err(|e| WriteError::Access(format!("Corrupt metadata {}: {}", key, e)))
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: String,
    workflow_id: Option<String>,
    payload_path: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, WriteError> {
        let corrupt = |e: activation_core::domain::DomainError| {
            WriteError::Access(format!("Corrupt task row: {}", e))
        };

        let payload = PayloadRef::new(self.payload_path).map_err(corrupt)?;
        let mut task = Task::new(self.id, payload).map_err(corrupt)?;
        task.workflow_id = self.workflow_id;
        Ok(task)
    }
}
