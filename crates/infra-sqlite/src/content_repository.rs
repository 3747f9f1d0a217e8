// SQLite Content Repository (PayloadReader)

use crate::error::{read_error, write_error};
use activation_core::domain::{PayloadRef, PropertyValue, DEFAULT_CONTENT_NODE};
use activation_core::port::{PayloadReader, ReadError, TimeProvider, WriteError};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteContentRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
    content_node: String,
}

impl SqliteContentRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::with_content_node(pool, time_provider, DEFAULT_CONTENT_NODE)
    }

    pub fn with_content_node(
        pool: SqlitePool,
        time_provider: Arc<dyn TimeProvider>,
        content_node: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            time_provider,
            content_node: content_node.into(),
        }
    }

    /// Create the payload's content node (no-op if it exists)
    pub async fn create_node(&self, payload: &PayloadRef) -> Result<(), WriteError> {
        let path = payload.content_path(&self.content_node);
        let now = self.time_provider.now().timestamp_millis();

        sqlx::query("INSERT INTO nodes (path, created_at) VALUES (?, ?) ON CONFLICT(path) DO NOTHING")
            .bind(&path)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    /// Set a property on the payload's content node, creating the node if needed
    pub async fn set_property(
        &self,
        payload: &PayloadRef,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), WriteError> {
        let path = payload.content_path(&self.content_node);
        let encoded = serde_json::to_string(value)
            .map_err(|e| WriteError::Access(format!("Cannot encode property {}: {}", name, e)))?;

        let mut tx = self.pool.begin().await.map_err(write_error)?;

        sqlx::query("INSERT INTO nodes (path, created_at) VALUES (?, ?) ON CONFLICT(path) DO NOTHING")
            .bind(&path)
            .bind(self.time_provider.now().timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        sqlx::query(
            r#"
            INSERT INTO node_properties (node_path, name, value) VALUES (?, ?, ?)
            ON CONFLICT(node_path, name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(&path)
        .bind(name)
        .bind(&encoded)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        tx.commit().await.map_err(write_error)?;

        debug!(path = %path, property = %name, "Property stored");
        Ok(())
    }

    /// Delete the payload's content node and its properties
    pub async fn delete_node(&self, payload: &PayloadRef) -> Result<u64, WriteError> {
        let path = payload.content_path(&self.content_node);
        let result = sqlx::query("DELETE FROM nodes WHERE path = ?")
            .bind(&path)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PayloadReader for SqliteContentRepository {
    async fn read_property(
        &self,
        payload: &PayloadRef,
        property: &str,
    ) -> Result<Option<PropertyValue>, ReadError> {
        let path = self.content_path(payload);

        // One query distinguishes "no node" (no row) from "no property" (NULL value)
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT n.path, p.value
            FROM nodes n
            LEFT JOIN node_properties p ON p.node_path = n.path AND p.name = ?
            WHERE n.path = ?
            "#,
        )
        .bind(property)
        .bind(&path)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?;

        let Some((_, raw)) = row else {
            return Err(ReadError::NodeNotFound(path));
        };

        raw.map(|raw| {
            serde_json::from_str::<PropertyValue>(&raw).map_err(|e| ReadError::InvalidValue {
                property: property.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }

    async fn node_exists(&self, payload: &PayloadRef) -> Result<bool, ReadError> {
        let path = self.content_path(payload);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nodes WHERE path = ?")
            .bind(&path)
            .fetch_one(&self.pool)
            .await
            .map_err(read_error)?;

        Ok(count > 0)
    }

    fn content_path(&self, payload: &PayloadRef) -> String {
        payload.content_path(&self.content_node)
    }
}
