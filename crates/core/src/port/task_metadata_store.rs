// Task Metadata Store Port
// Owns the task -> workflow -> workflow data traversal on the host side

use crate::domain::MetadataValue;
use async_trait::async_trait;
use thiserror::Error;

/// Task metadata errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A link of the task graph is missing (e.g. the task has no workflow)
    #[error("Task {task_id} has no {link}")]
    Unreachable { task_id: String, link: &'static str },

    #[error("Metadata storage failed: {0}")]
    Access(String),
}

/// Task Metadata Store trait
///
/// Writes are visible to the host scheduler as soon as `set_attribute` returns.
#[async_trait]
pub trait TaskMetadataStore: Send + Sync {
    /// Set one metadata attribute for the task, replacing any previous value
    ///
    /// # Errors
    /// - WriteError::TaskNotFound if the task is unknown
    /// - WriteError::Unreachable if the task graph cannot be traversed
    /// - WriteError::Access on storage failure
    async fn set_attribute(
        &self,
        task_id: &str,
        key: &str,
        value: MetadataValue,
    ) -> Result<(), WriteError>;

    /// Read one metadata attribute for the task
    async fn get_attribute(
        &self,
        task_id: &str,
        key: &str,
    ) -> Result<Option<MetadataValue>, WriteError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Metadata, Task};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Graph {
        tasks: HashMap<String, Option<String>>,
        workflows: HashMap<String, Metadata>,
    }

    /// In-memory task graph: tasks point at workflows, workflows own metadata
    #[derive(Clone, Default)]
    pub struct InMemoryTaskStore {
        graph: Arc<Mutex<Graph>>,
        write_count: Arc<Mutex<usize>>,
    }

    impl InMemoryTaskStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a task and, if it names one, its workflow
        pub fn register(&self, task: &Task) {
            let mut graph = self.graph.lock().unwrap();
            if let Some(wf) = &task.workflow_id {
                graph.workflows.entry(wf.clone()).or_default();
            }
            graph.tasks.insert(task.id.clone(), task.workflow_id.clone());
        }

        /// Drop a workflow while leaving its tasks in place
        pub fn remove_workflow(&self, workflow_id: &str) {
            self.graph.lock().unwrap().workflows.remove(workflow_id);
        }

        /// Snapshot of the metadata reachable from the task
        pub fn metadata_of(&self, task_id: &str) -> Option<Metadata> {
            let graph = self.graph.lock().unwrap();
            let wf = graph.tasks.get(task_id)?.as_ref()?;
            graph.workflows.get(wf).cloned()
        }

        pub fn write_count(&self) -> usize {
            *self.write_count.lock().unwrap()
        }

        fn workflow_of(graph: &Graph, task_id: &str) -> Result<String, WriteError> {
            let wf = graph
                .tasks
                .get(task_id)
                .ok_or_else(|| WriteError::TaskNotFound(task_id.to_string()))?
                .clone()
                .ok_or(WriteError::Unreachable {
                    task_id: task_id.to_string(),
                    link: "workflow",
                })?;

            if !graph.workflows.contains_key(&wf) {
                return Err(WriteError::Unreachable {
                    task_id: task_id.to_string(),
                    link: "workflow data",
                });
            }
            Ok(wf)
        }
    }

    #[async_trait]
    impl TaskMetadataStore for InMemoryTaskStore {
        async fn set_attribute(
            &self,
            task_id: &str,
            key: &str,
            value: MetadataValue,
        ) -> Result<(), WriteError> {
            let mut graph = self.graph.lock().unwrap();
            let wf = Self::workflow_of(&graph, task_id)?;

            if let Some(metadata) = graph.workflows.get_mut(&wf) {
                metadata.insert(key.to_string(), value);
            }
            *self.write_count.lock().unwrap() += 1;
            Ok(())
        }

        async fn get_attribute(
            &self,
            task_id: &str,
            key: &str,
        ) -> Result<Option<MetadataValue>, WriteError> {
            let graph = self.graph.lock().unwrap();
            let wf = Self::workflow_of(&graph, task_id)?;
            Ok(graph.workflows.get(&wf).and_then(|m| m.get(key).cloned()))
        }
    }

    /// Store that rejects every call with a storage failure
    pub struct FailingTaskStore {
        message: String,
    }

    impl FailingTaskStore {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }
    }

    #[async_trait]
    impl TaskMetadataStore for FailingTaskStore {
        async fn set_attribute(
            &self,
            _task_id: &str,
            _key: &str,
            _value: MetadataValue,
        ) -> Result<(), WriteError> {
            Err(WriteError::Access(self.message.clone()))
        }

        async fn get_attribute(
            &self,
            _task_id: &str,
            _key: &str,
        ) -> Result<Option<MetadataValue>, WriteError> {
            Err(WriteError::Access(self.message.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryTaskStore;
    use super::*;
    use crate::domain::{PayloadRef, Task};

    fn task(id: &str) -> Task {
        Task::new(id, PayloadRef::new("/content/page").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_write_reaches_workflow_metadata() {
        let store = InMemoryTaskStore::new();
        store.register(&task("t1").with_workflow("wf1"));

        store
            .set_attribute("t1", "note", MetadataValue::Text("hello".to_string()))
            .await
            .unwrap();

        let value = store.get_attribute("t1", "note").await.unwrap();
        assert_eq!(value, Some(MetadataValue::Text("hello".to_string())));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_broken_chain_is_typed() {
        let store = InMemoryTaskStore::new();
        store.register(&task("orphan"));
        store.register(&task("t2").with_workflow("gone"));
        store.remove_workflow("gone");

        let err = store
            .set_attribute("orphan", "k", MetadataValue::Duration { millis: 0 })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WriteError::Unreachable {
                task_id: "orphan".to_string(),
                link: "workflow"
            }
        );

        let err = store
            .set_attribute("t2", "k", MetadataValue::Duration { millis: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Unreachable { link: "workflow data", .. }));

        let err = store.get_attribute("missing", "k").await.unwrap_err();
        assert_eq!(err, WriteError::TaskNotFound("missing".to_string()));
        assert_eq!(store.write_count(), 0);
    }
}
