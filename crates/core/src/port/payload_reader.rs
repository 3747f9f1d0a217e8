// Payload Reader Port
// Resolves a task payload to the property bag on its content node

use crate::domain::{PayloadRef, PropertyValue};
use async_trait::async_trait;
use thiserror::Error;

/// Content repository read errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The payload or its content node does not exist (recoverable)
    #[error("Content node not found: {0}")]
    NodeNotFound(String),

    /// Stored property cannot be interpreted
    #[error("Invalid value for property {property}: {reason}")]
    InvalidValue { property: String, reason: String },

    /// Repository unreachable or failed mid-read
    #[error("Repository access failed: {0}")]
    Access(String),
}

impl ReadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NodeNotFound(_))
    }
}

/// Payload Reader trait
///
/// Implementations:
/// - SqliteContentRepository: nodes and properties in SQLite
/// - mocks::InMemoryContentRepository: tests and embedded hosts
#[async_trait]
pub trait PayloadReader: Send + Sync {
    /// Read one property from the payload's content node
    ///
    /// Returns `Ok(None)` when the node exists but has no such property.
    ///
    /// # Errors
    /// - ReadError::NodeNotFound if the content node is missing
    /// - ReadError::Access if the repository cannot be queried
    async fn read_property(
        &self,
        payload: &PayloadRef,
        property: &str,
    ) -> Result<Option<PropertyValue>, ReadError>;

    /// Check whether the payload's content node exists
    async fn node_exists(&self, payload: &PayloadRef) -> Result<bool, ReadError>;

    /// Path of the content node this reader resolves `payload` to
    fn content_path(&self, payload: &PayloadRef) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::DEFAULT_CONTENT_NODE;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type PropertyBag = HashMap<String, PropertyValue>;

    /// In-memory content repository keyed by content node path
    #[derive(Clone)]
    pub struct InMemoryContentRepository {
        content_node: String,
        nodes: Arc<Mutex<HashMap<String, PropertyBag>>>,
        read_count: Arc<Mutex<usize>>,
    }

    impl InMemoryContentRepository {
        pub fn new() -> Self {
            Self::with_content_node(DEFAULT_CONTENT_NODE)
        }

        pub fn with_content_node(content_node: impl Into<String>) -> Self {
            Self {
                content_node: content_node.into(),
                nodes: Arc::new(Mutex::new(HashMap::new())),
                read_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Create the payload's content node with no properties
        pub fn create_node(&self, payload: &PayloadRef) {
            let path = payload.content_path(&self.content_node);
            self.nodes.lock().unwrap().entry(path).or_default();
        }

        /// Set a property, creating the content node if needed
        pub fn set_property(&self, payload: &PayloadRef, name: &str, value: PropertyValue) {
            let path = payload.content_path(&self.content_node);
            self.nodes
                .lock()
                .unwrap()
                .entry(path)
                .or_default()
                .insert(name.to_string(), value);
        }

        pub fn read_count(&self) -> usize {
            *self.read_count.lock().unwrap()
        }
    }

    impl Default for InMemoryContentRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PayloadReader for InMemoryContentRepository {
        async fn read_property(
            &self,
            payload: &PayloadRef,
            property: &str,
        ) -> Result<Option<PropertyValue>, ReadError> {
            *self.read_count.lock().unwrap() += 1;

            let path = payload.content_path(&self.content_node);
            let nodes = self.nodes.lock().unwrap();
            let bag = nodes.get(&path).ok_or(ReadError::NodeNotFound(path.clone()))?;
            Ok(bag.get(property).cloned())
        }

        async fn node_exists(&self, payload: &PayloadRef) -> Result<bool, ReadError> {
            let path = payload.content_path(&self.content_node);
            Ok(self.nodes.lock().unwrap().contains_key(&path))
        }

        fn content_path(&self, payload: &PayloadRef) -> String {
            payload.content_path(&self.content_node)
        }
    }

    /// Reader whose repository is always unreachable
    pub struct UnreachableContentRepository {
        message: String,
    }

    impl UnreachableContentRepository {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }
    }

    #[async_trait]
    impl PayloadReader for UnreachableContentRepository {
        async fn read_property(
            &self,
            _payload: &PayloadRef,
            _property: &str,
        ) -> Result<Option<PropertyValue>, ReadError> {
            Err(ReadError::Access(self.message.clone()))
        }

        async fn node_exists(&self, _payload: &PayloadRef) -> Result<bool, ReadError> {
            Err(ReadError::Access(self.message.clone()))
        }

        fn content_path(&self, payload: &PayloadRef) -> String {
            payload.content_path(DEFAULT_CONTENT_NODE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryContentRepository;
    use super::*;

    #[test]
    fn test_missing_node_vs_missing_property() {
        let repo = InMemoryContentRepository::new();
        let page = PayloadRef::new("/content/page").unwrap();

        let err = tokio_test::block_on(repo.read_property(&page, "title")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err, ReadError::NodeNotFound("/content/page/jcr:content".to_string()));

        repo.create_node(&page);
        let value = tokio_test::block_on(repo.read_property(&page, "title")).unwrap();
        assert!(value.is_none());
        assert!(tokio_test::block_on(repo.node_exists(&page)).unwrap());
    }

    #[tokio::test]
    async fn test_property_round_trip() {
        let repo = InMemoryContentRepository::with_content_node("body");
        let page = PayloadRef::new("/content/page").unwrap();
        repo.set_property(&page, "title", PropertyValue::String("Home".to_string()));

        let value = repo.read_property(&page, "title").await.unwrap();
        assert_eq!(value, Some(PropertyValue::String("Home".to_string())));
        assert_eq!(repo.read_count(), 1);
        assert_eq!(repo.content_path(&page), "/content/page/body");
    }
}
