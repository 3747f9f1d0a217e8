// Payload Domain Model

use super::error::{DomainError, Result};
use super::task::Instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the child node that carries a payload's properties
pub const DEFAULT_CONTENT_NODE: &str = "jcr:content";

/// Opaque reference to the content item a task operates on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadRef(String);

impl PayloadRef {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DomainError::InvalidPayloadPath(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the node holding this payload's property bag
    ///
    /// A trailing `/` on the payload path is ignored, so `/content/a/` and
    /// `/content/a` resolve to the same content node.
    pub fn content_path(&self, content_node: &str) -> String {
        let base = self.0.trim_end_matches('/');
        format!("{}/{}", base, content_node)
    }
}

impl std::fmt::Display for PayloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed property stored on a content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Date(Instant),
    String(String),
    Long(i64),
    Boolean(bool),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Date(_) => "date",
            PropertyValue::String(_) => "string",
            PropertyValue::Long(_) => "long",
            PropertyValue::Boolean(_) => "boolean",
        }
    }

    /// Read the property as an absolute instant
    ///
    /// Dates are returned as-is (offset preserved). Strings must be RFC 3339.
    /// Longs are epoch milliseconds and come back in UTC.
    ///
    /// # Errors
    /// - `DomainError::ValidationError` if the value cannot be read as a date
    pub fn to_instant(&self) -> Result<Instant> {
        match self {
            PropertyValue::Date(instant) => Ok(*instant),
            PropertyValue::String(raw) => DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| {
                DomainError::ValidationError(format!("{:?} is not an RFC 3339 date: {}", raw, e))
            }),
            PropertyValue::Long(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| {
                    DomainError::ValidationError(format!("{} ms is out of range for a date", millis))
                }),
            PropertyValue::Boolean(_) => Err(DomainError::ValidationError(format!(
                "cannot convert {} property to date",
                self.type_name()
            ))),
        }
    }
}

impl From<Instant> for PropertyValue {
    fn from(instant: Instant) -> Self {
        PropertyValue::Date(instant)
    }
}
