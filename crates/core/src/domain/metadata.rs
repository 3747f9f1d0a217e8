// Task Metadata Model

use super::task::Instant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mutable attribute bag attached to a task, read by the host scheduler
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Value of a task metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MetadataValue {
    /// Absolute activation instant
    Instant(Instant),
    /// Relative delay in milliseconds
    Duration { millis: i64 },
    Text(String),
}

impl MetadataValue {
    pub fn as_instant(&self) -> Option<Instant> {
        match self {
            MetadataValue::Instant(instant) => Some(*instant),
            _ => None,
        }
    }

    pub fn as_millis(&self) -> Option<i64> {
        match self {
            MetadataValue::Duration { millis } => Some(*millis),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
            MetadataValue::Duration { millis } => write!(f, "{}ms", millis),
            MetadataValue::Text(text) => f.write_str(text),
        }
    }
}
