// Coordinator configuration

use super::constants::{ACTIVATION_METADATA_KEY, SCHEDULED_DATE_PROPERTY};
use crate::application::timeout_resolver::ResolutionMode;
use serde::{Deserialize, Serialize};

/// Names and value shape used by one coordinator
///
/// The content node name belongs to the `PayloadReader` the coordinator is
/// built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Payload property read as the scheduled date
    pub property: String,
    /// Task metadata key written with the activation value
    pub metadata_key: String,
    pub mode: ResolutionMode,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            property: SCHEDULED_DATE_PROPERTY.to_string(),
            metadata_key: ACTIVATION_METADATA_KEY.to_string(),
            mode: ResolutionMode::Absolute,
        }
    }
}
