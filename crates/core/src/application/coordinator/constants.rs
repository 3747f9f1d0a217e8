//! Coordinator constants
//!
//! Names shared with the host: the payload property holding the scheduled
//! date and the metadata key read by the downstream wait step.

/// Content node property holding the scheduled activation date
pub const SCHEDULED_DATE_PROPERTY: &str = "scheduledPublishDate";

/// Task metadata key read by the host's wait step
pub const ACTIVATION_METADATA_KEY: &str = "absoluteTime";

/// Label under which hosts register this step
pub const PROCESS_LABEL: &str = "Schedule Publish Process";

/// Human-readable description for host step registries
pub const PROCESS_DESCRIPTION: &str =
    "Sets the activation time of the publish wait step from the payload's scheduledPublishDate";
