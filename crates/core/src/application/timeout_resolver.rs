//! Timeout Resolver - Computes the activation value written for a task
//!
//! Pass-through is the default: a scheduled instant is forwarded untouched
//! and the host compares it against its own clock. `RelativeDelay` instead
//! writes the remaining delay in milliseconds, clamped at zero.

use crate::domain::{Instant, MetadataValue};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Shape of the value written into task metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Write the absolute activation instant
    #[default]
    Absolute,
    /// Write `max(0, activation - now)` in milliseconds
    RelativeDelay,
}

impl std::str::FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(ResolutionMode::Absolute),
            "relative" | "relative_delay" | "delay" => Ok(ResolutionMode::RelativeDelay),
            other => Err(format!(
                "unknown resolution mode {:?} (expected \"absolute\" or \"relative\")",
                other
            )),
        }
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionMode::Absolute => write!(f, "absolute"),
            ResolutionMode::RelativeDelay => write!(f, "relative"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutResolver {
    mode: ResolutionMode,
}

impl TimeoutResolver {
    pub fn new(mode: ResolutionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Activation instant for a task
    ///
    /// No scheduled instant means immediate activation (`now`). A scheduled
    /// instant is returned as-is, including past instants.
    pub fn resolve(scheduled: Option<Instant>, now: Instant) -> Instant {
        scheduled.unwrap_or(now)
    }

    /// Metadata value for a task, shaped by the resolution mode
    pub fn resolve_value(&self, scheduled: Option<Instant>, now: Instant) -> MetadataValue {
        let activation = Self::resolve(scheduled, now);

        match self.mode {
            ResolutionMode::Absolute => MetadataValue::Instant(activation),
            ResolutionMode::RelativeDelay => {
                let mut millis = activation.signed_duration_since(now).num_milliseconds();
                if millis < 0 {
                    info!(
                        activation = %activation.to_rfc3339(),
                        "Scheduled date is in the past, activating immediately"
                    );
                    millis = 0;
                }
                MetadataValue::Duration { millis }
            }
        }
    }
}
