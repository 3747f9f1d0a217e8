// Time Provider Port (for testability)

use crate::domain::Instant;
use chrono::{DateTime, Utc};

/// Time provider interface (allows fixed clocks in tests)
pub trait TimeProvider: Send + Sync {
    /// Current time in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current time as a timezone-aware instant
    fn now_instant(&self) -> Instant {
        self.now().fixed_offset()
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant (replays and tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider(pub DateTime<Utc>);

impl FixedTimeProvider {
    /// Parse an RFC 3339 timestamp, panicking on malformed input (test helper)
    pub fn at(rfc3339: &str) -> Self {
        let parsed = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap_or_else(|e| panic!("invalid fixed clock timestamp {:?}: {}", rfc3339, e));
        Self(parsed.with_timezone(&Utc))
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
