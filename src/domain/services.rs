//! External services for the project aggregate.
//!
//! Services provide external dependencies (like time) to the aggregate
//! without coupling it to specific implementations.

use crate::domain::types::TimestampUtc;

/// Services injected into the project aggregate for command handling.
#[derive(Debug, Clone, Default)]
pub struct ProjectServices {
    pub clock: ProjectClock,
}

/// Clock service for timestamp generation.
#[derive(Debug, Clone, Default)]
pub struct ProjectClock;

impl ProjectClock {
    /// Returns the current UTC timestamp.
    pub fn now(&self) -> TimestampUtc {
        TimestampUtc::now()
    }
}
