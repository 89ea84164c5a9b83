//! Error types for the project collaboration domain.

use std::fmt::{Display, Formatter};

/// Errors that can occur during project command handling.
///
/// The first four variants are the domain taxonomy surfaced to the UI
/// collaborator; the last two arise only at the persistence boundary and are
/// mapped there by the project actor.
#[derive(Debug, Clone)]
pub enum ProjectError {
    /// A referenced entity id does not exist in the project.
    NotFound { message: String },
    /// A dangling or otherwise unresolvable reference (e.g. reply target).
    InvalidReference { message: String },
    /// The acting participant lacks rights for the mutation.
    Forbidden { message: String },
    /// Malformed enum value for a task status or file category.
    InvalidStatus { message: String },
    /// Storage/persistence failure.
    StorageFailure { message: String },
    /// Optimistic lock failure (concurrent modification detected).
    ConcurrencyConflict { message: String },
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { message } => write!(f, "not found: {}", message),
            Self::InvalidReference { message } => write!(f, "invalid reference: {}", message),
            Self::Forbidden { message } => write!(f, "forbidden: {}", message),
            Self::InvalidStatus { message } => write!(f, "invalid status: {}", message),
            Self::StorageFailure { message } => write!(f, "storage failure: {}", message),
            Self::ConcurrencyConflict { message } => write!(f, "concurrency conflict: {}", message),
        }
    }
}

impl std::error::Error for ProjectError {}
