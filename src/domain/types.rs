//! Strongly typed domain primitives for the project collaboration model.
//!
//! These newtypes provide type safety and semantic clarity for project,
//! message, task, draft and file identifiers. They are used throughout the
//! domain model and in every persisted event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a collaboration project.
/// Used as the aggregate_id in the event store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Creates a new random project ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a project ID from a string.
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message in a project thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Creates a new random message ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Creates a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a draft version in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(pub Uuid);

impl DraftId {
    /// Creates a new random draft ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an uploaded file in the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    /// Creates a new random file ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a participant (client, editor or system actor).
///
/// Participants are resolved by the auth collaborator; the engine only
/// attributes actions to them and never owns participant records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of the participant performing or attributed to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Editor,
    System,
}

/// Task board column. The transition graph is deliberately unconstrained:
/// the board allows free drag between columns, so any status may move to
/// any other. Moves are audited through `TaskMoved` events instead of being
/// restricted at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parses a raw status string from the UI collaborator.
    ///
    /// Returns `None` for anything outside the three known columns; callers
    /// map that to `ProjectError::InvalidStatus`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category tag for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileCategory {
    /// Raw footage. The default when an upload carries no category.
    #[default]
    Raw,
    /// Final deliverables.
    Final,
    /// Reference material.
    Refs,
}

impl FileCategory {
    /// Parses a raw category string from the UI collaborator.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RAW" => Some(Self::Raw),
            "FINAL" => Some(Self::Final),
            "REFS" => Some(Self::Refs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::Final => "FINAL",
            Self::Refs => "REFS",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reaction kind attached to a message ("heart", "thumbsUp", ...).
///
/// An open string enum: consumers may introduce new kinds without a schema
/// change, so this stays a newtype rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReactionKind(pub String);

impl ReactionKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReactionKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ReactionKind {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference to a rendered draft clip held by the media storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MediaRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference to uploaded file content held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef(pub String);

impl ContentRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// UTC timestamp for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampUtc(pub DateTime<Utc>);

impl TimestampUtc {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the timestamp as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for TimestampUtc {
    fn default() -> Self {
        Self::now()
    }
}
