//! Project commands for the CQRS aggregate.
//!
//! Commands represent intent to change state. The aggregate validates
//! commands against the owning engine and produces events that are persisted
//! to the event log. The project id is not part of the command: it is the
//! aggregate id the command is executed against.

use crate::domain::types::{
    ContentRef, DraftId, FileId, MediaRef, MessageId, ParticipantId, ReactionKind, Role, TaskId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Commands that can be executed against a project aggregate.
///
/// `MoveTask::new_status` and `UploadFile::category` arrive as raw strings
/// from the UI collaborator so a malformed enum value surfaces as the typed
/// `InvalidStatus` error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCommand {
    /// Initialize aggregate state for a new project pairing one client with
    /// one editor.
    CreateProject {
        client: ParticipantId,
        editor: ParticipantId,
        title: String,
    },

    /// Append a message to the thread, optionally as a reply.
    PostMessage {
        author: ParticipantId,
        author_role: Role,
        body: String,
        reply_to: Option<MessageId>,
    },

    /// Add a participant's reaction to a message. Idempotent per
    /// participant + kind.
    React {
        message_id: MessageId,
        participant: ParticipantId,
        kind: ReactionKind,
    },

    /// Remove a participant's reaction from a message.
    Unreact {
        message_id: MessageId,
        participant: ParticipantId,
        kind: ReactionKind,
    },

    /// Pin a message. No exclusivity: multiple pins are allowed.
    Pin { message_id: MessageId },

    /// Unpin a message.
    Unpin { message_id: MessageId },

    /// Replace a message body with the tombstone placeholder. Only the
    /// original author or the system may delete.
    SoftDelete {
        message_id: MessageId,
        requested_by: ParticipantId,
        requested_role: Role,
    },

    /// Create a task in the `PENDING` column.
    CreateTask {
        name: String,
        hours: f64,
        cost: f64,
        due_date: NaiveDate,
    },

    /// Move a task to another column (any-to-any).
    MoveTask { task_id: TaskId, new_status: String },

    /// Add a draft; the gallery assigns the next version number.
    AddDraft { media_ref: MediaRef },

    /// Flip a draft's lock (client visibility) state.
    ToggleLock { draft_id: DraftId },

    /// Upload a new logical file, seeding its version chain at 1.
    UploadFile {
        name: String,
        category: Option<String>,
        content_ref: ContentRef,
    },

    /// Append the next version to an existing file's chain.
    AppendVersion {
        file_id: FileId,
        content_ref: ContentRef,
    },
}
