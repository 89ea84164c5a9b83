//! Project events for the CQRS aggregate.
//!
//! Events represent facts that have happened. They are the single source of
//! truth for the project state and are persisted to the event log; the
//! persistence and rendering collaborators consume them with the field names
//! below as the stable contract.

use crate::domain::types::{
    ContentRef, DraftId, FileCategory, FileId, MediaRef, MessageId, ParticipantId, ReactionKind,
    Role, TaskId, TaskStatus, TimestampUtc,
};
use chrono::NaiveDate;
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

/// Events emitted by the project aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectEvent {
    /// Project was created.
    ProjectCreated {
        client: ParticipantId,
        editor: ParticipantId,
        title: String,
        created_at: TimestampUtc,
    },

    /// A message was appended to the thread.
    MessagePosted {
        message_id: MessageId,
        author: ParticipantId,
        author_role: Role,
        body: String,
        reply_to: Option<MessageId>,
        posted_at: TimestampUtc,
    },

    /// A participant reacted to a message.
    ReactionAdded {
        message_id: MessageId,
        participant: ParticipantId,
        kind: ReactionKind,
        reacted_at: TimestampUtc,
    },

    /// A participant withdrew a reaction.
    ReactionRemoved {
        message_id: MessageId,
        participant: ParticipantId,
        kind: ReactionKind,
        removed_at: TimestampUtc,
    },

    /// A message's pin state changed (covers both pin and unpin).
    MessagePinned {
        message_id: MessageId,
        pinned: bool,
        changed_at: TimestampUtc,
    },

    /// A message was soft-deleted, leaving a tombstone.
    MessageDeleted {
        message_id: MessageId,
        deleted_by: ParticipantId,
        deleted_at: TimestampUtc,
    },

    /// A task was created in the `PENDING` column.
    TaskCreated {
        task_id: TaskId,
        name: String,
        hours: f64,
        cost: f64,
        due_date: NaiveDate,
        created_at: TimestampUtc,
    },

    /// A task moved between columns. Audit consumers rely on `from`/`to`.
    TaskMoved {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        at: TimestampUtc,
    },

    /// A draft was added with an engine-assigned version.
    DraftAdded {
        draft_id: DraftId,
        version: u32,
        media_ref: MediaRef,
        added_at: TimestampUtc,
    },

    /// A draft's lock (client visibility) state flipped.
    DraftLockToggled {
        draft_id: DraftId,
        locked: bool,
        toggled_at: TimestampUtc,
    },

    /// A new logical file was uploaded (version chain seeded at 1).
    FileUploaded {
        file_id: FileId,
        name: String,
        category: FileCategory,
        content_ref: ContentRef,
        uploaded_at: TimestampUtc,
    },

    /// A new version was appended to a file's chain.
    FileVersionAppended {
        file_id: FileId,
        version: u32,
        content_ref: ContentRef,
        uploaded_at: TimestampUtc,
    },
}

impl DomainEvent for ProjectEvent {
    fn event_type(&self) -> String {
        match self {
            Self::ProjectCreated { .. } => "ProjectCreated".to_string(),
            Self::MessagePosted { .. } => "MessagePosted".to_string(),
            Self::ReactionAdded { .. } => "ReactionAdded".to_string(),
            Self::ReactionRemoved { .. } => "ReactionRemoved".to_string(),
            Self::MessagePinned { .. } => "MessagePinned".to_string(),
            Self::MessageDeleted { .. } => "MessageDeleted".to_string(),
            Self::TaskCreated { .. } => "TaskCreated".to_string(),
            Self::TaskMoved { .. } => "TaskMoved".to_string(),
            Self::DraftAdded { .. } => "DraftAdded".to_string(),
            Self::DraftLockToggled { .. } => "DraftLockToggled".to_string(),
            Self::FileUploaded { .. } => "FileUploaded".to_string(),
            Self::FileVersionAppended { .. } => "FileVersionAppended".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1".to_string()
    }
}
