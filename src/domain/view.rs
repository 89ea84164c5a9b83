//! Project view projection: the immutable snapshot read model.
//!
//! The `ProjectView` is derived from `ProjectEvent` only (no direct mutation)
//! and is the internally consistent read surface handed to the rendering
//! collaborator. Callers receive clones and can never mutate engine state
//! through it.

use crate::domain::board::{Task, TaskBoard};
use crate::domain::cqrs::ProjectAggregate;
use crate::domain::gallery::{Draft, DraftGallery};
use crate::domain::library::{FileLibrary, UploadedFile};
use crate::domain::thread::{Message, MessageThread};
use crate::domain::types::{
    FileCategory, MessageId, ParticipantId, ProjectId, Role, TaskStatus, TimestampUtc,
};
use crate::domain::ProjectEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of one project's collaboration state derived from events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectView {
    project_id: Option<ProjectId>,
    title: Option<String>,
    client: Option<ParticipantId>,
    editor: Option<ParticipantId>,
    created_at: Option<TimestampUtc>,
    thread: MessageThread,
    board: TaskBoard,
    gallery: DraftGallery,
    library: FileLibrary,
    last_event_sequence: u64,
}

impl ProjectView {
    /// Apply an event to update the view.
    pub fn apply_event(&mut self, aggregate_id: &str, event: &ProjectEvent, sequence: u64) {
        // Parse aggregate_id as UUID - log warning on invalid format
        match Uuid::parse_str(aggregate_id) {
            Ok(uuid) => self.project_id = Some(ProjectId(uuid)),
            Err(e) => tracing::warn!("Invalid aggregate ID '{}': {}", aggregate_id, e),
        }
        self.last_event_sequence = sequence;

        match event {
            ProjectEvent::ProjectCreated {
                client,
                editor,
                title,
                created_at,
            } => {
                self.title = Some(title.clone());
                self.client = Some(client.clone());
                self.editor = Some(editor.clone());
                self.created_at = Some(*created_at);
                self.thread = MessageThread::default();
                self.board = TaskBoard::default();
                self.gallery = DraftGallery::default();
                self.library = FileLibrary::default();
            }

            ProjectEvent::MessagePosted {
                message_id,
                author,
                author_role,
                body,
                reply_to,
                posted_at,
            } => {
                self.thread.apply_posted(Message {
                    id: message_id.clone(),
                    author: author.clone(),
                    author_role: *author_role,
                    body: body.clone(),
                    reply_to: reply_to.clone(),
                    pinned: false,
                    deleted: false,
                    reactions: Default::default(),
                    created_at: *posted_at,
                });
            }

            ProjectEvent::ReactionAdded {
                message_id,
                participant,
                kind,
                ..
            } => {
                self.thread
                    .apply_reaction_added(message_id, participant.clone(), kind.clone());
            }

            ProjectEvent::ReactionRemoved {
                message_id,
                participant,
                kind,
                ..
            } => {
                self.thread
                    .apply_reaction_removed(message_id, participant, kind);
            }

            ProjectEvent::MessagePinned {
                message_id, pinned, ..
            } => {
                self.thread.apply_pin_changed(message_id, *pinned);
            }

            ProjectEvent::MessageDeleted { message_id, .. } => {
                self.thread.apply_deleted(message_id);
            }

            ProjectEvent::TaskCreated {
                task_id,
                name,
                hours,
                cost,
                due_date,
                created_at,
            } => {
                self.board.apply_created(Task {
                    id: task_id.clone(),
                    name: name.clone(),
                    status: TaskStatus::Pending,
                    hours: *hours,
                    cost: *cost,
                    due_date: *due_date,
                    created_at: *created_at,
                    status_changed_at: *created_at,
                });
            }

            ProjectEvent::TaskMoved { task_id, to, at, .. } => {
                self.board.apply_moved(task_id, *to, *at);
            }

            ProjectEvent::DraftAdded {
                draft_id,
                version,
                media_ref,
                added_at,
            } => {
                self.gallery.apply_added(Draft {
                    id: draft_id.clone(),
                    version: *version,
                    media_ref: media_ref.clone(),
                    locked: false,
                    created_at: *added_at,
                });
            }

            ProjectEvent::DraftLockToggled {
                draft_id, locked, ..
            } => {
                self.gallery.apply_lock_toggled(draft_id, *locked);
            }

            ProjectEvent::FileUploaded {
                file_id,
                name,
                category,
                content_ref,
                uploaded_at,
            } => {
                self.library.apply_uploaded(UploadedFile {
                    id: file_id.clone(),
                    name: name.clone(),
                    category: *category,
                    uploaded_at: *uploaded_at,
                    versions: vec![crate::domain::library::FileVersion {
                        version: 1,
                        content_ref: content_ref.clone(),
                        uploaded_at: *uploaded_at,
                    }],
                });
            }

            ProjectEvent::FileVersionAppended {
                file_id,
                version,
                content_ref,
                uploaded_at,
            } => {
                self.library.apply_version_appended(
                    file_id,
                    crate::domain::library::FileVersion {
                        version: *version,
                        content_ref: content_ref.clone(),
                        uploaded_at: *uploaded_at,
                    },
                );
            }
        }
    }

    /// Returns the project ID.
    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Returns the project title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the client participant.
    pub fn client(&self) -> Option<&ParticipantId> {
        self.client.as_ref()
    }

    /// Returns the editor participant.
    pub fn editor(&self) -> Option<&ParticipantId> {
        self.editor.as_ref()
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> Option<&TimestampUtc> {
        self.created_at.as_ref()
    }

    /// Returns the message thread.
    pub fn thread(&self) -> &MessageThread {
        &self.thread
    }

    /// Returns the task board.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Returns the draft gallery.
    pub fn gallery(&self) -> &DraftGallery {
        &self.gallery
    }

    /// Returns the file library.
    pub fn library(&self) -> &FileLibrary {
        &self.library
    }

    /// Returns the last event sequence number.
    pub fn last_event_sequence(&self) -> u64 {
        self.last_event_sequence
    }

    /// Returns true if the project has been created.
    pub fn exists(&self) -> bool {
        self.title.is_some()
    }

    // ========== Read queries ==========

    /// Looks up a message by id.
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.thread.message(id)
    }

    /// Walks the reply chain from a message, tombstones included.
    pub fn reply_chain(&self, id: &MessageId) -> Vec<&Message> {
        self.thread.reply_chain(id)
    }

    /// Returns all pinned messages in thread order.
    pub fn pinned_messages(&self) -> Vec<&Message> {
        self.thread.pinned_messages()
    }

    /// Returns the tasks in one column, in stable creation order.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.board.tasks_by_status(status)
    }

    /// Returns the drafts visible to the given viewer role.
    pub fn visible_drafts(&self, viewer_role: Role) -> Vec<&Draft> {
        self.gallery.visible_drafts(viewer_role)
    }

    /// Returns the files matching a category filter (`None` = all).
    pub fn files_by_category(&self, filter: Option<FileCategory>) -> Vec<&UploadedFile> {
        self.library.files_by_category(filter)
    }
}

/// Serializable wrapper for event envelopes used in broadcasting and command
/// replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEventEnvelope {
    pub aggregate_id: String,
    pub sequence: u64,
    pub event: ProjectEvent,
}

impl From<&cqrs_es::EventEnvelope<ProjectAggregate>> for ProjectEventEnvelope {
    fn from(source: &cqrs_es::EventEnvelope<ProjectAggregate>) -> Self {
        Self {
            aggregate_id: source.aggregate_id.clone(),
            sequence: source.sequence as u64,
            event: source.payload.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
