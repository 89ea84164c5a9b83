//! CQRS core types for the project collaboration model:
//! - **Commands**: Intent to change state
//! - **Events**: Facts that have happened
//! - **Aggregate**: Command validation and event application
//! - **Query**: Read-side projection
//!
//! The aggregate composes the four engines (thread, board, gallery, library)
//! and is the sole mutation entry point for one project. `handle` validates
//! against current state without mutating it and `apply` is infallible, so a
//! failed command can never leave a partial update behind.

pub mod commands;
pub mod events;
pub mod query;

pub use commands::ProjectCommand;
pub use events::ProjectEvent;
pub use query::ProjectQuery;

use crate::domain::board::{Task, TaskBoard};
use crate::domain::errors::ProjectError;
use crate::domain::gallery::{Draft, DraftGallery};
use crate::domain::library::{FileLibrary, FileVersion, UploadedFile};
use crate::domain::services::ProjectServices;
use crate::domain::thread::{Message, MessageThread};
use crate::domain::types::{
    DraftId, FileCategory, FileId, MessageId, ParticipantId, Role, TaskId, TaskStatus,
    TimestampUtc,
};
use async_trait::async_trait;
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Active project data once the aggregate is initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    title: String,
    client: ParticipantId,
    editor: ParticipantId,
    created_at: TimestampUtc,
    thread: MessageThread,
    board: TaskBoard,
    gallery: DraftGallery,
    library: FileLibrary,
}

impl ProjectData {
    // ========== Public Getters ==========

    /// Returns the project title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the client participant.
    pub fn client(&self) -> &ParticipantId {
        &self.client
    }

    /// Returns the editor participant.
    pub fn editor(&self) -> &ParticipantId {
        &self.editor
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> &TimestampUtc {
        &self.created_at
    }

    /// Returns the message thread engine state.
    pub fn thread(&self) -> &MessageThread {
        &self.thread
    }

    /// Returns the task board engine state.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Returns the draft gallery engine state.
    pub fn gallery(&self) -> &DraftGallery {
        &self.gallery
    }

    /// Returns the file library engine state.
    pub fn library(&self) -> &FileLibrary {
        &self.library
    }

    // ========== Crate-level Mutators ==========

    pub(crate) fn thread_mut(&mut self) -> &mut MessageThread {
        &mut self.thread
    }

    pub(crate) fn board_mut(&mut self) -> &mut TaskBoard {
        &mut self.board
    }

    pub(crate) fn gallery_mut(&mut self) -> &mut DraftGallery {
        &mut self.gallery
    }

    pub(crate) fn library_mut(&mut self) -> &mut FileLibrary {
        &mut self.library
    }
}

/// Project aggregate state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum ProjectState {
    /// Aggregate has not been initialized.
    #[default]
    Uninitialized,
    /// Aggregate is active with project data (boxed for memory efficiency).
    Active(Box<ProjectData>),
}

/// The project aggregate: the single command surface for one project.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectAggregate {
    pub state: ProjectState,
}

#[async_trait]
impl Aggregate for ProjectAggregate {
    type Command = ProjectCommand;
    type Event = ProjectEvent;
    type Error = ProjectError;
    type Services = ProjectServices;

    fn aggregate_type() -> String {
        "project".to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        let now = services.clock.now();

        match (&self.state, command) {
            // CreateProject - only valid on an uninitialized aggregate
            (
                ProjectState::Uninitialized,
                ProjectCommand::CreateProject {
                    client,
                    editor,
                    title,
                },
            ) => Ok(vec![ProjectEvent::ProjectCreated {
                client,
                editor,
                title,
                created_at: now,
            }]),

            (ProjectState::Active(_), ProjectCommand::CreateProject { .. }) => {
                Err(ProjectError::Forbidden {
                    message: "project already exists".to_string(),
                })
            }

            // PostMessage - reply targets must resolve within the project
            (
                ProjectState::Active(data),
                ProjectCommand::PostMessage {
                    author,
                    author_role,
                    body,
                    reply_to,
                },
            ) => {
                if let Some(parent) = &reply_to {
                    data.thread().validate_reply_target(parent)?;
                }
                Ok(vec![ProjectEvent::MessagePosted {
                    message_id: MessageId::new(),
                    author,
                    author_role,
                    body,
                    reply_to,
                    posted_at: now,
                }])
            }

            // React - idempotent per participant + kind; tombstones reject
            (
                ProjectState::Active(data),
                ProjectCommand::React {
                    message_id,
                    participant,
                    kind,
                },
            ) => {
                let message = data.thread().require_live(&message_id)?;
                if message.has_reaction(&participant, &kind) {
                    Ok(Vec::new())
                } else {
                    Ok(vec![ProjectEvent::ReactionAdded {
                        message_id,
                        participant,
                        kind,
                        reacted_at: now,
                    }])
                }
            }

            // Unreact - removing an absent reaction is a no-op
            (
                ProjectState::Active(data),
                ProjectCommand::Unreact {
                    message_id,
                    participant,
                    kind,
                },
            ) => {
                let message = data.thread().require_live(&message_id)?;
                if message.has_reaction(&participant, &kind) {
                    Ok(vec![ProjectEvent::ReactionRemoved {
                        message_id,
                        participant,
                        kind,
                        removed_at: now,
                    }])
                } else {
                    Ok(Vec::new())
                }
            }

            // Pin / Unpin - emit only on an actual state change
            (ProjectState::Active(data), ProjectCommand::Pin { message_id }) => {
                let message = data.thread().require(&message_id)?;
                if message.pinned {
                    Ok(Vec::new())
                } else {
                    Ok(vec![ProjectEvent::MessagePinned {
                        message_id,
                        pinned: true,
                        changed_at: now,
                    }])
                }
            }

            (ProjectState::Active(data), ProjectCommand::Unpin { message_id }) => {
                let message = data.thread().require(&message_id)?;
                if message.pinned {
                    Ok(vec![ProjectEvent::MessagePinned {
                        message_id,
                        pinned: false,
                        changed_at: now,
                    }])
                } else {
                    Ok(Vec::new())
                }
            }

            // SoftDelete - author or system only; re-deleting is a no-op
            (
                ProjectState::Active(data),
                ProjectCommand::SoftDelete {
                    message_id,
                    requested_by,
                    requested_role,
                },
            ) => {
                let message = data.thread().require(&message_id)?;
                if requested_by != message.author && requested_role != Role::System {
                    return Err(ProjectError::Forbidden {
                        message: "only the original author or the system may delete a message"
                            .to_string(),
                    });
                }
                if message.deleted {
                    Ok(Vec::new())
                } else {
                    Ok(vec![ProjectEvent::MessageDeleted {
                        message_id,
                        deleted_by: requested_by,
                        deleted_at: now,
                    }])
                }
            }

            // CreateTask - tasks start in the PENDING column
            (
                ProjectState::Active(_),
                ProjectCommand::CreateTask {
                    name,
                    hours,
                    cost,
                    due_date,
                },
            ) => Ok(vec![ProjectEvent::TaskCreated {
                task_id: TaskId::new(),
                name,
                hours,
                cost,
                due_date,
                created_at: now,
            }]),

            // MoveTask - any-to-any, but the target column must exist
            (
                ProjectState::Active(data),
                ProjectCommand::MoveTask {
                    task_id,
                    new_status,
                },
            ) => {
                let task = data.board().require(&task_id)?;
                let to = TaskStatus::parse(&new_status).ok_or_else(|| {
                    ProjectError::InvalidStatus {
                        message: format!("unknown task status '{}'", new_status),
                    }
                })?;
                Ok(vec![ProjectEvent::TaskMoved {
                    task_id,
                    from: task.status,
                    to,
                    at: now,
                }])
            }

            // AddDraft - the gallery assigns the next version number
            (ProjectState::Active(data), ProjectCommand::AddDraft { media_ref }) => {
                Ok(vec![ProjectEvent::DraftAdded {
                    draft_id: DraftId::new(),
                    version: data.gallery().next_version(),
                    media_ref,
                    added_at: now,
                }])
            }

            // ToggleLock - pure flip of the client-visibility gate
            (ProjectState::Active(data), ProjectCommand::ToggleLock { draft_id }) => {
                let draft = data.gallery().require(&draft_id)?;
                Ok(vec![ProjectEvent::DraftLockToggled {
                    draft_id,
                    locked: !draft.locked,
                    toggled_at: now,
                }])
            }

            // UploadFile - category defaults to RAW when unspecified
            (
                ProjectState::Active(_),
                ProjectCommand::UploadFile {
                    name,
                    category,
                    content_ref,
                },
            ) => {
                let category = match category {
                    Some(raw) => {
                        FileCategory::parse(&raw).ok_or_else(|| ProjectError::InvalidStatus {
                            message: format!("unknown file category '{}'", raw),
                        })?
                    }
                    None => FileCategory::default(),
                };
                Ok(vec![ProjectEvent::FileUploaded {
                    file_id: FileId::new(),
                    name,
                    category,
                    content_ref,
                    uploaded_at: now,
                }])
            }

            // AppendVersion - always appends, version = previous max + 1
            (
                ProjectState::Active(data),
                ProjectCommand::AppendVersion {
                    file_id,
                    content_ref,
                },
            ) => {
                let version = data.library().next_version(&file_id)?;
                Ok(vec![ProjectEvent::FileVersionAppended {
                    file_id,
                    version,
                    content_ref,
                    uploaded_at: now,
                }])
            }

            // Any other command on an uninitialized aggregate
            (ProjectState::Uninitialized, _cmd) => Err(ProjectError::NotFound {
                message: "project does not exist".to_string(),
            }),
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match (&mut self.state, event) {
            // ProjectCreated initializes the aggregate
            (
                ProjectState::Uninitialized,
                ProjectEvent::ProjectCreated {
                    client,
                    editor,
                    title,
                    created_at,
                },
            ) => {
                self.state = ProjectState::Active(Box::new(ProjectData {
                    title,
                    client,
                    editor,
                    created_at,
                    thread: MessageThread::default(),
                    board: TaskBoard::default(),
                    gallery: DraftGallery::default(),
                    library: FileLibrary::default(),
                }));
            }

            (
                ProjectState::Active(data),
                ProjectEvent::MessagePosted {
                    message_id,
                    author,
                    author_role,
                    body,
                    reply_to,
                    posted_at,
                },
            ) => {
                data.thread_mut().apply_posted(Message {
                    id: message_id,
                    author,
                    author_role,
                    body,
                    reply_to,
                    pinned: false,
                    deleted: false,
                    reactions: BTreeMap::new(),
                    created_at: posted_at,
                });
            }

            (
                ProjectState::Active(data),
                ProjectEvent::ReactionAdded {
                    message_id,
                    participant,
                    kind,
                    ..
                },
            ) => {
                data.thread_mut()
                    .apply_reaction_added(&message_id, participant, kind);
            }

            (
                ProjectState::Active(data),
                ProjectEvent::ReactionRemoved {
                    message_id,
                    participant,
                    kind,
                    ..
                },
            ) => {
                data.thread_mut()
                    .apply_reaction_removed(&message_id, &participant, &kind);
            }

            (
                ProjectState::Active(data),
                ProjectEvent::MessagePinned {
                    message_id, pinned, ..
                },
            ) => {
                data.thread_mut().apply_pin_changed(&message_id, pinned);
            }

            (ProjectState::Active(data), ProjectEvent::MessageDeleted { message_id, .. }) => {
                data.thread_mut().apply_deleted(&message_id);
            }

            (
                ProjectState::Active(data),
                ProjectEvent::TaskCreated {
                    task_id,
                    name,
                    hours,
                    cost,
                    due_date,
                    created_at,
                },
            ) => {
                data.board_mut().apply_created(Task {
                    id: task_id,
                    name,
                    status: TaskStatus::Pending,
                    hours,
                    cost,
                    due_date,
                    created_at,
                    status_changed_at: created_at,
                });
            }

            (ProjectState::Active(data), ProjectEvent::TaskMoved { task_id, to, at, .. }) => {
                data.board_mut().apply_moved(&task_id, to, at);
            }

            (
                ProjectState::Active(data),
                ProjectEvent::DraftAdded {
                    draft_id,
                    version,
                    media_ref,
                    added_at,
                },
            ) => {
                data.gallery_mut().apply_added(Draft {
                    id: draft_id,
                    version,
                    media_ref,
                    locked: false,
                    created_at: added_at,
                });
            }

            (
                ProjectState::Active(data),
                ProjectEvent::DraftLockToggled {
                    draft_id, locked, ..
                },
            ) => {
                data.gallery_mut().apply_lock_toggled(&draft_id, locked);
            }

            (
                ProjectState::Active(data),
                ProjectEvent::FileUploaded {
                    file_id,
                    name,
                    category,
                    content_ref,
                    uploaded_at,
                },
            ) => {
                data.library_mut().apply_uploaded(UploadedFile {
                    id: file_id,
                    name,
                    category,
                    uploaded_at,
                    versions: vec![FileVersion {
                        version: 1,
                        content_ref,
                        uploaded_at,
                    }],
                });
            }

            (
                ProjectState::Active(data),
                ProjectEvent::FileVersionAppended {
                    file_id,
                    version,
                    content_ref,
                    uploaded_at,
                },
            ) => {
                data.library_mut().apply_version_appended(
                    &file_id,
                    FileVersion {
                        version,
                        content_ref,
                        uploaded_at,
                    },
                );
            }

            // Ignore events on the wrong state (cannot happen with a correct
            // event log)
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/aggregate_tests.rs"]
mod tests;
