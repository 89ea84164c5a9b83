//! Domain model for event-sourced project collaboration state.
//!
//! This module provides a strongly typed CQRS/ES domain model: every mutation
//! from any UI surface (client dashboard, editor dashboard) is routed through
//! explicit commands against one aggregate per project, replacing implicit
//! render-triggered mutation with a command API that enforces the invariants
//! once, centrally.
//!
//! # Architecture
//!
//! - **Commands** (`cqrs/commands.rs`): Intent to change state
//! - **Events** (`cqrs/events.rs`): Facts that have happened
//! - **Aggregate** (`cqrs/mod.rs`): Command validation and event application,
//!   delegating to the four engines
//! - **Engines** (`thread.rs`, `board.rs`, `gallery.rs`, `library.rs`):
//!   Per-concern state and invariants
//! - **View** (`view.rs`): Read-only snapshot projection for UI and queries
//!
//! # Usage
//!
//! ```ignore
//! use editroom::domain::{ProjectCommand, ProjectMessage};
//!
//! // Commands are dispatched through the project actor
//! let cmd = ProjectCommand::PostMessage { ... };
//! actor_ref.send_message(ProjectMessage::Command(Box::new(cmd), reply_tx))?;
//!
//! // The reply carries the updated snapshot plus the committed events
//! let outcome = reply_rx.await??;
//! ```

pub mod actor;
pub mod board;
pub mod cqrs;
pub mod errors;
pub mod gallery;
pub mod library;
pub mod services;
pub mod supervisor;
pub mod thread;
pub mod types;
pub mod view;

// Re-export CQRS types
pub use cqrs::*;

// Re-export commonly used types for convenience
pub use actor::{
    bootstrap_view_from_events, create_actor_args, CommandOutcome, ProjectActor, ProjectActorArgs,
    ProjectMessage,
};
pub use board::{Task, TaskBoard};
pub use errors::ProjectError;
pub use gallery::{Draft, DraftGallery};
pub use library::{FileLibrary, FileVersion, UploadedFile};
pub use services::{ProjectClock, ProjectServices};
pub use supervisor::{ProjectSupervisor, SupervisorMsg};
pub use thread::{Message, MessageThread, TOMBSTONE_BODY};
pub use types::{
    ContentRef, DraftId, FileCategory, FileId, MediaRef, MessageId, ParticipantId, ProjectId,
    ReactionKind, Role, TaskId, TaskStatus, TimestampUtc,
};
pub use view::{ProjectEventEnvelope, ProjectView};
