//! editroom — the collaboration engine behind a client/editor video
//! marketplace.
//!
//! The crate owns the per-project collaboration state: the message thread,
//! the task board, the draft gallery and the file library. All mutation goes
//! through a single command surface (the project aggregate); reads go through
//! an immutable snapshot projected from domain events. Rendering, transport
//! and authentication are external collaborators.

pub mod audit_log;
pub mod config;
pub mod domain;
pub mod event_store;
pub mod storage_paths;
