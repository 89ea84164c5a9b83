//! Event persistence for project aggregates.

pub mod file_store;

pub use file_store::{FileAggregateContext, FileEventStore, StoredEvent, StoredSnapshot};
