//! Structured JSONL activity log for audit and event reconstruction.
//!
//! Activity-log consumers (the audit trail behind the task board, the
//! project timeline in both dashboards) read this file instead of the event
//! store. Entries carry:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - The project ID and run ID for correlation
//! - Structured command/event data in JSON format

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::ProjectCommand;
use crate::domain::ProjectEvent;

/// Structured JSONL activity logger for one project.
pub struct ActivityLog {
    project_id: String,
    run_id: AtomicU64,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct ActivityEntry {
    /// Monotonic sequence number (unique across the log's lifetime)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    /// Project ID
    pub project_id: String,
    /// Run ID (increments when the owning actor restarts)
    pub run_id: u64,
    /// Component that emitted the entry
    pub component: String,
    /// Structured event data
    pub event: Value,
}

impl ActivityLog {
    /// Creates a new activity log for the given project.
    ///
    /// Entries are written to `<dir>/activity.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - The log file cannot be opened
    pub fn new(project_id: &str, dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let log_path = dir.join("activity.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            project_id: project_id.to_string(),
            run_id: AtomicU64::new(1),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    /// Returns the path entries are written to.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Increments the run ID (called when the owning actor restarts).
    pub fn increment_run_id(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the next sequence number.
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured entry.
    ///
    /// The entry is serialized to JSON and written as a single line.
    /// This method is thread-safe.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = ActivityEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            project_id: self.project_id.clone(),
            run_id: self.run_id.load(Ordering::SeqCst),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    /// Logs a domain command.
    pub fn log_command(&self, command: &ProjectCommand) {
        self.log(
            "Project",
            serde_json::json!({
                "type": "ProjectCommand",
                "command": command
            }),
        );
    }

    /// Logs a domain event.
    pub fn log_event(&self, event: &ProjectEvent) {
        self.log(
            "Project",
            serde_json::json!({
                "type": "ProjectEvent",
                "event": event
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{MessageId, ParticipantId, ReactionKind};
    use std::io::BufRead;
    use tempfile::tempdir;

    #[test]
    fn entries_are_appended_with_monotonic_sequence() {
        let dir = tempdir().expect("temp dir");
        let log = ActivityLog::new("p1", dir.path()).expect("activity log");

        log.log_command(&ProjectCommand::React {
            message_id: MessageId::new(),
            participant: ParticipantId::from("client-1"),
            kind: ReactionKind::from("heart"),
        });
        log.log("Test", serde_json::json!({"marker": true}));

        let file = std::fs::File::open(log.log_path()).expect("open log");
        let entries: Vec<ActivityEntry> = std::io::BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 2);
        assert_eq!(entries[0].project_id, "p1");
    }
}
