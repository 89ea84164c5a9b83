//! Centralized storage layout for per-project collaboration state.
//!
//! Each project keeps its persistence under `<data dir>/projects/<id>/`:
//! - `events.jsonl` - Event log (source of truth)
//! - `aggregate.json` - Aggregate snapshot for faster loading
//! - `activity.jsonl` - Structured activity log of commands and events
//!
//! The data dir defaults to `~/.editroom` and can be overridden with the
//! `EDITROOM_DATA_DIR` environment variable.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// The name of the default data directory under the user's home.
const DATA_DIR_NAME: &str = ".editroom";

/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "EDITROOM_DATA_DIR";

/// Returns the engine data directory, creating it if needed.
///
/// # Errors
///
/// Returns an error if:
/// - The home directory cannot be determined and no override is set
/// - Directory creation fails
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Could not determine home directory for project storage")?
            .join(DATA_DIR_NAME),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

/// Returns the directory holding all per-project storage.
pub fn projects_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("projects");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create projects directory {}", dir.display()))?;
    Ok(dir)
}

/// Returns the storage directory for one project, creating it if needed.
pub fn project_dir(project_id: &str) -> Result<PathBuf> {
    let dir = projects_dir()?.join(project_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create project directory {}", dir.display()))?;
    Ok(dir)
}

/// Returns the event log path for one project.
pub fn project_event_log_path(project_id: &str) -> Result<PathBuf> {
    Ok(project_dir(project_id)?.join("events.jsonl"))
}

/// Returns the aggregate snapshot path for one project.
pub fn project_snapshot_path(project_id: &str) -> Result<PathBuf> {
    Ok(project_dir(project_id)?.join("aggregate.json"))
}

/// Guard returned by [`set_data_dir_for_test`]; restores the previous
/// override when dropped.
pub struct DataDirGuard {
    previous: Option<OsString>,
}

impl Drop for DataDirGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(previous) => std::env::set_var(DATA_DIR_ENV, previous),
            None => std::env::remove_var(DATA_DIR_ENV),
        }
    }
}

/// Points the data directory at a temp location for the duration of a test.
///
/// Mutates process environment: tests using this must run serially.
pub fn set_data_dir_for_test(path: PathBuf) -> DataDirGuard {
    let previous = std::env::var_os(DATA_DIR_ENV);
    std::env::set_var(DATA_DIR_ENV, &path);
    DataDirGuard { previous }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn project_paths_live_under_the_override() {
        let dir = tempdir().expect("temp dir");
        let _guard = set_data_dir_for_test(dir.path().to_path_buf());

        let log_path = project_event_log_path("p1").expect("log path");
        assert!(log_path.starts_with(dir.path()));
        assert!(log_path.ends_with("projects/p1/events.jsonl"));
        assert!(log_path.parent().expect("parent").is_dir());
    }

    #[test]
    #[serial]
    fn guard_restores_previous_override() {
        let dir = tempdir().expect("temp dir");
        {
            let _guard = set_data_dir_for_test(dir.path().to_path_buf());
            assert!(std::env::var_os(DATA_DIR_ENV).is_some());
        }
        assert!(std::env::var_os(DATA_DIR_ENV).is_none());
    }
}
