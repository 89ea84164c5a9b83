//! Engine configuration.
//!
//! Tunables for the persistence and propagation machinery. All fields have
//! defaults so an absent or partial config file behaves like the stock
//! engine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the collaboration engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Snapshot the aggregate after every N events (0 disables snapshots).
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,
    /// Capacity of the per-project event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Whether to write the per-project JSONL activity log.
    #[serde(default = "default_activity_log")]
    pub activity_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_every: default_snapshot_every(),
            event_buffer: default_event_buffer(),
            activity_log: default_activity_log(),
        }
    }
}

fn default_snapshot_every() -> u64 {
    50
}

fn default_event_buffer() -> usize {
    64
}

fn default_activity_log() -> bool {
    true
}

impl EngineConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Loads the configuration from a YAML file, falling back to defaults
    /// when the file is missing or unparseable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default engine config: {:#}", e);
                Self::default()
            }
        }
    }
}
