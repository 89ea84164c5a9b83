//! Project actor for CQRS command handling.
//!
//! The `ProjectActor` wraps the CQRS framework and provides a message-based
//! interface for executing commands and querying state. One actor owns one
//! project, so all commands for a project are serialized through its mailbox
//! while different projects execute fully in parallel.

use crate::audit_log::ActivityLog;
use crate::config::EngineConfig;
use crate::domain::cqrs::ProjectAggregate;
use crate::domain::errors::ProjectError;
use crate::domain::services::ProjectServices;
use crate::domain::view::{ProjectEventEnvelope, ProjectView};
use crate::domain::ProjectCommand;
use crate::domain::ProjectQuery;
use crate::event_store::{FileEventStore, StoredEvent};
use crate::storage_paths;
use async_trait::async_trait;
use cqrs_es::{AggregateError, CqrsFramework};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot, watch, RwLock};

/// Reply to a successfully executed command: the updated immutable snapshot
/// plus the domain events committed by that command, in program order.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub snapshot: ProjectView,
    pub events: Vec<ProjectEventEnvelope>,
}

/// Messages that can be sent to the project actor.
pub enum ProjectMessage {
    /// Execute a command and return the outcome (or error).
    Command(
        Box<ProjectCommand>,
        oneshot::Sender<Result<CommandOutcome, ProjectError>>,
    ),
    /// Get the current view.
    GetView(oneshot::Sender<ProjectView>),
}

/// Arguments for spawning a project actor.
#[derive(Clone)]
pub struct ProjectActorArgs {
    /// The aggregate ID (project ID).
    pub project_id: String,
    /// Path to the event log file.
    pub log_path: PathBuf,
    /// Path to the snapshot file.
    pub snapshot_path: PathBuf,
    /// Snapshot after every N events.
    pub snapshot_every: u64,
    /// Shared view for projection.
    pub view: Arc<RwLock<ProjectView>>,
    /// Watch channel sender for view snapshots.
    pub snapshot_tx: watch::Sender<ProjectView>,
    /// Broadcast channel sender for event streaming.
    pub event_tx: broadcast::Sender<ProjectEventEnvelope>,
    /// Services for command handling.
    pub services: ProjectServices,
    /// Optional structured activity log for commands and events.
    pub activity_log: Option<Arc<ActivityLog>>,
}

/// State maintained by the project actor.
pub struct ProjectActorState {
    /// The CQRS framework instance.
    pub cqrs: CqrsFramework<ProjectAggregate, FileEventStore>,
    /// The aggregate ID.
    pub project_id: String,
    /// Shared view for reading.
    pub view: Arc<RwLock<ProjectView>>,
    /// Capture buffer filled by the query on commit, drained per command.
    pub pending: Arc<Mutex<Vec<ProjectEventEnvelope>>>,
    /// Optional activity log.
    pub activity_log: Option<Arc<ActivityLog>>,
}

/// The project actor.
pub struct ProjectActor;

impl ProjectActor {
    /// Builds the CQRS framework from actor arguments, returning the event
    /// capture buffer shared with the projection query.
    pub fn build_cqrs(
        args: &ProjectActorArgs,
    ) -> (
        CqrsFramework<ProjectAggregate, FileEventStore>,
        Arc<Mutex<Vec<ProjectEventEnvelope>>>,
    ) {
        let store = FileEventStore::new(
            args.log_path.clone(),
            args.snapshot_path.clone(),
            args.snapshot_every,
        );

        let pending = Arc::new(Mutex::new(Vec::new()));
        let query = ProjectQuery::new(
            args.view.clone(),
            args.snapshot_tx.clone(),
            args.event_tx.clone(),
            pending.clone(),
        );

        let cqrs = CqrsFramework::new(store, vec![Box::new(query)], args.services.clone());
        (cqrs, pending)
    }
}

#[async_trait]
impl Actor for ProjectActor {
    type Msg = ProjectMessage;
    type State = ProjectActorState;
    type Arguments = ProjectActorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let (cqrs, pending) = ProjectActor::build_cqrs(&args);

        Ok(ProjectActorState {
            cqrs,
            project_id: args.project_id,
            view: args.view,
            pending,
            activity_log: args.activity_log,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ProjectMessage::Command(boxed_cmd, reply) => {
                let cmd = *boxed_cmd;
                if let Some(log) = &state.activity_log {
                    log.log_command(&cmd);
                }

                let result = state.cqrs.execute(&state.project_id, cmd).await;

                let mapped = match result {
                    Ok(()) => {
                        let events = match state.pending.lock() {
                            Ok(mut pending) => std::mem::take(&mut *pending),
                            Err(_) => Vec::new(),
                        };
                        if let Some(log) = &state.activity_log {
                            for envelope in &events {
                                log.log_event(&envelope.event);
                            }
                        }
                        let snapshot = state.view.read().await.clone();
                        Ok(CommandOutcome { snapshot, events })
                    }
                    Err(AggregateError::UserError(err)) => Err(err),
                    Err(AggregateError::AggregateConflict) => {
                        Err(ProjectError::ConcurrencyConflict {
                            message: "project was modified concurrently".to_string(),
                        })
                    }
                    Err(err) => Err(ProjectError::StorageFailure {
                        message: err.to_string(),
                    }),
                };

                if reply.send(mapped).is_err() {
                    tracing::debug!("Command reply channel closed");
                }
            }
            ProjectMessage::GetView(reply) => {
                let view = state.view.read().await.clone();
                if reply.send(view).is_err() {
                    tracing::debug!("Command reply channel closed");
                }
            }
        }

        Ok(())
    }
}

/// Bootstraps a `ProjectView` by replaying events from an event log file.
///
/// Reads all events for the given aggregate_id from the event log and applies
/// them to a fresh view. Used when resuming a project so the view state is
/// restored from persisted events before the actor accepts commands.
///
/// Returns `ProjectView::default()` if the log file doesn't exist.
pub fn bootstrap_view_from_events(log_path: &PathBuf, aggregate_id: &str) -> ProjectView {
    let mut view = ProjectView::default();

    let file = match File::open(log_path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return view,
        Err(_) => return view, // Return default on any error
    };

    let reader = BufReader::new(file);
    let mut skipped_lines = 0;

    for line in reader.lines().map_while(Result::ok) {
        if let Ok(stored) = serde_json::from_str::<StoredEvent>(&line) {
            if stored.aggregate_id == aggregate_id {
                view.apply_event(&stored.aggregate_id, &stored.event, stored.sequence);
            }
        } else {
            skipped_lines += 1;
        }
    }

    if skipped_lines > 0 {
        tracing::warn!("Skipped {} unparseable lines in event log", skipped_lines);
    }

    view
}

/// Helper to create actor arguments from the engine configuration.
///
/// Takes a project id and uses the storage path helpers to compute the event
/// log, snapshot and activity log locations.
///
/// For resumed projects, this function bootstraps the initial `ProjectView`
/// by replaying events from the event log. For new projects, the view starts
/// empty and is populated when the first `CreateProject` command arrives.
pub fn create_actor_args(
    project_id: &str,
    config: &EngineConfig,
) -> anyhow::Result<(
    ProjectActorArgs,
    watch::Receiver<ProjectView>,
    broadcast::Receiver<ProjectEventEnvelope>,
)> {
    let log_path = storage_paths::project_event_log_path(project_id)?;
    let snapshot_path = storage_paths::project_snapshot_path(project_id)?;
    let activity_log = if config.activity_log {
        let project_dir = storage_paths::project_dir(project_id)?;
        Some(Arc::new(ActivityLog::new(project_id, &project_dir)?))
    } else {
        None
    };

    // Bootstrap the view from existing events (if any)
    let initial_view = bootstrap_view_from_events(&log_path, project_id);
    let view = Arc::new(RwLock::new(initial_view.clone()));
    let (snapshot_tx, snapshot_rx) = watch::channel(initial_view);
    let (event_tx, event_rx) = broadcast::channel(config.event_buffer);

    let args = ProjectActorArgs {
        project_id: project_id.to_string(),
        log_path,
        snapshot_path,
        snapshot_every: config.snapshot_every,
        view,
        snapshot_tx,
        event_tx,
        services: ProjectServices::default(),
        activity_log,
    };

    Ok((args, snapshot_rx, event_rx))
}

#[cfg(test)]
#[path = "tests/actor_tests.rs"]
mod tests;
