//! Project supervisor for fault-tolerant actor management.
//!
//! The supervisor spawns one actor per project (keyed by project id) and
//! automatically restarts an actor if it fails or terminates unexpectedly.
//! Restarted actors rebuild their state from the event log, so no
//! collaboration data is lost across a restart.

use crate::domain::actor::{ProjectActor, ProjectActorArgs};
use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};
use std::collections::HashMap;

/// Messages for the project supervisor.
pub enum SupervisorMsg {
    /// Spawn a project actor for the given arguments.
    Spawn(ProjectActorArgs),
}

/// The project supervisor actor.
pub struct ProjectSupervisor;

#[async_trait]
impl Actor for ProjectSupervisor {
    type Msg = SupervisorMsg;
    type State = HashMap<String, ProjectActorArgs>;
    type Arguments = ();

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        _args: (),
    ) -> Result<Self::State, ActorProcessingErr> {
        Ok(HashMap::new())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        msg: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match msg {
            SupervisorMsg::Spawn(args) => {
                state.insert(args.project_id.clone(), args.clone());
                let _ = ProjectActor::spawn_linked(
                    Some(args.project_id.clone()),
                    ProjectActor,
                    args,
                    myself.get_cell(),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        evt: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let cell = match &evt {
            SupervisionEvent::ActorFailed(cell, _) => Some(cell),
            SupervisionEvent::ActorTerminated(cell, _, _) => Some(cell),
            _ => None,
        };

        if let Some(cell) = cell {
            if let Some(name) = cell.get_name() {
                if let Some(args) = state.get(&name).cloned() {
                    if let Some(log) = &args.activity_log {
                        log.increment_run_id();
                    }
                    let _ = ProjectActor::spawn_linked(
                        Some(name),
                        ProjectActor,
                        args,
                        myself.get_cell(),
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }
}
