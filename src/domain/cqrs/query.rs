//! CQRS query handler for project event projection.
//!
//! The `ProjectQuery` applies committed events to the `ProjectView`
//! projection, broadcasts them to subscribers via tokio channels, and stages
//! them in a capture buffer so the project actor can return each command's
//! events alongside the updated snapshot.

use super::ProjectAggregate;
use crate::domain::view::{ProjectEventEnvelope, ProjectView};
use async_trait::async_trait;
use cqrs_es::Query;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch, RwLock};

/// CQRS query handler that maintains the `ProjectView` projection.
pub struct ProjectQuery {
    /// In-memory projection of the project state.
    pub projection: Arc<RwLock<ProjectView>>,
    /// Watch channel for snapshot updates (latest view).
    pub snapshot_tx: watch::Sender<ProjectView>,
    /// Broadcast channel for event streaming.
    pub event_tx: broadcast::Sender<ProjectEventEnvelope>,
    /// Capture buffer drained by the actor after each command. Commands on
    /// one project are serialized by its actor, so the buffer only ever
    /// holds the envelopes of the command that just committed.
    pending: Arc<Mutex<Vec<ProjectEventEnvelope>>>,
}

impl ProjectQuery {
    /// Creates a new project query handler.
    pub fn new(
        projection: Arc<RwLock<ProjectView>>,
        snapshot_tx: watch::Sender<ProjectView>,
        event_tx: broadcast::Sender<ProjectEventEnvelope>,
        pending: Arc<Mutex<Vec<ProjectEventEnvelope>>>,
    ) -> Self {
        Self {
            projection,
            snapshot_tx,
            event_tx,
            pending,
        }
    }
}

#[async_trait]
impl Query<ProjectAggregate> for ProjectQuery {
    async fn dispatch(
        &self,
        aggregate_id: &str,
        events: &[cqrs_es::EventEnvelope<ProjectAggregate>],
    ) {
        let mut view = self.projection.write().await;

        for event in events {
            // Apply event to projection
            view.apply_event(aggregate_id, &event.payload, event.sequence as u64);

            let envelope = ProjectEventEnvelope::from(event);

            // Stage for the actor's command reply
            if let Ok(mut pending) = self.pending.lock() {
                pending.push(envelope.clone());
            }

            // Broadcast event to subscribers
            if let Err(e) = self.event_tx.send(envelope) {
                tracing::warn!("Failed to broadcast event: {:?}", e);
            }
        }

        // Send updated view snapshot
        let _ = self.snapshot_tx.send(view.clone());
    }
}

#[cfg(test)]
#[path = "../tests/query_tests.rs"]
mod tests;
