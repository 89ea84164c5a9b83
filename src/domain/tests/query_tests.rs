//! Tests for the project query projection and event fan-out.

use super::*;
use crate::domain::types::{ParticipantId, TimestampUtc};
use crate::domain::ProjectEvent;
use std::collections::HashMap;
use uuid::Uuid;

fn project_created_event() -> ProjectEvent {
    ProjectEvent::ProjectCreated {
        client: ParticipantId::from("client-1"),
        editor: ParticipantId::from("editor-1"),
        title: "Launch teaser".to_string(),
        created_at: TimestampUtc::now(),
    }
}

#[tokio::test]
async fn test_query_applies_event_to_view() {
    let view = Arc::new(RwLock::new(ProjectView::default()));
    let (snapshot_tx, mut snapshot_rx) = watch::channel(ProjectView::default());
    let (event_tx, mut event_rx) = broadcast::channel(16);
    let pending = Arc::new(Mutex::new(Vec::new()));

    let query = ProjectQuery::new(view.clone(), snapshot_tx, event_tx, pending.clone());
    let aggregate_id = Uuid::new_v4().to_string();

    let envelope = cqrs_es::EventEnvelope {
        aggregate_id: aggregate_id.clone(),
        sequence: 1,
        payload: project_created_event(),
        metadata: HashMap::new(),
    };

    query.dispatch(&aggregate_id, &[envelope]).await;

    // Check view was updated
    let updated_view = view.read().await;
    assert!(updated_view.exists());
    assert_eq!(updated_view.title(), Some("Launch teaser"));

    // Check snapshot was sent
    snapshot_rx.changed().await.unwrap();
    let snapshot = snapshot_rx.borrow();
    assert!(snapshot.exists());

    // Check event was broadcast
    let received = event_rx.try_recv().unwrap();
    assert_eq!(received.aggregate_id, aggregate_id);
    assert_eq!(received.sequence, 1);

    // Check the envelope was staged for the actor's command reply
    let staged = pending.lock().unwrap();
    assert_eq!(staged.len(), 1);
    assert!(matches!(staged[0].event, ProjectEvent::ProjectCreated { .. }));
}
