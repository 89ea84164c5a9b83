use super::*;
use crate::domain::types::ParticipantId;
use crate::domain::ProjectCommand;
use cqrs_es::CqrsFramework;
use tempfile::tempdir;

fn build_cqrs_for_test() -> (
    tempfile::TempDir,
    CqrsFramework<ProjectAggregate, FileEventStore>,
) {
    let dir = tempdir().expect("temp dir");
    let store = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("aggregate.json"),
        snapshot_every: 50,
    };
    let services = crate::domain::ProjectServices::default();
    let queries: Vec<Box<dyn cqrs_es::Query<ProjectAggregate>>> = Vec::new();
    (dir, CqrsFramework::new(store, queries, services))
}

fn create_project_cmd() -> ProjectCommand {
    ProjectCommand::CreateProject {
        client: ParticipantId::from("client-1"),
        editor: ParticipantId::from("editor-1"),
        title: "Launch teaser".to_string(),
    }
}

#[tokio::test]
async fn test_create_project() {
    let (_dir, cqrs) = build_cqrs_for_test();

    let result = cqrs.execute("project-1", create_project_cmd()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_load_aggregate() {
    let (dir, cqrs) = build_cqrs_for_test();

    cqrs.execute("project-1", create_project_cmd()).await.unwrap();
    cqrs.execute(
        "project-1",
        ProjectCommand::AddDraft {
            media_ref: "clip-a".into(),
        },
    )
    .await
    .unwrap();

    // Create new store and load aggregate
    let store = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("aggregate.json"),
        snapshot_every: 50,
    };

    let ctx = store.load_aggregate("project-1").await.unwrap();
    assert_eq!(ctx.current_sequence, 2);

    match &ctx.aggregate.state {
        crate::domain::ProjectState::Active(data) => {
            assert_eq!(data.gallery().len(), 1);
            assert_eq!(data.gallery().drafts()[0].version, 1);
        }
        _ => panic!("Expected Active state"),
    }
}

#[tokio::test]
async fn test_events_are_partitioned_by_aggregate_id() {
    let (dir, cqrs) = build_cqrs_for_test();

    cqrs.execute("project-1", create_project_cmd()).await.unwrap();
    cqrs.execute("project-2", create_project_cmd()).await.unwrap();

    let store = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("aggregate.json"),
        snapshot_every: 50,
    };

    let events = store.load_events("project-1").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].aggregate_id, "project-1");
}

#[test]
fn test_should_snapshot() {
    assert!(!should_snapshot(49, 50));
    assert!(should_snapshot(50, 50));
    assert!(should_snapshot(100, 50));
    assert!(!should_snapshot(101, 50));
    assert!(!should_snapshot(50, 0)); // Disabled
}
