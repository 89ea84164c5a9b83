//! Unit tests for ProjectAggregate command handling and event application.

use crate::domain::errors::ProjectError;
use crate::domain::services::ProjectServices;
use crate::domain::thread::TOMBSTONE_BODY;
use crate::domain::types::{
    DraftId, FileCategory, FileId, MessageId, ParticipantId, ReactionKind, Role, TaskId,
    TaskStatus,
};
use crate::domain::ProjectCommand;
use crate::domain::ProjectEvent;
use crate::domain::{ProjectAggregate, ProjectData, ProjectState};
use chrono::NaiveDate;
use cqrs_es::Aggregate;

/// Create default services for testing.
fn test_services() -> ProjectServices {
    ProjectServices::default()
}

/// Create a CreateProject command with test defaults.
fn create_project_cmd() -> ProjectCommand {
    ProjectCommand::CreateProject {
        client: ParticipantId::from("client-1"),
        editor: ParticipantId::from("editor-1"),
        title: "Launch teaser".to_string(),
    }
}

/// Apply ProjectCreated to get an initialized aggregate.
fn initialized_aggregate() -> ProjectAggregate {
    let mut agg = ProjectAggregate::default();
    agg.apply(ProjectEvent::ProjectCreated {
        client: ParticipantId::from("client-1"),
        editor: ParticipantId::from("editor-1"),
        title: "Launch teaser".to_string(),
        created_at: crate::domain::types::TimestampUtc::now(),
    });
    agg
}

/// Get data from an active aggregate (panics if not active).
fn data(agg: &ProjectAggregate) -> &ProjectData {
    match &agg.state {
        ProjectState::Active(data) => data,
        _ => panic!("Expected Active state"),
    }
}

/// Handle a command and, on success, apply all produced events.
async fn execute(
    agg: &mut ProjectAggregate,
    cmd: ProjectCommand,
) -> Result<Vec<ProjectEvent>, ProjectError> {
    let events = agg.handle(cmd, &test_services()).await?;
    for event in &events {
        agg.apply(event.clone());
    }
    Ok(events)
}

/// Post a message and return its id.
async fn post_message(agg: &mut ProjectAggregate, body: &str) -> MessageId {
    let events = execute(
        agg,
        ProjectCommand::PostMessage {
            author: ParticipantId::from("client-1"),
            author_role: Role::Client,
            body: body.to_string(),
            reply_to: None,
        },
    )
    .await
    .expect("post failed");
    match &events[0] {
        ProjectEvent::MessagePosted { message_id, .. } => message_id.clone(),
        other => panic!("Expected MessagePosted, got {:?}", other),
    }
}

/// Create a task and return its id.
async fn create_task(agg: &mut ProjectAggregate, name: &str) -> TaskId {
    let events = execute(
        agg,
        ProjectCommand::CreateTask {
            name: name.to_string(),
            hours: 4.0,
            cost: 200.0,
            due_date: NaiveDate::from_ymd_opt(2025, 4, 5).expect("date"),
        },
    )
    .await
    .expect("create task failed");
    match &events[0] {
        ProjectEvent::TaskCreated { task_id, .. } => task_id.clone(),
        other => panic!("Expected TaskCreated, got {:?}", other),
    }
}

// ============================================================================
// CreateProject Tests
// ============================================================================

#[tokio::test]
async fn create_project_on_uninitialized_succeeds() {
    let agg = ProjectAggregate::default();

    let events = agg
        .handle(create_project_cmd(), &test_services())
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProjectEvent::ProjectCreated { .. }));
}

#[tokio::test]
async fn create_project_on_active_fails() {
    let agg = initialized_aggregate();

    let result = agg.handle(create_project_cmd(), &test_services()).await;

    assert!(matches!(result, Err(ProjectError::Forbidden { .. })));
}

#[tokio::test]
async fn commands_on_uninitialized_fail_not_found() {
    let agg = ProjectAggregate::default();

    let result = agg
        .handle(
            ProjectCommand::AddDraft {
                media_ref: "clip-a".into(),
            },
            &test_services(),
        )
        .await;

    assert!(matches!(result, Err(ProjectError::NotFound { .. })));
}

#[tokio::test]
async fn apply_project_created_initializes_state() {
    let agg = initialized_aggregate();

    let data = data(&agg);
    assert_eq!(data.title(), "Launch teaser");
    assert_eq!(data.client().as_str(), "client-1");
    assert_eq!(data.editor().as_str(), "editor-1");
    assert!(data.thread().is_empty());
    assert!(data.board().is_empty());
    assert!(data.gallery().is_empty());
    assert!(data.library().is_empty());
}

// ============================================================================
// Message Thread Tests
// ============================================================================

#[tokio::test]
async fn post_message_appends_to_the_thread() {
    let mut agg = initialized_aggregate();

    let id = post_message(&mut agg, "First pass looks great").await;

    let thread = data(&agg).thread();
    assert_eq!(thread.len(), 1);
    let message = thread.message(&id).unwrap();
    assert_eq!(message.body, "First pass looks great");
    assert_eq!(message.author_role, Role::Client);
    assert!(!message.pinned);
    assert!(!message.deleted);
}

#[tokio::test]
async fn reply_to_unknown_message_is_rejected() {
    let mut agg = initialized_aggregate();

    let result = execute(
        &mut agg,
        ProjectCommand::PostMessage {
            author: ParticipantId::from("client-1"),
            author_role: Role::Client,
            body: "replying to nothing".to_string(),
            reply_to: Some(MessageId::new()),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::InvalidReference { .. })));
    // Dangling references are rejected at write time, not silently dropped
    assert!(data(&agg).thread().is_empty());
}

#[tokio::test]
async fn double_react_is_idempotent() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "hello").await;
    let heart = ReactionKind::from("heart");
    let p = ParticipantId::from("editor-1");

    let react = ProjectCommand::React {
        message_id: id.clone(),
        participant: p.clone(),
        kind: heart.clone(),
    };
    let first = execute(&mut agg, react.clone()).await.unwrap();
    assert_eq!(first.len(), 1);

    let second = execute(&mut agg, react).await.unwrap();
    assert!(second.is_empty());

    let message = data(&agg).thread().message(&id).unwrap();
    assert_eq!(message.reaction_count(&heart), 1);
}

#[tokio::test]
async fn react_then_unreact_restores_the_reaction_set() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "hello").await;
    let heart = ReactionKind::from("heart");
    let p = ParticipantId::from("editor-1");

    execute(
        &mut agg,
        ProjectCommand::React {
            message_id: id.clone(),
            participant: p.clone(),
            kind: heart.clone(),
        },
    )
    .await
    .unwrap();
    execute(
        &mut agg,
        ProjectCommand::Unreact {
            message_id: id.clone(),
            participant: p.clone(),
            kind: heart.clone(),
        },
    )
    .await
    .unwrap();

    // No residual zero-count entries
    let message = data(&agg).thread().message(&id).unwrap();
    assert!(message.reactions.is_empty());

    // Unreacting again is a no-op
    let again = execute(
        &mut agg,
        ProjectCommand::Unreact {
            message_id: id,
            participant: p,
            kind: heart,
        },
    )
    .await
    .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn react_on_unknown_or_deleted_message_fails() {
    let mut agg = initialized_aggregate();

    let unknown = execute(
        &mut agg,
        ProjectCommand::React {
            message_id: MessageId::new(),
            participant: ParticipantId::from("editor-1"),
            kind: ReactionKind::from("heart"),
        },
    )
    .await;
    assert!(matches!(unknown, Err(ProjectError::NotFound { .. })));

    let id = post_message(&mut agg, "soon gone").await;
    execute(
        &mut agg,
        ProjectCommand::SoftDelete {
            message_id: id.clone(),
            requested_by: ParticipantId::from("client-1"),
            requested_role: Role::Client,
        },
    )
    .await
    .unwrap();

    let tombstoned = execute(
        &mut agg,
        ProjectCommand::React {
            message_id: id,
            participant: ParticipantId::from("editor-1"),
            kind: ReactionKind::from("heart"),
        },
    )
    .await;
    assert!(matches!(tombstoned, Err(ProjectError::NotFound { .. })));
}

#[tokio::test]
async fn pin_and_unpin_flip_only_on_change() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "important").await;

    let pinned = execute(&mut agg, ProjectCommand::Pin {
        message_id: id.clone(),
    })
    .await
    .unwrap();
    assert!(matches!(
        pinned[0],
        ProjectEvent::MessagePinned { pinned: true, .. }
    ));
    assert!(data(&agg).thread().message(&id).unwrap().pinned);

    // Already pinned: no event
    let repinned = execute(&mut agg, ProjectCommand::Pin {
        message_id: id.clone(),
    })
    .await
    .unwrap();
    assert!(repinned.is_empty());

    let unpinned = execute(&mut agg, ProjectCommand::Unpin { message_id: id }).await.unwrap();
    assert!(matches!(
        unpinned[0],
        ProjectEvent::MessagePinned { pinned: false, .. }
    ));
}

#[tokio::test]
async fn multiple_pins_are_allowed() {
    let mut agg = initialized_aggregate();
    let first = post_message(&mut agg, "brief").await;
    let second = post_message(&mut agg, "schedule").await;

    execute(&mut agg, ProjectCommand::Pin { message_id: first }).await.unwrap();
    execute(&mut agg, ProjectCommand::Pin { message_id: second }).await.unwrap();

    assert_eq!(data(&agg).thread().pinned_messages().len(), 2);
}

#[tokio::test]
async fn soft_delete_by_non_author_is_forbidden() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "client wrote this").await;

    let result = execute(
        &mut agg,
        ProjectCommand::SoftDelete {
            message_id: id.clone(),
            requested_by: ParticipantId::from("editor-1"),
            requested_role: Role::Editor,
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::Forbidden { .. })));
    let message = data(&agg).thread().message(&id).unwrap();
    assert!(!message.deleted);
    assert_eq!(message.body, "client wrote this");
}

#[tokio::test]
async fn soft_delete_by_author_leaves_a_tombstone() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "regretted").await;
    execute(
        &mut agg,
        ProjectCommand::React {
            message_id: id.clone(),
            participant: ParticipantId::from("editor-1"),
            kind: ReactionKind::from("thumbsUp"),
        },
    )
    .await
    .unwrap();

    execute(
        &mut agg,
        ProjectCommand::SoftDelete {
            message_id: id.clone(),
            requested_by: ParticipantId::from("client-1"),
            requested_role: Role::Client,
        },
    )
    .await
    .unwrap();

    let message = data(&agg).thread().message(&id).unwrap();
    assert!(message.deleted);
    assert_eq!(message.body, TOMBSTONE_BODY);
    assert!(message.reactions.is_empty());
}

#[tokio::test]
async fn soft_delete_by_system_is_allowed() {
    let mut agg = initialized_aggregate();
    let id = post_message(&mut agg, "moderated").await;

    let result = execute(
        &mut agg,
        ProjectCommand::SoftDelete {
            message_id: id,
            requested_by: ParticipantId::from("moderation-bot"),
            requested_role: Role::System,
        },
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn reply_chain_through_a_tombstone_still_terminates() {
    let mut agg = initialized_aggregate();
    let m1 = post_message(&mut agg, "original").await;
    let reply_events = execute(
        &mut agg,
        ProjectCommand::PostMessage {
            author: ParticipantId::from("editor-1"),
            author_role: Role::Editor,
            body: "replying".to_string(),
            reply_to: Some(m1.clone()),
        },
    )
    .await
    .unwrap();
    let m2 = match &reply_events[0] {
        ProjectEvent::MessagePosted { message_id, .. } => message_id.clone(),
        other => panic!("Expected MessagePosted, got {:?}", other),
    };

    execute(
        &mut agg,
        ProjectCommand::SoftDelete {
            message_id: m1.clone(),
            requested_by: ParticipantId::from("client-1"),
            requested_role: Role::Client,
        },
    )
    .await
    .unwrap();

    let chain = data(&agg).thread().reply_chain(&m2);
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].id, m2);
    assert_eq!(chain[1].id, m1);
    assert!(chain[1].deleted);
    assert_eq!(chain[1].body, TOMBSTONE_BODY);
}

// ============================================================================
// Task Board Tests
// ============================================================================

#[tokio::test]
async fn create_task_defaults_to_pending() {
    let mut agg = initialized_aggregate();

    let id = create_task(&mut agg, "Rough Cut").await;

    let task = data(&agg).board().task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.name, "Rough Cut");
    assert_eq!(task.hours, 4.0);
    assert_eq!(task.cost, 200.0);
}

#[tokio::test]
async fn move_task_emits_an_audit_event_per_move() {
    let mut agg = initialized_aggregate();
    let id = create_task(&mut agg, "Rough Cut").await;

    let first = execute(
        &mut agg,
        ProjectCommand::MoveTask {
            task_id: id.clone(),
            new_status: "IN_PROGRESS".to_string(),
        },
    )
    .await
    .unwrap();
    match &first[0] {
        ProjectEvent::TaskMoved { from, to, .. } => {
            assert_eq!(*from, TaskStatus::Pending);
            assert_eq!(*to, TaskStatus::InProgress);
        }
        other => panic!("Expected TaskMoved, got {:?}", other),
    }
    assert_eq!(
        data(&agg).board().task(&id).unwrap().status,
        TaskStatus::InProgress
    );

    // Free drag back to PENDING is allowed and audited
    let second = execute(
        &mut agg,
        ProjectCommand::MoveTask {
            task_id: id.clone(),
            new_status: "PENDING".to_string(),
        },
    )
    .await
    .unwrap();
    match &second[0] {
        ProjectEvent::TaskMoved { from, to, .. } => {
            assert_eq!(*from, TaskStatus::InProgress);
            assert_eq!(*to, TaskStatus::Pending);
        }
        other => panic!("Expected TaskMoved, got {:?}", other),
    }
    assert_eq!(
        data(&agg).board().task(&id).unwrap().status,
        TaskStatus::Pending
    );
}

#[tokio::test]
async fn move_task_with_invalid_status_leaves_the_task_unchanged() {
    let mut agg = initialized_aggregate();
    let id = create_task(&mut agg, "Rough Cut").await;

    let result = execute(
        &mut agg,
        ProjectCommand::MoveTask {
            task_id: id.clone(),
            new_status: "ARCHIVED".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::InvalidStatus { .. })));
    assert_eq!(
        data(&agg).board().task(&id).unwrap().status,
        TaskStatus::Pending
    );
}

#[tokio::test]
async fn move_unknown_task_fails() {
    let mut agg = initialized_aggregate();

    let result = execute(
        &mut agg,
        ProjectCommand::MoveTask {
            task_id: TaskId::new(),
            new_status: "COMPLETED".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::NotFound { .. })));
}

// ============================================================================
// Draft Gallery Tests
// ============================================================================

#[tokio::test]
async fn draft_versions_are_sequential_with_no_gaps() {
    let mut agg = initialized_aggregate();

    for _ in 0..5 {
        execute(
            &mut agg,
            ProjectCommand::AddDraft {
                media_ref: "clip".into(),
            },
        )
        .await
        .unwrap();
    }

    let versions: Vec<u32> = data(&agg).gallery().drafts().iter().map(|d| d.version).collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn locked_drafts_are_hidden_from_the_client_view() {
    let mut agg = initialized_aggregate();

    let added = execute(
        &mut agg,
        ProjectCommand::AddDraft {
            media_ref: "clip-a".into(),
        },
    )
    .await
    .unwrap();
    let draft_id = match &added[0] {
        ProjectEvent::DraftAdded { draft_id, version, .. } => {
            assert_eq!(*version, 1);
            draft_id.clone()
        }
        other => panic!("Expected DraftAdded, got {:?}", other),
    };
    assert!(!data(&agg).gallery().draft(&draft_id).unwrap().locked);

    execute(
        &mut agg,
        ProjectCommand::ToggleLock {
            draft_id: draft_id.clone(),
        },
    )
    .await
    .unwrap();

    let gallery = data(&agg).gallery();
    assert!(gallery.visible_drafts(Role::Client).is_empty());
    let editor_view = gallery.visible_drafts(Role::Editor);
    assert_eq!(editor_view.len(), 1);
    assert_eq!(editor_view[0].version, 1);
    assert!(editor_view[0].locked);
}

#[tokio::test]
async fn toggle_lock_on_unknown_draft_fails() {
    let mut agg = initialized_aggregate();

    let result = execute(
        &mut agg,
        ProjectCommand::ToggleLock {
            draft_id: DraftId::new(),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::NotFound { .. })));
}

// ============================================================================
// File Library Tests
// ============================================================================

#[tokio::test]
async fn upload_and_append_build_the_version_chain() {
    let mut agg = initialized_aggregate();

    let uploaded = execute(
        &mut agg,
        ProjectCommand::UploadFile {
            name: "raw.mp4".to_string(),
            category: Some("RAW".to_string()),
            content_ref: "ref1".into(),
        },
    )
    .await
    .unwrap();
    let file_id = match &uploaded[0] {
        ProjectEvent::FileUploaded { file_id, category, .. } => {
            assert_eq!(*category, FileCategory::Raw);
            file_id.clone()
        }
        other => panic!("Expected FileUploaded, got {:?}", other),
    };

    execute(
        &mut agg,
        ProjectCommand::AppendVersion {
            file_id: file_id.clone(),
            content_ref: "ref2".into(),
        },
    )
    .await
    .unwrap();

    let library = data(&agg).library();
    let file = library.file(&file_id).unwrap();
    let versions: Vec<(u32, &str)> = file
        .versions
        .iter()
        .map(|v| (v.version, v.content_ref.as_str()))
        .collect();
    assert_eq!(versions, vec![(1, "ref1"), (2, "ref2")]);

    assert_eq!(library.files_by_category(Some(FileCategory::Raw)).len(), 1);
    assert!(library.files_by_category(Some(FileCategory::Final)).is_empty());
}

#[tokio::test]
async fn upload_without_category_defaults_to_raw() {
    let mut agg = initialized_aggregate();

    let events = execute(
        &mut agg,
        ProjectCommand::UploadFile {
            name: "untagged.mov".to_string(),
            category: None,
            content_ref: "ref1".into(),
        },
    )
    .await
    .unwrap();

    match &events[0] {
        ProjectEvent::FileUploaded { category, .. } => assert_eq!(*category, FileCategory::Raw),
        other => panic!("Expected FileUploaded, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_with_unknown_category_fails() {
    let mut agg = initialized_aggregate();

    let result = execute(
        &mut agg,
        ProjectCommand::UploadFile {
            name: "odd.mov".to_string(),
            category: Some("B_ROLL".to_string()),
            content_ref: "ref1".into(),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::InvalidStatus { .. })));
    assert!(data(&agg).library().is_empty());
}

#[tokio::test]
async fn append_version_to_unknown_file_fails() {
    let mut agg = initialized_aggregate();

    let result = execute(
        &mut agg,
        ProjectCommand::AppendVersion {
            file_id: FileId::new(),
            content_ref: "ref2".into(),
        },
    )
    .await;

    assert!(matches!(result, Err(ProjectError::NotFound { .. })));
}
