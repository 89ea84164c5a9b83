//! Task Board Engine: the Kanban-style task list of one project.
//!
//! Tasks are created in the `PENDING` column and may be dragged freely
//! between columns; the engine validates only that the target column exists.
//! Tasks are never deleted in place.

use crate::domain::errors::ProjectError;
use crate::domain::types::{TaskId, TaskStatus, TimestampUtc};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task card on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub hours: f64,
    pub cost: f64,
    pub due_date: NaiveDate,
    pub created_at: TimestampUtc,
    /// Timestamp of the most recent status transition, kept for audit.
    pub status_changed_at: TimestampUtc,
}

/// The task board of one project, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    /// Returns all tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by id.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }

    /// Looks up a task by id, failing with `NotFound` when unknown.
    pub fn require(&self, id: &TaskId) -> Result<&Task, ProjectError> {
        self.task(id).ok_or_else(|| ProjectError::NotFound {
            message: format!("task {} does not exist in this project", id),
        })
    }

    /// Returns the tasks in one column, in stable creation order.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    // ========== Event application ==========

    pub(crate) fn apply_created(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub(crate) fn apply_moved(&mut self, id: &TaskId, to: TaskStatus, at: TimestampUtc) {
        if let Some(task) = self.task_mut(id) {
            task.status = to;
            task.status_changed_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        let now = TimestampUtc::now();
        Task {
            id: TaskId::new(),
            name: name.to_string(),
            status: TaskStatus::Pending,
            hours: 4.0,
            cost: 200.0,
            due_date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            created_at: now,
            status_changed_at: now,
        }
    }

    #[test]
    fn tasks_by_status_keeps_creation_order() {
        let mut board = TaskBoard::default();
        let a = task("Rough Cut");
        let b = task("Color Grade");
        let c = task("Sound Mix");
        board.apply_created(a.clone());
        board.apply_created(b.clone());
        board.apply_created(c.clone());
        board.apply_moved(&b.id, TaskStatus::InProgress, TimestampUtc::now());

        let pending: Vec<&str> = board
            .tasks_by_status(TaskStatus::Pending)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(pending, vec!["Rough Cut", "Sound Mix"]);
        assert_eq!(board.tasks_by_status(TaskStatus::InProgress).len(), 1);
    }

    #[test]
    fn any_to_any_moves_are_applied() {
        let mut board = TaskBoard::default();
        let t = task("Rough Cut");
        board.apply_created(t.clone());

        board.apply_moved(&t.id, TaskStatus::Completed, TimestampUtc::now());
        assert_eq!(board.task(&t.id).unwrap().status, TaskStatus::Completed);

        // The board allows free drag, including straight back to PENDING.
        board.apply_moved(&t.id, TaskStatus::Pending, TimestampUtc::now());
        assert_eq!(board.task(&t.id).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn unknown_task_is_not_found() {
        let board = TaskBoard::default();
        assert!(matches!(
            board.require(&TaskId::new()),
            Err(ProjectError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_status_string_does_not_parse() {
        assert_eq!(TaskStatus::parse("PENDING"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::parse("IN_PROGRESS"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("COMPLETED"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("ARCHIVED"), None);
        assert_eq!(TaskStatus::parse("pending"), None);
    }
}
