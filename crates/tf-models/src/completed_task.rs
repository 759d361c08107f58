//! Completed task record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, TeamScoped, Timestamped};

use crate::task::{Priority, Task};

/// Permanent record of an accepted task
///
/// Created exactly once, when a reviewer accepts the task; immutable
/// thereafter. The active `Task` row is deleted in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub id: Option<Id>,

    /// Id of the task this record was migrated from
    pub task_id: Id,

    pub title: String,
    pub description: String,
    pub assigned_to: Id,
    pub assigned_by: Id,
    pub team_id: Id,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,

    /// When the assignee submitted the work
    pub completed_at: Option<DateTime<Utc>>,

    /// Snapshot of the latest progress text at acceptance time
    pub work_done: String,

    pub accepted_at: DateTime<Utc>,
    pub accepted_by: Id,

    /// Creation time of the original task (kept for duration metrics)
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for CompletedTask {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for CompletedTask {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl TeamScoped for CompletedTask {
    fn team_id(&self) -> Option<Id> {
        Some(self.team_id)
    }
}

impl Entity for CompletedTask {
    const TABLE_NAME: &'static str = "completed_tasks";
    const TYPE_NAME: &'static str = "CompletedTask";
}

impl CompletedTask {
    /// Build the permanent record from an active task at acceptance time
    pub fn from_task(
        task: &Task,
        task_id: Id,
        accepted_by: Id,
        accepted_at: DateTime<Utc>,
        work_done: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            task_id,
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to,
            assigned_by: task.assigned_by,
            team_id: task.team_id,
            priority: task.priority,
            due_date: task.due_date,
            completed_at: task.completed_at,
            work_done: work_done.into(),
            accepted_at,
            accepted_by,
            created_at: task.created_at,
        }
    }

    /// Whether the work was submitted on or before the due date
    pub fn on_time(&self) -> Option<bool> {
        match (self.completed_at, self.due_date) {
            (Some(done), Some(due)) => Some(done <= due),
            _ => None,
        }
    }

    /// Creation-to-completion duration in seconds, where both ends are known
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.created_at, self.completed_at) {
            (Some(created), Some(done)) => Some((done - created).num_seconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ReviewStatus, TaskStatus};
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: Some(7),
            title: "Quarterly summary".to_string(),
            description: "Summarise Q3".to_string(),
            assigned_to: 10,
            assigned_by: 2,
            team_id: 1,
            priority: Priority::High,
            status: TaskStatus::Completed,
            review_status: ReviewStatus::Pending,
            progress: 100,
            due_date: Some(Utc.with_ymd_and_hms(2024, 10, 10, 0, 0, 0).unwrap()),
            completed_at: Some(Utc.with_ymd_and_hms(2024, 10, 9, 12, 0, 0).unwrap()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn test_from_task_snapshot() {
        let task = sample_task();
        let record =
            CompletedTask::from_task(&task, 7, 2, Utc::now(), "All sections written.");

        assert_eq!(record.task_id, 7);
        assert_eq!(record.assigned_to, 10);
        assert_eq!(record.work_done, "All sections written.");
        assert_eq!(record.on_time(), Some(true));
        assert_eq!(record.duration_seconds(), Some(8 * 86400));
    }

    #[test]
    fn test_on_time_unknown_without_due_date() {
        let mut task = sample_task();
        task.due_date = None;
        let record = CompletedTask::from_task(&task, 7, 2, Utc::now(), "");
        assert_eq!(record.on_time(), None);
    }
}
