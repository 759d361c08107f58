//! Task model and lifecycle enums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, TeamScoped, Timestamped};
use validator::Validate;

/// Task status
///
/// The reachable combinations with [`ReviewStatus`] are:
/// `(pending|in_progress, pending)`, `(completed, pending)`,
/// `(completed, accepted)` transiently during acceptance, and
/// `(in_progress, rejected|needs_improvement)` after a review rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Accepted,
    Rejected,
    NeedsImprovement,
}

impl ReviewStatus {
    /// Whether this review outcome reopens the task for editing
    pub fn reopens_task(&self) -> bool {
        matches!(self, ReviewStatus::Rejected | ReviewStatus::NeedsImprovement)
    }
}

/// Task priority
///
/// `Ord` follows urgency: `High > Medium > Low`. The assignment engine sorts
/// the backlog by priority descending, then creation time ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Manually assigned task entity
///
/// Invariant: `team_id` always equals the assignee's team. Creation forces
/// the team from the assignee and never trusts the caller's value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: String,

    /// The team member (or, for admin-created tasks, lead) doing the work
    pub assigned_to: Id,

    /// The admin or team lead who created the task
    pub assigned_by: Id,

    pub team_id: Id,

    #[serde(default)]
    pub priority: Priority,

    pub status: TaskStatus,

    pub review_status: ReviewStatus,

    /// Cached derived progress (0-100), mirroring the latest input-history
    /// entry. Informational only; it never changes `status` by itself.
    #[validate(range(min = 0, max = 100))]
    pub progress: u8,

    pub due_date: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Task {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl TeamScoped for Task {
    fn team_id(&self) -> Option<Id> {
        Some(self.team_id)
    }
}

impl Entity for Task {
    const TABLE_NAME: &'static str = "tasks";
    const TYPE_NAME: &'static str = "Task";
}

impl Task {
    /// Whether the task still counts against its assignee as open work.
    /// The assignment engine treats a member with any pending task as busy.
    pub fn is_open_pending(&self) -> bool {
        matches!(self.status, TaskStatus::Pending)
    }

    pub fn is_editable(&self) -> bool {
        !self.status.is_completed()
    }

    pub fn is_awaiting_review(&self) -> bool {
        self.status.is_completed() && self.review_status == ReviewStatus::Pending
    }
}

/// New task creation parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_to: Id,

    #[serde(default)]
    pub priority: Priority,

    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, assigned_to: Id) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            assigned_to,
            priority: Priority::default(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}
