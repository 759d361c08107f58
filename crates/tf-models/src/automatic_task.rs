//! Automatic (backlog) task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, TeamScoped, Timestamped};
use validator::Validate;

use crate::task::Priority;

/// Backlog item status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacklogStatus {
    Pending,
    Assigned,
}

/// Backlog task entity, queued for the assignment engine
///
/// Not yet bound to a person. Once `assigned`, the record is owned by the
/// engine's audit trail and is never edited again.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticTask {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    pub team_id: Id,

    pub status: BacklogStatus,

    /// Set by the engine when the task is bound to a worker
    pub assigned_to: Option<Id>,
    pub assigned_by: Option<Id>,
    pub assigned_at: Option<DateTime<Utc>>,

    pub due_date: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for AutomaticTask {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for AutomaticTask {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl TeamScoped for AutomaticTask {
    fn team_id(&self) -> Option<Id> {
        Some(self.team_id)
    }
}

impl Entity for AutomaticTask {
    const TABLE_NAME: &'static str = "automatic_tasks";
    const TYPE_NAME: &'static str = "AutomaticTask";
}

impl AutomaticTask {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, BacklogStatus::Pending)
    }
}

/// New backlog task parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAutomaticTask {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    pub team_id: Id,

    pub due_date: Option<DateTime<Utc>>,
}

impl From<NewAutomaticTask> for AutomaticTask {
    fn from(new: NewAutomaticTask) -> Self {
        Self {
            id: None,
            title: new.title,
            description: new.description,
            priority: new.priority,
            team_id: new.team_id,
            status: BacklogStatus::Pending,
            assigned_to: None,
            assigned_by: None,
            assigned_at: None,
            due_date: new.due_date,
            created_at: None,
            updated_at: None,
        }
    }
}
