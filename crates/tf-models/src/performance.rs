//! Performance aggregate model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, Timestamped};

/// Per-user performance aggregate
///
/// Read-derived: rebuilt from the completed-task record set whenever a task
/// is accepted, never authored directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub id: Option<Id>,

    pub user_id: Id,

    /// Number of accepted tasks
    pub completed_tasks: i64,

    /// Percentage (0-100) of accepted tasks submitted on or before their due
    /// date, over the tasks where that is known
    pub on_time_completion: f64,

    /// Mean creation-to-completion duration in seconds
    pub average_task_duration: f64,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Performance {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Performance {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Performance {
    const TABLE_NAME: &'static str = "performances";
    const TYPE_NAME: &'static str = "Performance";
}

impl Performance {
    pub fn empty(user_id: Id) -> Self {
        Self {
            id: None,
            user_id,
            completed_tasks: 0,
            on_time_completion: 0.0,
            average_task_duration: 0.0,
            created_at: None,
            updated_at: None,
        }
    }
}
