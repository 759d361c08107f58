//! Store traits
//!
//! One trait per entity family, plus a `Storage` aggregate the services
//! depend on. The three multi-write methods (`commit_assignment`,
//! `finalize_acceptance`, `delete_user_cascade`) are the transaction
//! boundaries of the system: an implementation must apply each one atomically
//! or reject it wholesale.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tf_core::traits::Id;
use tf_models::automatic_task::AutomaticTask;
use tf_models::completed_task::CompletedTask;
use tf_models::input_history::TaskInputHistory;
use tf_models::performance::Performance;
use tf_models::task::Task;
use tf_models::team::Team;
use tf_models::user::{Role, User};

use crate::error::StoreResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Id) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Persist a new user, assigning id and timestamps
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn update_user(&self, user: &User) -> StoreResult<()>;

    /// Users of a role, optionally narrowed to one team
    async fn users_with_role(&self, role: Role, team_id: Option<Id>) -> StoreResult<Vec<User>>;

    /// Delete a user together with their open work, atomically
    ///
    /// Open tasks move to `replacement`, and if the user led a team the
    /// replacement becomes that team's lead (joining the team). Rejected
    /// wholesale when the replacement does not exist.
    async fn delete_user_cascade(&self, user_id: Id, replacement: Option<Id>) -> StoreResult<()>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn find_team(&self, id: Id) -> StoreResult<Option<Team>>;

    async fn create_team(&self, team: Team) -> StoreResult<Team>;

    async fn update_team(&self, team: &Team) -> StoreResult<()>;

    /// The team a user leads, if any (one-lead-per-user invariant check)
    async fn team_led_by(&self, user_id: Id) -> StoreResult<Option<Team>>;

    async fn all_teams(&self) -> StoreResult<Vec<Team>>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_task(&self, id: Id) -> StoreResult<Option<Task>>;

    /// Persist a new task, assigning id and timestamps
    async fn create_task(&self, task: Task) -> StoreResult<Task>;

    async fn update_task(&self, task: &Task) -> StoreResult<()>;

    async fn tasks_for_assignee(&self, user_id: Id) -> StoreResult<Vec<Task>>;

    /// Number of `status=pending` tasks held by a user. Zero means idle.
    async fn pending_task_count(&self, user_id: Id) -> StoreResult<i64>;

    /// Migrate an accepted task to its permanent record: insert the
    /// completed record and delete the active task as one unit
    async fn finalize_acceptance(
        &self,
        task_id: Id,
        completed: CompletedTask,
    ) -> StoreResult<CompletedTask>;
}

#[async_trait]
pub trait BacklogStore: Send + Sync {
    async fn find_backlog_task(&self, id: Id) -> StoreResult<Option<AutomaticTask>>;

    async fn create_backlog_task(&self, task: AutomaticTask) -> StoreResult<AutomaticTask>;

    /// All `status=pending` backlog tasks, unordered
    async fn pending_backlog(&self) -> StoreResult<Vec<AutomaticTask>>;

    async fn pending_backlog_for_team(&self, team_id: Id) -> StoreResult<Vec<AutomaticTask>>;

    /// Bind one backlog task to one worker: create the manually assigned
    /// task and mark the backlog entry `assigned`, as one unit.
    ///
    /// Re-validates immediately before committing that the backlog entry is
    /// still pending and, when `require_idle` is set, that the worker still
    /// has no pending task. A failed re-validation returns
    /// [`StorageError::Conflict`](crate::error::StorageError) and applies
    /// nothing.
    async fn commit_assignment(
        &self,
        backlog_id: Id,
        task: Task,
        assigned_by: Id,
        assigned_at: DateTime<Utc>,
        require_idle: bool,
    ) -> StoreResult<Task>;
}

#[async_trait]
pub trait CompletedTaskStore: Send + Sync {
    async fn completed_for_user(&self, user_id: Id) -> StoreResult<Vec<CompletedTask>>;

    async fn find_completed_by_task(&self, task_id: Id) -> StoreResult<Option<CompletedTask>>;
}

#[async_trait]
pub trait PerformanceStore: Send + Sync {
    async fn find_performance(&self, user_id: Id) -> StoreResult<Option<Performance>>;

    /// Insert or replace a user's aggregate
    async fn upsert_performance(&self, performance: Performance) -> StoreResult<Performance>;

    async fn all_performances(&self) -> StoreResult<Vec<Performance>>;
}

#[async_trait]
pub trait InputHistoryStore: Send + Sync {
    /// Append a snapshot, assigning id and timestamp
    async fn append_history(&self, entry: TaskInputHistory) -> StoreResult<TaskInputHistory>;

    /// The newest snapshot for a task, the current progress source of truth
    async fn latest_history(&self, task_id: Id) -> StoreResult<Option<TaskInputHistory>>;
}

/// Aggregate storage collaborator the services depend on
pub trait Storage:
    UserStore
    + TeamStore
    + TaskStore
    + BacklogStore
    + CompletedTaskStore
    + PerformanceStore
    + InputHistoryStore
{
}

impl<T> Storage for T where
    T: UserStore
        + TeamStore
        + TaskStore
        + BacklogStore
        + CompletedTaskStore
        + PerformanceStore
        + InputHistoryStore
{
}
