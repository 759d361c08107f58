//! In-memory storage
//!
//! Reference implementation and test double. All collections live behind a
//! single `RwLock`; each multi-write method holds the write guard for its
//! whole body, which is what makes it the transaction boundary here. A SQL
//! adapter would use a row transaction instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tf_core::traits::Id;
use tf_models::automatic_task::{AutomaticTask, BacklogStatus};
use tf_models::completed_task::CompletedTask;
use tf_models::input_history::TaskInputHistory;
use tf_models::performance::Performance;
use tf_models::task::{Task, TaskStatus};
use tf_models::team::Team;
use tf_models::user::{Role, User};

use crate::error::{StorageError, StoreResult};
use crate::traits::{
    BacklogStore, CompletedTaskStore, InputHistoryStore, PerformanceStore, TaskStore, TeamStore,
    UserStore,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    teams: Vec<Team>,
    tasks: Vec<Task>,
    backlog: Vec<AutomaticTask>,
    completed: Vec<CompletedTask>,
    performances: Vec<Performance>,
    history: Vec<TaskInputHistory>,
    next_id: Id,
}

impl State {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn pending_count(&self, user_id: Id) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.assigned_to == user_id && t.status == TaskStatus::Pending)
            .count() as i64
    }
}

/// In-memory storage for development and tests
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn find_user(&self, id: Id) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, mut user: User) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        user.id = Some(state.next_id());
        user.created_at = Some(now);
        user.updated_at = Some(now);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let pos = state
            .users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or_else(|| StorageError::NotFound(format!("user {:?}", user.id)))?;
        let mut updated = user.clone();
        updated.updated_at = Some(Utc::now());
        state.users[pos] = updated;
        Ok(())
    }

    async fn users_with_role(&self, role: Role, team_id: Option<Id>) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| u.role == role)
            .filter(|u| team_id.is_none() || u.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn delete_user_cascade(&self, user_id: Id, replacement: Option<Id>) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let user_pos = state
            .users
            .iter()
            .position(|u| u.id == Some(user_id))
            .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))?;

        let open_tasks: Vec<usize> = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.assigned_to == user_id)
            .map(|(i, _)| i)
            .collect();
        let led_team = state
            .teams
            .iter()
            .position(|t| t.lead_id == Some(user_id));

        if (led_team.is_some() || !open_tasks.is_empty()) && replacement.is_none() {
            return Err(StorageError::Inconsistent(format!(
                "user {user_id} has open work and no replacement was named"
            )));
        }

        if let Some(replacement_id) = replacement {
            if !state.users.iter().any(|u| u.id == Some(replacement_id)) {
                return Err(StorageError::NotFound(format!(
                    "replacement user {replacement_id}"
                )));
            }

            let now = Utc::now();
            for i in open_tasks {
                state.tasks[i].assigned_to = replacement_id;
                state.tasks[i].updated_at = Some(now);
            }
            if let Some(team_pos) = led_team {
                state.teams[team_pos].lead_id = Some(replacement_id);
                state.teams[team_pos].updated_at = Some(now);
                let team_id = state.teams[team_pos].id;
                if let Some(repl) = state
                    .users
                    .iter_mut()
                    .find(|u| u.id == Some(replacement_id))
                {
                    repl.team_id = team_id;
                    repl.updated_at = Some(now);
                }
            }
        }

        state.users.remove(user_pos);
        Ok(())
    }
}

#[async_trait]
impl TeamStore for MemoryStorage {
    async fn find_team(&self, id: Id) -> StoreResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.iter().find(|t| t.id == Some(id)).cloned())
    }

    async fn create_team(&self, mut team: Team) -> StoreResult<Team> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        team.id = Some(state.next_id());
        team.created_at = Some(now);
        team.updated_at = Some(now);
        state.teams.push(team.clone());
        Ok(team)
    }

    async fn update_team(&self, team: &Team) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let pos = state
            .teams
            .iter()
            .position(|t| t.id == team.id)
            .ok_or_else(|| StorageError::NotFound(format!("team {:?}", team.id)))?;
        let mut updated = team.clone();
        updated.updated_at = Some(Utc::now());
        state.teams[pos] = updated;
        Ok(())
    }

    async fn team_led_by(&self, user_id: Id) -> StoreResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .iter()
            .find(|t| t.lead_id == Some(user_id))
            .cloned())
    }

    async fn all_teams(&self) -> StoreResult<Vec<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryStorage {
    async fn find_task(&self, id: Id) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == Some(id)).cloned())
    }

    async fn create_task(&self, mut task: Task) -> StoreResult<Task> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        task.id = Some(state.next_id());
        task.created_at = Some(now);
        task.updated_at = Some(now);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let pos = state
            .tasks
            .iter()
            .position(|t| t.id == task.id)
            .ok_or_else(|| StorageError::NotFound(format!("task {:?}", task.id)))?;
        let mut updated = task.clone();
        updated.updated_at = Some(Utc::now());
        state.tasks[pos] = updated;
        Ok(())
    }

    async fn tasks_for_assignee(&self, user_id: Id) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.assigned_to == user_id)
            .cloned()
            .collect())
    }

    async fn pending_task_count(&self, user_id: Id) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state.pending_count(user_id))
    }

    async fn finalize_acceptance(
        &self,
        task_id: Id,
        mut completed: CompletedTask,
    ) -> StoreResult<CompletedTask> {
        let mut state = self.state.write().await;

        let pos = state
            .tasks
            .iter()
            .position(|t| t.id == Some(task_id))
            .ok_or_else(|| StorageError::NotFound(format!("task {task_id}")))?;

        completed.id = Some(state.next_id());
        state.completed.push(completed.clone());
        state.tasks.remove(pos);
        Ok(completed)
    }
}

#[async_trait]
impl BacklogStore for MemoryStorage {
    async fn find_backlog_task(&self, id: Id) -> StoreResult<Option<AutomaticTask>> {
        let state = self.state.read().await;
        Ok(state.backlog.iter().find(|t| t.id == Some(id)).cloned())
    }

    async fn create_backlog_task(&self, mut task: AutomaticTask) -> StoreResult<AutomaticTask> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        task.id = Some(state.next_id());
        task.created_at = Some(now);
        task.updated_at = Some(now);
        state.backlog.push(task.clone());
        Ok(task)
    }

    async fn pending_backlog(&self) -> StoreResult<Vec<AutomaticTask>> {
        let state = self.state.read().await;
        Ok(state
            .backlog
            .iter()
            .filter(|t| t.is_pending())
            .cloned()
            .collect())
    }

    async fn pending_backlog_for_team(&self, team_id: Id) -> StoreResult<Vec<AutomaticTask>> {
        let state = self.state.read().await;
        Ok(state
            .backlog
            .iter()
            .filter(|t| t.is_pending() && t.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn commit_assignment(
        &self,
        backlog_id: Id,
        mut task: Task,
        assigned_by: Id,
        assigned_at: DateTime<Utc>,
        require_idle: bool,
    ) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        let pos = state
            .backlog
            .iter()
            .position(|t| t.id == Some(backlog_id))
            .ok_or_else(|| StorageError::NotFound(format!("backlog task {backlog_id}")))?;

        // Re-validation under the write guard: the check-then-act gap
        // between the sweep's read and this commit closes here.
        if !state.backlog[pos].is_pending() {
            return Err(StorageError::Conflict(format!(
                "backlog task {backlog_id} is already assigned"
            )));
        }
        if require_idle && state.pending_count(task.assigned_to) > 0 {
            return Err(StorageError::Conflict(format!(
                "worker {} is no longer idle",
                task.assigned_to
            )));
        }

        task.id = Some(state.next_id());
        task.created_at = Some(assigned_at);
        task.updated_at = Some(assigned_at);
        state.tasks.push(task.clone());

        let entry = &mut state.backlog[pos];
        entry.status = BacklogStatus::Assigned;
        entry.assigned_to = Some(task.assigned_to);
        entry.assigned_by = Some(assigned_by);
        entry.assigned_at = Some(assigned_at);
        entry.updated_at = Some(assigned_at);

        Ok(task)
    }
}

#[async_trait]
impl CompletedTaskStore for MemoryStorage {
    async fn completed_for_user(&self, user_id: Id) -> StoreResult<Vec<CompletedTask>> {
        let state = self.state.read().await;
        Ok(state
            .completed
            .iter()
            .filter(|c| c.assigned_to == user_id)
            .cloned()
            .collect())
    }

    async fn find_completed_by_task(&self, task_id: Id) -> StoreResult<Option<CompletedTask>> {
        let state = self.state.read().await;
        Ok(state
            .completed
            .iter()
            .find(|c| c.task_id == task_id)
            .cloned())
    }
}

#[async_trait]
impl PerformanceStore for MemoryStorage {
    async fn find_performance(&self, user_id: Id) -> StoreResult<Option<Performance>> {
        let state = self.state.read().await;
        Ok(state
            .performances
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_performance(&self, mut performance: Performance) -> StoreResult<Performance> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        performance.updated_at = Some(now);

        if let Some(pos) = state
            .performances
            .iter()
            .position(|p| p.user_id == performance.user_id)
        {
            performance.id = state.performances[pos].id;
            performance.created_at = state.performances[pos].created_at;
            state.performances[pos] = performance.clone();
        } else {
            performance.id = Some(state.next_id());
            performance.created_at = Some(now);
            state.performances.push(performance.clone());
        }
        Ok(performance)
    }

    async fn all_performances(&self) -> StoreResult<Vec<Performance>> {
        let state = self.state.read().await;
        Ok(state.performances.clone())
    }
}

#[async_trait]
impl InputHistoryStore for MemoryStorage {
    async fn append_history(&self, mut entry: TaskInputHistory) -> StoreResult<TaskInputHistory> {
        let mut state = self.state.write().await;
        entry.id = Some(state.next_id());
        entry.created_at = Some(Utc::now());
        state.history.push(entry.clone());
        Ok(entry)
    }

    async fn latest_history(&self, task_id: Id) -> StoreResult<Option<TaskInputHistory>> {
        let state = self.state.read().await;
        // Ids are monotonic, so the highest id is the newest entry
        Ok(state
            .history
            .iter()
            .filter(|h| h.task_id == task_id)
            .max_by_key(|h| h.id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_models::task::{NewTask, Priority, ReviewStatus};

    fn task_for(assigned_to: Id, team_id: Id) -> Task {
        Task {
            id: None,
            title: "work".to_string(),
            description: String::new(),
            assigned_to,
            assigned_by: 1,
            team_id,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            review_status: ReviewStatus::Pending,
            progress: 0,
            due_date: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn backlog_for(team_id: Id) -> AutomaticTask {
        AutomaticTask {
            id: None,
            title: "backlog".to_string(),
            description: String::new(),
            priority: Priority::Medium,
            team_id,
            status: BacklogStatus::Pending,
            assigned_to: None,
            assigned_by: None,
            assigned_at: None,
            due_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStorage::new();
        let user = store
            .create_user(User::new("Ada", "ada@example.com", Role::TeamMember))
            .await
            .unwrap();

        let found = store.find_user(user.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");
        assert!(found.created_at.is_some());
    }

    #[tokio::test]
    async fn test_commit_assignment_marks_both_sides() {
        let store = MemoryStorage::new();
        let entry = store.create_backlog_task(backlog_for(1)).await.unwrap();

        let created = store
            .commit_assignment(entry.id.unwrap(), task_for(10, 1), 2, Utc::now(), true)
            .await
            .unwrap();

        assert_eq!(created.assigned_to, 10);
        let entry = store
            .find_backlog_task(entry.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, BacklogStatus::Assigned);
        assert_eq!(entry.assigned_to, Some(10));
        assert!(entry.assigned_at.is_some());
    }

    #[tokio::test]
    async fn test_commit_assignment_rejects_double_assign() {
        let store = MemoryStorage::new();
        let entry = store.create_backlog_task(backlog_for(1)).await.unwrap();
        let id = entry.id.unwrap();

        store
            .commit_assignment(id, task_for(10, 1), 2, Utc::now(), false)
            .await
            .unwrap();

        let err = store
            .commit_assignment(id, task_for(11, 1), 2, Utc::now(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // No second task appeared
        assert_eq!(store.tasks_for_assignee(11).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_commit_assignment_revalidates_idleness() {
        let store = MemoryStorage::new();
        let entry = store.create_backlog_task(backlog_for(1)).await.unwrap();

        // Worker picks up a pending task between the sweep read and commit
        store.create_task(task_for(10, 1)).await.unwrap();

        let err = store
            .commit_assignment(entry.id.unwrap(), task_for(10, 1), 2, Utc::now(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // Entry untouched
        let entry = store
            .find_backlog_task(entry.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(entry.is_pending());
    }

    #[tokio::test]
    async fn test_finalize_acceptance_moves_record() {
        let store = MemoryStorage::new();
        let task = store.create_task(task_for(10, 1)).await.unwrap();
        let task_id = task.id.unwrap();

        let completed = CompletedTask::from_task(&task, task_id, 2, Utc::now(), "done");
        store.finalize_acceptance(task_id, completed).await.unwrap();

        assert!(store.find_task(task_id).await.unwrap().is_none());
        let record = store
            .find_completed_by_task(task_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.work_done, "done");
    }

    #[tokio::test]
    async fn test_delete_user_cascade_requires_replacement() {
        let store = MemoryStorage::new();
        let worker = store
            .create_user(User::new("W", "w@example.com", Role::TeamMember))
            .await
            .unwrap();
        store
            .create_task(task_for(worker.id.unwrap(), 1))
            .await
            .unwrap();

        let err = store
            .delete_user_cascade(worker.id.unwrap(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Inconsistent(_)));

        // Nothing was deleted
        assert!(store.find_user(worker.id.unwrap()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_lead_cascade_transfers_team() {
        let store = MemoryStorage::new();
        let lead = store
            .create_user(User::new("L", "l@example.com", Role::TeamLead))
            .await
            .unwrap();
        let replacement = store
            .create_user(User::new("R", "r@example.com", Role::TeamLead))
            .await
            .unwrap();
        let mut team = store.create_team(Team::new("Platform")).await.unwrap();
        team.lead_id = lead.id;
        store.update_team(&team).await.unwrap();

        store
            .delete_user_cascade(lead.id.unwrap(), replacement.id)
            .await
            .unwrap();

        assert!(store.find_user(lead.id.unwrap()).await.unwrap().is_none());
        let team = store.find_team(team.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(team.lead_id, replacement.id);
        let replacement = store
            .find_user(replacement.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replacement.team_id, team.id);
    }

    #[tokio::test]
    async fn test_latest_history_wins() {
        let store = MemoryStorage::new();
        store
            .append_history(TaskInputHistory::snapshot(1, 10, "first"))
            .await
            .unwrap();
        store
            .append_history(TaskInputHistory::snapshot(1, 10, "second"))
            .await
            .unwrap();
        store
            .append_history(TaskInputHistory::snapshot(2, 10, "other task"))
            .await
            .unwrap();

        let latest = store.latest_history(1).await.unwrap().unwrap();
        assert_eq!(latest.content, "second");
    }

    #[tokio::test]
    async fn test_upsert_performance_replaces() {
        let store = MemoryStorage::new();
        let mut perf = Performance::empty(10);
        perf.completed_tasks = 1;
        let first = store.upsert_performance(perf.clone()).await.unwrap();

        perf.completed_tasks = 2;
        let second = store.upsert_performance(perf).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.all_performances().await.unwrap().len(), 1);
        assert_eq!(
            store.find_performance(10).await.unwrap().unwrap().completed_tasks,
            2
        );
    }

    #[test]
    fn test_new_task_builder() {
        let new_task = NewTask::new("Check logs", 5)
            .with_priority(Priority::High)
            .with_description("rotate and inspect");
        assert_eq!(new_task.priority, Priority::High);
        assert_eq!(new_task.assigned_to, 5);
    }
}
