//! Create service for tasks

use std::sync::Arc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::{Actor, Contract};
use tf_contracts::tasks::CreateTaskContract;
use tf_core::error::Error;
use tf_models::task::{NewTask, ReviewStatus, Task, TaskStatus};
use tf_notifications::{NotificationCategory, NotificationStore, Notifier};
use tf_store::{Storage, TaskStore, UserStore};

use crate::result::ServiceResult;

/// Service for creating manually assigned tasks
///
/// The caller's team value is never trusted: `team_id` is always forced to
/// the assignee's team. Any rejection happens before the task is persisted.
pub struct CreateTaskService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    store: Arc<S>,
    notifier: Notifier<N>,
}

impl<S, N> CreateTaskService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    pub fn new(store: Arc<S>, notifier: Notifier<N>) -> Self {
        Self { store, notifier }
    }

    pub async fn call(&self, creator: &dyn Actor, params: NewTask) -> ServiceResult<Task> {
        let scope = match authorize(creator, Action::CreateTask) {
            Ok(scope) => scope,
            Err(e) => return ServiceResult::failure(e),
        };

        let assignee = match self.store.find_user(params.assigned_to).await {
            Ok(assignee) => assignee,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let contract = CreateTaskContract::new(creator, scope, assignee.as_ref());
        if let Err(errors) = contract.validate(&params) {
            return ServiceResult::failure_with_validation(errors);
        }

        // The contract guarantees an assignee with a team
        let team_id = match assignee.as_ref().and_then(|a| a.team_id) {
            Some(team_id) => team_id,
            None => {
                return ServiceResult::failure(Error::Internal(
                    "assignee lost their team between validation and creation".to_string(),
                ))
            }
        };

        let task = Task {
            id: None,
            title: params.title,
            description: params.description,
            assigned_to: params.assigned_to,
            assigned_by: creator.actor_id(),
            team_id,
            priority: params.priority,
            status: TaskStatus::Pending,
            review_status: ReviewStatus::Pending,
            progress: 0,
            due_date: params.due_date,
            completed_at: None,
            created_at: None,
            updated_at: None,
        };

        let created = match self.store.create_task(task).await {
            Ok(created) => created,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        self.notifier
            .try_notify(
                created.assigned_to,
                "New task assigned",
                format!("You have been assigned '{}'", created.title),
                NotificationCategory::TaskAssigned,
                created.id,
            )
            .await;

        tracing::info!(
            task_id = ?created.id,
            assigned_to = created.assigned_to,
            assigned_by = created.assigned_by,
            team_id = created.team_id,
            "task created"
        );

        ServiceResult::success(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_models::user::{Role, User};
    use tf_notifications::MemoryNotificationStore;
    use tf_store::{MemoryStorage, TaskStore, UserStore};

    async fn setup() -> (Arc<MemoryStorage>, Notifier<MemoryNotificationStore>) {
        let store = Arc::new(MemoryStorage::new());
        let notifier = Notifier::new(Arc::new(MemoryNotificationStore::new()));
        (store, notifier)
    }

    async fn seeded_user(store: &MemoryStorage, role: Role, team: Option<i64>) -> User {
        let mut user = User::new("u", format!("{:?}@example.com", role), role);
        user.team_id = team;
        store.create_user(user).await.unwrap()
    }

    #[tokio::test]
    async fn test_lead_creates_for_own_member() {
        let (store, notifier) = setup().await;
        let lead = seeded_user(&store, Role::TeamLead, Some(1)).await;
        let member = seeded_user(&store, Role::TeamMember, Some(1)).await;

        let service = CreateTaskService::new(Arc::clone(&store), notifier.clone());
        let result = service
            .call(&lead, NewTask::new("Write docs", member.id.unwrap()))
            .await;

        assert!(result.is_success());
        let task = result.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.review_status, ReviewStatus::Pending);
        assert_eq!(task.team_id, 1);
        assert_eq!(task.assigned_by, lead.id.unwrap());

        // The assignee was notified
        assert_eq!(
            notifier
                .store()
                .unread_count(member.id.unwrap())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_lead_cannot_create_for_other_team() {
        let (store, notifier) = setup().await;
        let lead = seeded_user(&store, Role::TeamLead, Some(1)).await;
        let outsider = seeded_user(&store, Role::TeamMember, Some(2)).await;

        let service = CreateTaskService::new(Arc::clone(&store), notifier);
        let result = service
            .call(&lead, NewTask::new("Write docs", outsider.id.unwrap()))
            .await;

        assert!(result.is_failure());
        assert!(result.validation_errors().unwrap().has_error("team_id"));

        // Nothing was persisted
        let tasks = store
            .tasks_for_assignee(outsider.id.unwrap())
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_member_cannot_create() {
        let (store, notifier) = setup().await;
        let member = seeded_user(&store, Role::TeamMember, Some(1)).await;
        let peer = seeded_user(&store, Role::TeamMember, Some(1)).await;

        let service = CreateTaskService::new(Arc::clone(&store), notifier);
        let result = service
            .call(&member, NewTask::new("Sneaky", peer.id.unwrap()))
            .await;

        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_admin_creates_for_lead_and_forces_team() {
        let (store, notifier) = setup().await;
        let admin = seeded_user(&store, Role::Admin, None).await;
        let lead = seeded_user(&store, Role::TeamLead, Some(4)).await;

        let service = CreateTaskService::new(Arc::clone(&store), notifier);
        let result = service
            .call(&admin, NewTask::new("Plan sprint", lead.id.unwrap()))
            .await;

        let task = result.unwrap();
        assert_eq!(task.team_id, 4);
    }

    #[tokio::test]
    async fn test_missing_assignee_rejected() {
        let (store, notifier) = setup().await;
        let admin = seeded_user(&store, Role::Admin, None).await;

        let service = CreateTaskService::new(Arc::clone(&store), notifier);
        let result = service.call(&admin, NewTask::new("Orphan", 999)).await;

        assert!(result
            .validation_errors()
            .unwrap()
            .has_error("assigned_to"));
    }
}
