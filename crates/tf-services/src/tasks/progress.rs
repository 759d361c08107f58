//! Progress edit service

use std::sync::Arc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::Actor;
use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::input_history::TaskInputHistory;
use tf_models::task::{Task, TaskStatus};
use tf_store::{InputHistoryStore, Storage, TaskStore};

use crate::result::ServiceResult;

/// Service for recording a progress-text edit on an assigned task
///
/// Appends an input-history snapshot with its derived percentage and mirrors
/// that percentage onto the task. The percentage is informational; the only
/// status effect of editing is that the first edit moves a pending task to
/// `in_progress`.
pub struct UpdateProgressService<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> UpdateProgressService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn call(
        &self,
        actor: &dyn Actor,
        task_id: Id,
        content: &str,
    ) -> ServiceResult<Task> {
        let scope = match authorize(actor, Action::EditProgress) {
            Ok(scope) => scope,
            Err(e) => return ServiceResult::failure(e),
        };

        let mut task = match self.store.find_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found("Task", "id", task_id))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if !scope.permits_user(actor, task.assigned_to) {
            return ServiceResult::failure(Error::forbidden(
                "only the assignee may edit progress",
            ));
        }

        if !task.is_editable() {
            return ServiceResult::failure(Error::precondition(
                "a completed task cannot be edited until a reviewer reopens it",
            ));
        }

        let entry = TaskInputHistory::snapshot(task_id, actor.actor_id(), content);
        let entry = match self.store.append_history(entry).await {
            Ok(entry) => entry,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        task.progress = entry.progress;
        if task.status == TaskStatus::Pending {
            task.status = TaskStatus::InProgress;
        }

        if let Err(e) = self.store.update_task(&task).await {
            return ServiceResult::failure(e.into());
        }

        ServiceResult::success(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_models::task::{NewTask, ReviewStatus};
    use tf_models::user::{Role, User};
    use tf_notifications::{MemoryNotificationStore, Notifier};
    use tf_store::{InputHistoryStore, MemoryStorage, TaskStore, UserStore};

    use crate::tasks::create::CreateTaskService;

    async fn seeded_task(store: &Arc<MemoryStorage>) -> (User, Task) {
        let admin = store
            .create_user(User::new("A", "a@example.com", Role::Admin))
            .await
            .unwrap();
        let mut member = User::new("M", "m@example.com", Role::TeamMember);
        member.team_id = Some(1);
        let member = store.create_user(member).await.unwrap();

        let notifier = Notifier::new(Arc::new(MemoryNotificationStore::new()));
        let create = CreateTaskService::new(Arc::clone(store), notifier);
        let task = create
            .call(&admin, NewTask::new("Write report", member.id.unwrap()))
            .await
            .unwrap();
        (member, task)
    }

    #[tokio::test]
    async fn test_edit_derives_progress_and_starts_task() {
        let store = Arc::new(MemoryStorage::new());
        let (member, task) = seeded_task(&store).await;

        let service = UpdateProgressService::new(Arc::clone(&store));
        let result = service
            .call(&member, task.id.unwrap(), "Started on the outline.")
            .await;

        let task = result.unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.progress > 0);

        let latest = store
            .latest_history(task.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.progress, task.progress);
    }

    #[tokio::test]
    async fn test_non_assignee_rejected() {
        let store = Arc::new(MemoryStorage::new());
        let (_member, task) = seeded_task(&store).await;

        let mut stranger = User::new("S", "s@example.com", Role::TeamMember);
        stranger.team_id = Some(1);
        let stranger = store.create_user(stranger).await.unwrap();

        let service = UpdateProgressService::new(Arc::clone(&store));
        let result = service.call(&stranger, task.id.unwrap(), "mine now").await;

        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_completed_task_not_editable() {
        let store = Arc::new(MemoryStorage::new());
        let (member, mut task) = seeded_task(&store).await;
        task.status = TaskStatus::Completed;
        task.review_status = ReviewStatus::Pending;
        store.update_task(&task).await.unwrap();

        let service = UpdateProgressService::new(Arc::clone(&store));
        let result = service.call(&member, task.id.unwrap(), "late edit").await;

        assert!(matches!(result.error(), Some(Error::Precondition { .. })));
    }

    #[tokio::test]
    async fn test_admin_cannot_edit() {
        let store = Arc::new(MemoryStorage::new());
        let (_member, task) = seeded_task(&store).await;
        let admin = store
            .create_user(User::new("A2", "a2@example.com", Role::Admin))
            .await
            .unwrap();

        let service = UpdateProgressService::new(Arc::clone(&store));
        let result = service.call(&admin, task.id.unwrap(), "admin edit").await;

        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
    }
}
