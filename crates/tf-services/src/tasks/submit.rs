//! Submit-for-review service

use std::sync::Arc;

use chrono::Utc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::Actor;
use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::task::{ReviewStatus, Task, TaskStatus};
use tf_notifications::{NotificationCategory, NotificationStore, Notifier};
use tf_store::{InputHistoryStore, Storage, TaskStore, TeamStore};

use crate::result::ServiceResult;

/// Service for submitting an assigned task for review
///
/// The gate reads the latest *persisted* input-history snapshot: it must
/// match the content being submitted (save-then-submit invariant) and derive
/// to 100. On success the task flips to `completed`, `completed_at` is
/// stamped, the review status resets to pending, and the team lead is
/// notified.
pub struct SubmitForReviewService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    store: Arc<S>,
    notifier: Notifier<N>,
}

impl<S, N> SubmitForReviewService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    pub fn new(store: Arc<S>, notifier: Notifier<N>) -> Self {
        Self { store, notifier }
    }

    pub async fn call(
        &self,
        actor: &dyn Actor,
        task_id: Id,
        editor_content: &str,
    ) -> ServiceResult<Task> {
        let scope = match authorize(actor, Action::SubmitForReview) {
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
                "only the assignee may submit a task for review",
            ));
        }

        if task.status.is_completed() {
            return ServiceResult::failure(Error::precondition(
                "task has already been submitted",
            ));
        }

        let latest = match self.store.latest_history(task_id).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                return ServiceResult::failure(Error::precondition(
                    "no saved progress to submit",
                ))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if latest.content != editor_content {
            return ServiceResult::failure(Error::precondition(
                "unsaved edits present; save the latest progress before submitting",
            ));
        }

        if latest.progress < 100 {
            return ServiceResult::failure(Error::precondition(format!(
                "progress is {}%, submission requires 100%",
                latest.progress
            )));
        }

        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        task.review_status = ReviewStatus::Pending;
        task.progress = latest.progress;

        if let Err(e) = self.store.update_task(&task).await {
            return ServiceResult::failure(e.into());
        }

        self.notify_lead(&task).await;

        ServiceResult::success(task)
    }

    /// Tell the team lead there is work to review; best-effort
    async fn notify_lead(&self, task: &Task) {
        let lead_id = match self.store.find_team(task.team_id).await {
            Ok(Some(team)) => team.lead_id,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(team_id = task.team_id, "could not load team: {e}");
                None
            }
        };

        match lead_id {
            Some(lead_id) => {
                self.notifier
                    .try_notify(
                        lead_id,
                        "Task submitted for review",
                        format!("'{}' is ready for review", task.title),
                        NotificationCategory::SubmittedForReview,
                        task.id,
                    )
                    .await;
            }
            None => {
                tracing::warn!(team_id = task.team_id, "team has no lead to notify");
            }
        }
    }
}
