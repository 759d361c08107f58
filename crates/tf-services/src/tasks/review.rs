//! Review service
//!
//! Acceptance is the task's terminal state: the record migrates to the
//! permanent completed set and the active row is deleted, atomically.
//! Rejection and needs-improvement rewind the task to `in_progress`.

use std::sync::Arc;

use chrono::Utc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::Actor;
use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::completed_task::CompletedTask;
use tf_models::task::{ReviewStatus, Task, TaskStatus};
use tf_notifications::{NotificationCategory, NotificationStore, Notifier};
use tf_store::{InputHistoryStore, Storage, TaskStore};

use crate::performance::PerformanceService;
use crate::result::ServiceResult;

/// Reviewer's verdict on a completed task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
    NeedsImprovement,
}

/// What the review did to the task
#[derive(Debug)]
pub enum ReviewOutcome {
    /// The task was migrated to its permanent record and removed from the
    /// active set
    Accepted(CompletedTask),
    /// The task was reopened for editing with the given review status
    Reopened(Task),
}

/// Service for reviewing completed tasks
pub struct ReviewTaskService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    store: Arc<S>,
    notifier: Notifier<N>,
    performance: PerformanceService<S>,
}

impl<S, N> ReviewTaskService<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    pub fn new(store: Arc<S>, notifier: Notifier<N>) -> Self {
        let performance = PerformanceService::new(Arc::clone(&store));
        Self {
            store,
            notifier,
            performance,
        }
    }

    pub async fn call(
        &self,
        reviewer: &dyn Actor,
        task_id: Id,
        decision: ReviewDecision,
    ) -> ServiceResult<ReviewOutcome> {
        let scope = match authorize(reviewer, Action::ReviewTask) {
            Ok(scope) => scope,
            Err(e) => return ServiceResult::failure(e),
        };

        let task = match self.store.find_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found("Task", "id", task_id))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if !scope.permits_team(reviewer, task.team_id) {
            return ServiceResult::failure(Error::forbidden("task is not in your team"));
        }

        if !task.status.is_completed() {
            return ServiceResult::failure(Error::precondition(
                "only completed tasks can be reviewed",
            ));
        }

        match decision {
            ReviewDecision::Accept => self.accept(reviewer, task_id, task).await,
            ReviewDecision::Reject => {
                self.reopen(task, ReviewStatus::Rejected).await
            }
            ReviewDecision::NeedsImprovement => {
                self.reopen(task, ReviewStatus::NeedsImprovement).await
            }
        }
    }

    /// Accept path: snapshot work done, migrate the record, then fire the
    /// best-effort side effects (notification, performance recompute)
    async fn accept(
        &self,
        reviewer: &dyn Actor,
        task_id: Id,
        task: Task,
    ) -> ServiceResult<ReviewOutcome> {
        let work_done = match self.store.latest_history(task_id).await {
            Ok(entry) => entry.map(|e| e.content).unwrap_or_default(),
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let completed = CompletedTask::from_task(
            &task,
            task_id,
            reviewer.actor_id(),
            Utc::now(),
            work_done,
        );

        let record = match self.store.finalize_acceptance(task_id, completed).await {
            Ok(record) => record,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        tracing::info!(
            task_id,
            accepted_by = record.accepted_by,
            assigned_to = record.assigned_to,
            "task accepted"
        );

        self.notifier
            .try_notify(
                record.assigned_to,
                "Task accepted",
                format!("'{}' was accepted", record.title),
                NotificationCategory::ReviewAccepted,
                Some(task_id),
            )
            .await;

        // Derived data; a failure here must not undo the acceptance
        let recompute = self.performance.recompute(record.assigned_to).await;
        if let Some(e) = recompute.error() {
            tracing::warn!(
                user_id = record.assigned_to,
                "performance recompute failed: {e}"
            );
        }

        ServiceResult::success(ReviewOutcome::Accepted(record))
    }

    /// Reject / needs-improvement path: rewind to `in_progress`
    async fn reopen(
        &self,
        mut task: Task,
        review_status: ReviewStatus,
    ) -> ServiceResult<ReviewOutcome> {
        task.review_status = review_status;
        task.status = TaskStatus::InProgress;
        task.completed_at = None;

        if let Err(e) = self.store.update_task(&task).await {
            return ServiceResult::failure(e.into());
        }

        let (title, category) = match review_status {
            ReviewStatus::Rejected => ("Task rejected", NotificationCategory::ReviewRejected),
            _ => (
                "Task needs improvement",
                NotificationCategory::NeedsImprovement,
            ),
        };
        self.notifier
            .try_notify(
                task.assigned_to,
                title,
                format!("'{}' was sent back for changes", task.title),
                category,
                task.id,
            )
            .await;

        ServiceResult::success(ReviewOutcome::Reopened(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_models::task::NewTask;
    use tf_models::team::Team;
    use tf_models::user::{Role, User};
    use tf_notifications::MemoryNotificationStore;
    use tf_store::{CompletedTaskStore, MemoryStorage, PerformanceStore, TeamStore, UserStore};

    use crate::tasks::create::CreateTaskService;
    use crate::tasks::progress::UpdateProgressService;
    use crate::tasks::submit::SubmitForReviewService;

    fn complete_report() -> String {
        let paragraph = "Implemented the importer and wired it to the staging bucket. \
            Verified row counts against the source extract. \
            Added retries around the flaky upstream endpoint. "
            .repeat(2);
        format!("{paragraph}\n\n{paragraph}")
    }

    struct Fixture {
        store: Arc<MemoryStorage>,
        notifier: Notifier<MemoryNotificationStore>,
        lead: User,
        member: User,
        task: Task,
    }

    /// Seed a team with a lead and a member holding one submitted task
    async fn submitted_fixture() -> Fixture {
        let store = Arc::new(MemoryStorage::new());
        let notifier = Notifier::new(Arc::new(MemoryNotificationStore::new()));

        let team = store.create_team(Team::new("Platform")).await.unwrap();
        let team_id = team.id.unwrap();

        let mut lead = User::new("L", "l@example.com", Role::TeamLead);
        lead.team_id = Some(team_id);
        let lead = store.create_user(lead).await.unwrap();

        let mut team = team;
        team.lead_id = lead.id;
        store.update_team(&team).await.unwrap();

        let mut member = User::new("M", "m@example.com", Role::TeamMember);
        member.team_id = Some(team_id);
        let member = store.create_user(member).await.unwrap();

        let create = CreateTaskService::new(Arc::clone(&store), notifier.clone());
        let task = create
            .call(&lead, NewTask::new("Import pipeline", member.id.unwrap()))
            .await
            .unwrap();

        let report = complete_report();
        let edit = UpdateProgressService::new(Arc::clone(&store));
        edit.call(&member, task.id.unwrap(), &report).await.unwrap();

        let submit = SubmitForReviewService::new(Arc::clone(&store), notifier.clone());
        let task = submit
            .call(&member, task.id.unwrap(), &report)
            .await
            .unwrap();

        Fixture {
            store,
            notifier,
            lead,
            member,
            task,
        }
    }

    #[tokio::test]
    async fn test_accept_is_terminal() {
        let f = submitted_fixture().await;
        let task_id = f.task.id.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        let result = review.call(&f.lead, task_id, ReviewDecision::Accept).await;

        let outcome = result.unwrap();
        let record = match outcome {
            ReviewOutcome::Accepted(record) => record,
            other => panic!("expected acceptance, got {other:?}"),
        };

        // Gone from the active set, exactly one permanent record
        assert!(f.store.find_task(task_id).await.unwrap().is_none());
        let stored = f
            .store
            .find_completed_by_task(task_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.accepted_by, f.lead.id.unwrap());
        assert!(!stored.work_done.is_empty());

        // Assignee was told, aggregate was rebuilt
        let member_id = f.member.id.unwrap();
        assert!(f.notifier.store().unread_count(member_id).await.unwrap() >= 1);
        let perf = f
            .store
            .find_performance(member_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(perf.completed_tasks, 1);
    }

    #[tokio::test]
    async fn test_reject_reopens() {
        let f = submitted_fixture().await;
        let task_id = f.task.id.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        let result = review.call(&f.lead, task_id, ReviewDecision::Reject).await;
        assert!(result.is_success());

        let task = f.store.find_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.review_status, ReviewStatus::Rejected);
        assert!(task.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_needs_improvement_reopens() {
        let f = submitted_fixture().await;
        let task_id = f.task.id.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        review
            .call(&f.lead, task_id, ReviewDecision::NeedsImprovement)
            .await
            .unwrap();

        let task = f.store.find_task(task_id).await.unwrap().unwrap();
        assert_eq!(task.review_status, ReviewStatus::NeedsImprovement);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_resubmit_after_reject() {
        let f = submitted_fixture().await;
        let task_id = f.task.id.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        review
            .call(&f.lead, task_id, ReviewDecision::Reject)
            .await
            .unwrap();

        let report = format!("{}\n\nAddressed the review feedback in detail.", complete_report());
        let edit = UpdateProgressService::new(Arc::clone(&f.store));
        edit.call(&f.member, task_id, &report).await.unwrap();

        let submit = SubmitForReviewService::new(Arc::clone(&f.store), f.notifier.clone());
        let resubmitted = submit.call(&f.member, task_id, &report).await;
        assert!(resubmitted.is_success());

        let accepted = review.call(&f.lead, task_id, ReviewDecision::Accept).await;
        assert!(accepted.is_success());
    }

    #[tokio::test]
    async fn test_other_team_lead_cannot_review() {
        let f = submitted_fixture().await;

        let mut other_lead = User::new("O", "o@example.com", Role::TeamLead);
        other_lead.team_id = Some(999);
        let other_lead = f.store.create_user(other_lead).await.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        let result = review
            .call(&other_lead, f.task.id.unwrap(), ReviewDecision::Accept)
            .await;

        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
        assert!(f
            .store
            .find_task(f.task.id.unwrap())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_member_cannot_review() {
        let f = submitted_fixture().await;

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        let result = review
            .call(&f.member, f.task.id.unwrap(), ReviewDecision::Accept)
            .await;

        assert!(matches!(result.error(), Some(Error::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_cannot_review_unsubmitted_task() {
        let f = submitted_fixture().await;
        let task_id = f.task.id.unwrap();

        let review = ReviewTaskService::new(Arc::clone(&f.store), f.notifier.clone());
        review
            .call(&f.lead, task_id, ReviewDecision::Reject)
            .await
            .unwrap();

        // Now in_progress; a second review attempt must fail the gate
        let result = review.call(&f.lead, task_id, ReviewDecision::Accept).await;
        assert!(matches!(result.error(), Some(Error::Precondition { .. })));
    }
}
