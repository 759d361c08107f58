//! Automatic assignment engine
//!
//! Distributes the pending backlog across idle team members. A worker is
//! idle when they hold zero `status=pending` tasks; each idle worker receives
//! at most one backlog task per sweep. Ordering is priority descending, then
//! oldest first. Every pairing commits atomically through the store, which
//! re-validates "still pending / still idle" under its write guard; a failed
//! re-validation is skipped, not an error.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::{Actor, Contract};
use tf_contracts::tasks::CreateBacklogContract;
use tf_core::config::AssignmentConfig;
use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::automatic_task::{AutomaticTask, NewAutomaticTask};
use tf_models::task::{ReviewStatus, Task, TaskStatus};
use tf_models::user::Role;
use tf_notifications::{NotificationCategory, NotificationStore, Notifier};
use tf_store::{BacklogStore, Storage, StorageError, TaskStore, TeamStore, UserStore};

use crate::result::ServiceResult;

/// One committed backlog-to-worker pairing
#[derive(Debug, Clone)]
pub struct Assignment {
    pub backlog_id: Id,
    pub task_id: Id,
    pub worker_id: Id,
    pub team_id: Id,
}

/// Outcome of one bulk sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    pub assignments: Vec<Assignment>,
    /// Pairings dropped because the commit-time re-validation failed
    pub skipped: usize,
}

/// The automatic assignment engine
pub struct AssignmentEngine<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    store: Arc<S>,
    notifier: Notifier<N>,
    config: AssignmentConfig,
    /// Recorded as `assigned_by` for sweep-driven pairings
    system_user: Id,
}

impl<S, N> AssignmentEngine<S, N>
where
    S: Storage,
    N: NotificationStore,
{
    pub fn new(
        store: Arc<S>,
        notifier: Notifier<N>,
        config: AssignmentConfig,
        system_user: Id,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            system_user,
        }
    }

    /// Queue a backlog task for a team
    pub async fn enqueue(
        &self,
        creator: &dyn Actor,
        params: NewAutomaticTask,
    ) -> ServiceResult<AutomaticTask> {
        let scope = match authorize(creator, Action::CreateBacklogTask) {
            Ok(scope) => scope,
            Err(e) => return ServiceResult::failure(e),
        };

        let contract = CreateBacklogContract::new(creator, scope);
        if let Err(errors) = contract.validate(&params) {
            return ServiceResult::failure_with_validation(errors);
        }

        match self.store.create_backlog_task(params.into()).await {
            Ok(created) => ServiceResult::success(created),
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    /// One bulk pass over every team's backlog
    ///
    /// Teams with no idle members are skipped; the bulk path never falls back
    /// to the team lead. If the pass dies partway through, the pairings it
    /// already committed stay committed.
    pub async fn sweep(&self) -> ServiceResult<SweepReport> {
        let mut idle = match self.idle_workers_by_team().await {
            Ok(idle) => idle,
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let mut backlog = match self.store.pending_backlog().await {
            Ok(backlog) => backlog,
            Err(e) => return ServiceResult::failure(e.into()),
        };
        sort_backlog(&mut backlog);

        let mut report = SweepReport::default();
        for entry in backlog {
            let backlog_id = match entry.id {
                Some(id) => id,
                None => continue,
            };
            let worker = match idle.get_mut(&entry.team_id).and_then(VecDeque::pop_front) {
                Some(worker) => worker,
                None => continue,
            };

            let task = task_from_backlog(&entry, worker, self.system_user);
            match self
                .store
                .commit_assignment(backlog_id, task, self.system_user, Utc::now(), true)
                .await
            {
                Ok(created) => {
                    self.record_assignment(&mut report, backlog_id, &created).await;
                }
                Err(StorageError::Conflict(reason)) => {
                    // Someone raced us between the idle read and the commit.
                    // The worker is not returned to the pool: if they went
                    // busy the pool entry is stale, and the next sweep
                    // re-reads everything anyway.
                    tracing::info!(backlog_id, worker, %reason, "assignment skipped");
                    report.skipped += 1;
                }
                Err(e) => return ServiceResult::failure(e.into()),
            }
        }

        ServiceResult::success(report)
    }

    /// Assign one backlog task, either to an explicit user or via the idle
    /// policy with lead fallback
    pub async fn assign_one(
        &self,
        actor: &dyn Actor,
        backlog_id: Id,
        user_id: Option<Id>,
    ) -> ServiceResult<Task> {
        let scope = match authorize(actor, Action::AssignBacklogTask) {
            Ok(scope) => scope,
            Err(e) => return ServiceResult::failure(e),
        };

        let entry = match self.store.find_backlog_task(backlog_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found(
                    "AutomaticTask",
                    "id",
                    backlog_id,
                ))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if !scope.permits_team(actor, entry.team_id) {
            return ServiceResult::failure(Error::forbidden(
                "backlog task is not in your team",
            ));
        }

        if !entry.is_pending() {
            return ServiceResult::failure(Error::precondition(
                "backlog task is already assigned",
            ));
        }

        // Explicit target: no eligibility filter beyond the task state.
        // Policy target: must still be idle at commit time.
        let (worker, require_idle) = match user_id {
            Some(user_id) => match self.store.find_user(user_id).await {
                Ok(Some(user)) => (user.id.unwrap_or(user_id), false),
                Ok(None) => {
                    return ServiceResult::failure(Error::not_found("User", "id", user_id))
                }
                Err(e) => return ServiceResult::failure(e.into()),
            },
            None => match self.pick_worker(entry.team_id).await {
                Ok(picked) => picked,
                Err(e) => return ServiceResult::failure(e),
            },
        };

        let task = task_from_backlog(&entry, worker, actor.actor_id());
        match self
            .store
            .commit_assignment(backlog_id, task, actor.actor_id(), Utc::now(), require_idle)
            .await
        {
            Ok(created) => {
                let mut report = SweepReport::default();
                self.record_assignment(&mut report, backlog_id, &created).await;
                ServiceResult::success(created)
            }
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    /// Idle-policy selection for one team: first idle member, else the team
    /// lead when fallback is enabled
    async fn pick_worker(&self, team_id: Id) -> Result<(Id, bool), Error> {
        let mut members = self
            .store
            .users_with_role(Role::TeamMember, Some(team_id))
            .await?;
        members.sort_by_key(|m| m.id);

        for member in members {
            let member_id = match member.id {
                Some(id) => id,
                None => continue,
            };
            if self.store.pending_task_count(member_id).await? == 0 {
                return Ok((member_id, true));
            }
        }

        if !self.config.lead_fallback {
            return Err(Error::precondition("team has no idle members"));
        }

        let team = self
            .store
            .find_team(team_id)
            .await?
            .ok_or_else(|| Error::not_found("Team", "id", team_id))?;
        match team.lead_id {
            Some(lead_id) => Ok((lead_id, false)),
            None => Err(Error::precondition(
                "team has no idle members and no lead to fall back to",
            )),
        }
    }

    async fn record_assignment(
        &self,
        report: &mut SweepReport,
        backlog_id: Id,
        created: &Task,
    ) {
        tracing::info!(
            backlog_id,
            task_id = ?created.id,
            worker_id = created.assigned_to,
            team_id = created.team_id,
            "backlog task assigned"
        );

        self.notifier
            .try_notify(
                created.assigned_to,
                "Task assigned from backlog",
                format!("You have been assigned '{}'", created.title),
                NotificationCategory::BacklogAssigned,
                created.id,
            )
            .await;

        report.assignments.push(Assignment {
            backlog_id,
            task_id: created.id.unwrap_or(0),
            worker_id: created.assigned_to,
            team_id: created.team_id,
        });
    }

    /// Team members holding zero pending tasks, grouped by team
    async fn idle_workers_by_team(
        &self,
    ) -> Result<HashMap<Id, VecDeque<Id>>, StorageError> {
        let mut members = self.store.users_with_role(Role::TeamMember, None).await?;
        members.sort_by_key(|m| m.id);

        let mut idle: HashMap<Id, VecDeque<Id>> = HashMap::new();
        for member in members {
            let (member_id, team_id) = match (member.id, member.team_id) {
                (Some(id), Some(team)) => (id, team),
                _ => continue,
            };
            if self.store.pending_task_count(member_id).await? == 0 {
                idle.entry(team_id).or_default().push_back(member_id);
            }
        }
        Ok(idle)
    }
}

/// Priority descending, then oldest first
fn sort_backlog(backlog: &mut [AutomaticTask]) {
    backlog.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

fn task_from_backlog(entry: &AutomaticTask, worker: Id, assigned_by: Id) -> Task {
    Task {
        id: None,
        title: entry.title.clone(),
        description: entry.description.clone(),
        assigned_to: worker,
        assigned_by,
        team_id: entry.team_id,
        priority: entry.priority,
        status: TaskStatus::Pending,
        review_status: ReviewStatus::Pending,
        progress: 0,
        due_date: entry.due_date,
        completed_at: None,
        created_at: None,
        updated_at: None,
    }
}
