//! Task contracts
//!
//! Assignee-eligibility rules for task creation live here so that every
//! creation path (manual and engine-driven) validates identically.

use tf_core::error::ValidationErrors;
use tf_models::automatic_task::NewAutomaticTask;
use tf_models::task::NewTask;
use tf_models::user::{Role, User};

use crate::authorization::Scope;
use crate::base::{Actor, Contract, ValidationResult};

/// Contract for creating a manually assigned task
///
/// The creator has already passed the capability check; this contract decides
/// whether the chosen assignee is an eligible target:
///
/// - the assignee must exist and must not be an admin,
/// - a team lead may only assign to team members (admins may also target
///   other leads),
/// - the assignee must belong to a team,
/// - an own-team scope must match the assignee's team.
///
/// The task's `team_id` is always taken from the assignee afterwards; the
/// caller's value is never trusted.
pub struct CreateTaskContract<'a> {
    creator: &'a dyn Actor,
    scope: Scope,
    assignee: Option<&'a User>,
}

impl<'a> CreateTaskContract<'a> {
    pub fn new(creator: &'a dyn Actor, scope: Scope, assignee: Option<&'a User>) -> Self {
        Self {
            creator,
            scope,
            assignee,
        }
    }
}

impl Contract<NewTask> for CreateTaskContract<'_> {
    fn validate(&self, new_task: &NewTask) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if new_task.title.trim().is_empty() {
            errors.add("title", "can't be blank");
        }

        let assignee = match self.assignee {
            Some(assignee) => assignee,
            None => {
                errors.add("assigned_to", "does not exist");
                return Err(errors);
            }
        };

        match assignee.role {
            Role::Admin => {
                errors.add("assigned_to", "administrators cannot be assigned tasks");
            }
            Role::TeamLead if !self.creator.is_admin() => {
                errors.add("assigned_to", "team leads may only assign to team members");
            }
            _ => {}
        }

        match assignee.team_id {
            None => {
                errors.add("assigned_to", "has no team");
            }
            Some(team_id) => {
                if !self.scope.permits_team(self.creator, team_id) {
                    errors.add("team_id", "assignee is not in your team");
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Contract for queueing a backlog task for a team
pub struct CreateBacklogContract<'a> {
    creator: &'a dyn Actor,
    scope: Scope,
}

impl<'a> CreateBacklogContract<'a> {
    pub fn new(creator: &'a dyn Actor, scope: Scope) -> Self {
        Self { creator, scope }
    }
}

impl Contract<NewAutomaticTask> for CreateBacklogContract<'_> {
    fn validate(&self, new_task: &NewAutomaticTask) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if new_task.title.trim().is_empty() {
            errors.add("title", "can't be blank");
        }

        if !self.scope.permits_team(self.creator, new_task.team_id) {
            errors.add("team_id", "is not your team");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
