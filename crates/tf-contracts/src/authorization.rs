//! Role capability table
//!
//! One table answers "may this role perform this action, and where" for the
//! whole system. Services ask once per operation; the scope tells them which
//! ownership predicate to apply to the target.

use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::user::Role;

use crate::base::Actor;

/// Actions the core authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a manually assigned task
    CreateTask,
    /// Edit the free-text progress of an assigned task
    EditProgress,
    /// Submit an assigned task for review
    SubmitForReview,
    /// Accept, reject, or flag a completed task
    ReviewTask,
    /// Queue a backlog task for a team
    CreateBacklogTask,
    /// Manually bind a backlog task to a worker
    AssignBacklogTask,
    /// Create teams and install team leads
    ManageTeams,
    /// Create and delete user accounts
    ManageUsers,
}

/// Where an allowed action may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Any team, any target
    Anywhere,
    /// Only targets in the actor's own team
    OwnTeam,
    /// Only targets assigned to the actor themself
    SelfOnly,
}

impl Scope {
    /// Apply the scope to a team-bound target
    pub fn permits_team(&self, actor: &dyn Actor, target_team: Id) -> bool {
        match self {
            Scope::Anywhere => true,
            Scope::OwnTeam => actor.in_team(target_team),
            Scope::SelfOnly => false,
        }
    }

    /// Apply the scope to a user-bound target (an assignee)
    pub fn permits_user(&self, actor: &dyn Actor, target_user: Id) -> bool {
        match self {
            Scope::Anywhere => true,
            Scope::SelfOnly => actor.actor_id() == target_user,
            Scope::OwnTeam => false,
        }
    }
}

/// Outcome of a capability lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Deny,
    Allow(Scope),
}

/// The capability table
///
/// | Action            | admin    | team_lead | team_member |
/// |-------------------|----------|-----------|-------------|
/// | create task       | anywhere | own team  | deny        |
/// | edit progress     | deny     | deny      | self only   |
/// | submit for review | deny     | deny      | self only   |
/// | review task       | anywhere | own team  | deny        |
/// | create backlog    | anywhere | own team  | deny        |
/// | assign backlog    | anywhere | own team  | deny        |
/// | manage teams      | anywhere | deny      | deny        |
/// | manage users      | anywhere | deny      | deny        |
pub fn capability(role: Role, action: Action) -> Capability {
    use Action::*;
    use Capability::*;

    match (role, action) {
        (Role::Admin, CreateTask | ReviewTask | CreateBacklogTask | AssignBacklogTask) => {
            Allow(Scope::Anywhere)
        }
        (Role::Admin, ManageTeams | ManageUsers) => Allow(Scope::Anywhere),
        (Role::Admin, EditProgress | SubmitForReview) => Deny,

        (Role::TeamLead, CreateTask | ReviewTask | CreateBacklogTask | AssignBacklogTask) => {
            Allow(Scope::OwnTeam)
        }
        (Role::TeamLead, _) => Deny,

        (Role::TeamMember, EditProgress | SubmitForReview) => Allow(Scope::SelfOnly),
        (Role::TeamMember, _) => Deny,
    }
}

/// Authorize an actor for an action, returning the scope to apply
pub fn authorize(actor: &dyn Actor, action: Action) -> Result<Scope, Error> {
    match capability(actor.role(), action) {
        Capability::Allow(scope) => Ok(scope),
        Capability::Deny => Err(Error::forbidden(format!(
            "role {:?} may not perform {:?}",
            actor.role(),
            action
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_models::user::User;

    fn actor(role: Role, team: Option<Id>) -> User {
        let mut user = User::new("someone", "someone@example.com", role);
        user.id = Some(42);
        user.team_id = team;
        user
    }

    #[test]
    fn test_admin_capabilities() {
        let admin = actor(Role::Admin, None);
        assert_eq!(
            authorize(&admin, Action::CreateTask).ok(),
            Some(Scope::Anywhere)
        );
        assert_eq!(
            authorize(&admin, Action::ReviewTask).ok(),
            Some(Scope::Anywhere)
        );
        assert!(authorize(&admin, Action::EditProgress).is_err());
        assert!(authorize(&admin, Action::SubmitForReview).is_err());
    }

    #[test]
    fn test_lead_capabilities() {
        let lead = actor(Role::TeamLead, Some(1));
        assert_eq!(
            authorize(&lead, Action::CreateTask).ok(),
            Some(Scope::OwnTeam)
        );
        assert_eq!(
            authorize(&lead, Action::ReviewTask).ok(),
            Some(Scope::OwnTeam)
        );
        assert!(authorize(&lead, Action::ManageTeams).is_err());
        assert!(authorize(&lead, Action::EditProgress).is_err());
    }

    #[test]
    fn test_member_capabilities() {
        let member = actor(Role::TeamMember, Some(1));
        assert_eq!(
            authorize(&member, Action::EditProgress).ok(),
            Some(Scope::SelfOnly)
        );
        assert_eq!(
            authorize(&member, Action::SubmitForReview).ok(),
            Some(Scope::SelfOnly)
        );
        assert!(authorize(&member, Action::CreateTask).is_err());
        assert!(authorize(&member, Action::ReviewTask).is_err());
    }

    #[test]
    fn test_scope_predicates() {
        let lead = actor(Role::TeamLead, Some(1));
        assert!(Scope::OwnTeam.permits_team(&lead, 1));
        assert!(!Scope::OwnTeam.permits_team(&lead, 2));
        assert!(Scope::Anywhere.permits_team(&lead, 2));

        let member = actor(Role::TeamMember, Some(1));
        assert!(Scope::SelfOnly.permits_user(&member, 42));
        assert!(!Scope::SelfOnly.permits_user(&member, 43));
    }
}
