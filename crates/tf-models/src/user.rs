//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, TeamScoped, Timestamped};
use validator::Validate;

/// User role
///
/// Roles are fixed: an administrator manages users and teams globally, a team
/// lead creates and reviews tasks for their own team, a team member works on
/// assigned tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    TeamLead,
    TeamMember,
}

impl Role {
    /// Whether this role is bound to exactly one team
    pub fn requires_team(&self) -> bool {
        matches!(self, Role::TeamLead | Role::TeamMember)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// User entity
///
/// Invariant: a `team_lead` or `team_member` has exactly one `team_id`; an
/// `admin` has none. The invariant is checked at every mutation boundary
/// (registration, role change, team reassignment), never assumed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Email address (unique)
    #[validate(email)]
    pub email: String,

    pub role: Role,

    /// Team membership; `None` for admins
    pub team_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl TeamScoped for User {
    fn team_id(&self) -> Option<Id> {
        self.team_id
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            role,
            team_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_team_lead(&self) -> bool {
        matches!(self.role, Role::TeamLead)
    }

    pub fn is_team_member(&self) -> bool {
        matches!(self.role, Role::TeamMember)
    }

    /// Whether role and team assignment are mutually consistent
    pub fn role_team_consistent(&self) -> bool {
        if self.role.requires_team() {
            self.team_id.is_some()
        } else {
            self.team_id.is_none()
        }
    }
}

/// New user creation parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    pub role: Option<Role>,
    pub team_id: Option<Id>,
}

impl NewUser {
    /// Self-registration: no role or team chosen by the caller
    ///
    /// Defaults to `team_member` with no team; an administrator attaches the
    /// user to a team afterwards.
    pub fn self_registration(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: None,
            team_id: None,
        }
    }
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            id: None,
            name: new.name,
            email: new.email,
            role: new.role.unwrap_or(Role::TeamMember),
            team_id: new.team_id,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_requires_team() {
        assert!(Role::TeamLead.requires_team());
        assert!(Role::TeamMember.requires_team());
        assert!(!Role::Admin.requires_team());
    }

    #[test]
    fn test_role_team_consistency() {
        let mut user = User::new("Ada", "ada@example.com", Role::TeamMember);
        assert!(!user.role_team_consistent());

        user.team_id = Some(1);
        assert!(user.role_team_consistent());

        user.role = Role::Admin;
        assert!(!user.role_team_consistent());
    }

    #[test]
    fn test_self_registration_defaults() {
        let user: User = NewUser::self_registration("New Hire", "hire@example.com").into();
        assert_eq!(user.role, Role::TeamMember);
        assert!(user.team_id.is_none());
    }
}
