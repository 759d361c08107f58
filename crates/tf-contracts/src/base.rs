//! Base contract system

use tf_core::error::ValidationErrors;
use tf_core::traits::Id;
use tf_models::user::{Role, User};

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// The authenticated caller, as supplied by the identity collaborator
///
/// The core trusts only `id`, `role`, and `team_id`; it never re-derives
/// identity itself. Anything implementing this trait can drive the services,
/// which keeps session handling entirely outside the core.
pub trait Actor: Send + Sync {
    fn actor_id(&self) -> Id;
    fn role(&self) -> Role;
    fn team_id(&self) -> Option<Id>;

    fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Whether this actor belongs to the given team
    fn in_team(&self, team_id: Id) -> bool {
        self.team_id() == Some(team_id)
    }
}

impl Actor for User {
    fn actor_id(&self) -> Id {
        self.id.unwrap_or(0)
    }

    fn role(&self) -> Role {
        self.role
    }

    fn team_id(&self) -> Option<Id> {
        self.team_id
    }
}

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity; any error means the whole operation is rejected
    /// with no partial application
    fn validate(&self, entity: &T) -> ValidationResult;
}
