//! User account services

use std::sync::Arc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::Actor;
use tf_core::error::{Error, ValidationErrors};
use tf_core::traits::Id;
use tf_models::user::{NewUser, Role, User};
use tf_store::{Storage, TeamStore, UserStore};

use crate::result::ServiceResult;

fn validate_identity(name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.add("name", "can't be blank");
    }
    if !email.contains('@') {
        errors.add("email", "is not a valid address");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Service for creating user accounts
pub struct RegisterUserService<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> RegisterUserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Self-registration: always a team member with no team, whatever the
    /// caller asked for. An administrator attaches the user to a team later.
    pub async fn register(&self, params: NewUser) -> ServiceResult<User> {
        if let Err(errors) = validate_identity(&params.name, &params.email) {
            return ServiceResult::failure_with_validation(errors);
        }
        if let Some(e) = self.email_taken(&params.email).await {
            return e;
        }

        let user = User::new(params.name, params.email, Role::TeamMember);
        match self.store.create_user(user).await {
            Ok(user) => ServiceResult::success(user),
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    /// Administrator-driven creation with an explicit role and team
    pub async fn admin_create(&self, actor: &dyn Actor, params: NewUser) -> ServiceResult<User> {
        if let Err(e) = authorize(actor, Action::ManageUsers) {
            return ServiceResult::failure(e);
        }

        if let Err(errors) = validate_identity(&params.name, &params.email) {
            return ServiceResult::failure_with_validation(errors);
        }
        if let Some(e) = self.email_taken(&params.email).await {
            return e;
        }

        let role = params.role.unwrap_or(Role::TeamMember);
        match (role.requires_team(), params.team_id) {
            (true, None) => {
                return ServiceResult::failure(Error::inconsistent(
                    "a team_lead or team_member needs a team",
                ))
            }
            (false, Some(_)) => {
                return ServiceResult::failure(Error::inconsistent(
                    "an admin cannot belong to a team",
                ))
            }
            (true, Some(team_id)) => match self.store.find_team(team_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return ServiceResult::failure(Error::not_found("Team", "id", team_id))
                }
                Err(e) => return ServiceResult::failure(e.into()),
            },
            (false, None) => {}
        }

        let mut user = User::new(params.name, params.email, role);
        user.team_id = params.team_id;
        match self.store.create_user(user).await {
            Ok(user) => ServiceResult::success(user),
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    async fn email_taken(&self, email: &str) -> Option<ServiceResult<User>> {
        match self.store.find_user_by_email(email).await {
            Ok(Some(_)) => Some(ServiceResult::failure(Error::conflict(
                "email is already registered",
            ))),
            Ok(None) => None,
            Err(e) => Some(ServiceResult::failure(e.into())),
        }
    }
}

/// Service for deleting user accounts
///
/// Deleting a user with open work is the data-integrity-critical path: a
/// replacement must be named, and the transfer of tasks and (for leads) team
/// leadership commits atomically with the delete or not at all.
pub struct DeleteUserService<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> DeleteUserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn call(
        &self,
        actor: &dyn Actor,
        user_id: Id,
        replacement: Option<Id>,
    ) -> ServiceResult<()> {
        if let Err(e) = authorize(actor, Action::ManageUsers) {
            return ServiceResult::failure(e);
        }

        if actor.actor_id() == user_id {
            return ServiceResult::failure(Error::precondition(
                "you cannot delete your own account",
            ));
        }

        let target = match self.store.find_user(user_id).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found("User", "id", user_id))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if let Some(replacement_id) = replacement {
            let replacement_user = match self.store.find_user(replacement_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return ServiceResult::failure(Error::not_found(
                        "User",
                        "id",
                        replacement_id,
                    ))
                }
                Err(e) => return ServiceResult::failure(e.into()),
            };

            if target.is_team_lead() && !replacement_user.is_team_lead() {
                return ServiceResult::failure(Error::inconsistent(
                    "a team lead can only be replaced by another team lead",
                ));
            }
        }

        match self.store.delete_user_cascade(user_id, replacement).await {
            Ok(()) => {
                tracing::info!(user_id, ?replacement, "user deleted");
                ServiceResult::success(())
            }
            Err(e) => ServiceResult::failure(e.into()),
        }
    }
}
