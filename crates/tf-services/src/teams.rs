//! Team management services

use std::sync::Arc;

use tf_contracts::authorization::{authorize, Action};
use tf_contracts::base::Actor;
use tf_core::error::Error;
use tf_core::traits::Id;
use tf_models::team::Team;
use tf_store::{Storage, TeamStore, UserStore};

use crate::result::ServiceResult;

/// Service for creating teams and installing leads
///
/// Lead assignment is where the one-lead invariants live: a team has at most
/// one lead, a user leads at most one team, and only a `team_lead` user may
/// be installed.
pub struct TeamService<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> TeamService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create_team(&self, actor: &dyn Actor, name: &str) -> ServiceResult<Team> {
        if let Err(e) = authorize(actor, Action::ManageTeams) {
            return ServiceResult::failure(e);
        }

        if name.trim().is_empty() {
            return ServiceResult::failure(Error::precondition("team name can't be blank"));
        }

        match self.store.create_team(Team::new(name.trim())).await {
            Ok(team) => ServiceResult::success(team),
            Err(e) => ServiceResult::failure(e.into()),
        }
    }

    pub async fn assign_lead(
        &self,
        actor: &dyn Actor,
        team_id: Id,
        user_id: Id,
    ) -> ServiceResult<Team> {
        if let Err(e) = authorize(actor, Action::ManageTeams) {
            return ServiceResult::failure(e);
        }

        let mut team = match self.store.find_team(team_id).await {
            Ok(Some(team)) => team,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found("Team", "id", team_id))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        let mut user = match self.store.find_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return ServiceResult::failure(Error::not_found("User", "id", user_id))
            }
            Err(e) => return ServiceResult::failure(e.into()),
        };

        if !user.is_team_lead() {
            return ServiceResult::failure(Error::inconsistent(
                "only a team_lead user can lead a team",
            ));
        }

        if team.has_lead() {
            return ServiceResult::failure(Error::inconsistent("team already has a lead"));
        }

        match self.store.team_led_by(user_id).await {
            Ok(Some(_)) => {
                return ServiceResult::failure(Error::inconsistent(
                    "user already leads another team",
                ))
            }
            Ok(None) => {}
            Err(e) => return ServiceResult::failure(e.into()),
        }

        team.lead_id = Some(user_id);
        if let Err(e) = self.store.update_team(&team).await {
            return ServiceResult::failure(e.into());
        }

        user.team_id = Some(team_id);
        if let Err(e) = self.store.update_user(&user).await {
            return ServiceResult::failure(e.into());
        }

        ServiceResult::success(team)
    }
}
