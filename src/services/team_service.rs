//! Team membership and lifecycle.

use thiserror::Error;

use crate::constants::bonus::REQUIRED_TEAM_SIZE;
use crate::db::{Store, User};
use crate::entities::teams;

#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Team not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for TeamError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A team together with its current roster.
#[derive(Debug, Clone)]
pub struct TeamDetail {
    pub team: teams::Model,
    pub members: Vec<User>,
}

#[derive(Clone)]
pub struct TeamService {
    store: Store,
}

impl TeamService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a team; the creator joins it immediately.
    pub async fn create(
        &self,
        creator: &User,
        name: &str,
        banner_url: Option<&str>,
    ) -> Result<teams::Model, TeamError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TeamError::Validation("Team name is required".to_string()));
        }
        if name.len() > 60 {
            return Err(TeamError::Validation(
                "Team name must be 60 characters or less".to_string(),
            ));
        }

        if creator.team_id.is_some() {
            return Err(TeamError::Conflict(
                "Leave your current team before creating a new one".to_string(),
            ));
        }

        let team = self.store.create_team(name, banner_url, &creator.id).await?;
        self.store.set_user_team(&creator.id, Some(&team.id)).await?;

        Ok(team)
    }

    pub async fn list(&self) -> Result<Vec<teams::Model>, TeamError> {
        Ok(self.store.list_teams().await?)
    }

    pub async fn detail(&self, team_id: &str) -> Result<TeamDetail, TeamError> {
        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or_else(|| TeamError::NotFound(team_id.to_string()))?;

        let members = self.store.team_roster(team_id).await?;

        Ok(TeamDetail { team, members })
    }

    /// Joins a team. Full rosters (the bonus-eligible size) are closed.
    pub async fn join(&self, user: &User, team_id: &str) -> Result<teams::Model, TeamError> {
        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or_else(|| TeamError::NotFound(team_id.to_string()))?;

        if user.team_id.is_some() {
            return Err(TeamError::Conflict(
                "Leave your current team before joining another".to_string(),
            ));
        }

        let member_count = self.store.team_member_count(team_id).await?;
        if member_count >= REQUIRED_TEAM_SIZE as u64 {
            return Err(TeamError::Conflict(format!(
                "Team '{}' is full ({REQUIRED_TEAM_SIZE} members)",
                team.name
            )));
        }

        self.store.set_user_team(&user.id, Some(team_id)).await?;

        Ok(team)
    }

    pub async fn leave(&self, user: &User) -> Result<(), TeamError> {
        if user.team_id.is_none() {
            return Err(TeamError::Conflict("You are not on a team".to_string()));
        }

        self.store.set_user_team(&user.id, None).await?;

        Ok(())
    }
}
