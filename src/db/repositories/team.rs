use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{teams, users};

pub struct TeamRepository {
    conn: DatabaseConnection,
}

impl TeamRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        name: &str,
        banner_url: Option<&str>,
        creator_id: &str,
    ) -> Result<teams::Model> {
        let active_model = teams::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            banner_url: Set(banner_url.map(std::string::ToString::to_string)),
            creator_id: Set(creator_id.to_string()),
            total_points: Set(0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert team")?;

        Ok(model)
    }

    pub async fn get(&self, id: &str) -> Result<Option<teams::Model>> {
        let team = teams::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query team")?;

        Ok(team)
    }

    pub async fn list(&self) -> Result<Vec<teams::Model>> {
        let teams = teams::Entity::find()
            .order_by_asc(teams::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list teams")?;

        Ok(teams)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = teams::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count teams")?;

        Ok(count)
    }

    pub async fn member_count(&self, team_id: &str) -> Result<u64> {
        let count = users::Entity::find()
            .filter(users::Column::TeamId.eq(team_id))
            .count(&self.conn)
            .await
            .context("Failed to count team members")?;

        Ok(count)
    }

    /// Credit points to a team with a single in-place update so concurrent
    /// credits never lose a read-modify-write race.
    pub async fn add_points(&self, team_id: &str, points: i64) -> Result<()> {
        teams::Entity::update_many()
            .col_expr(
                teams::Column::TotalPoints,
                Expr::col(teams::Column::TotalPoints).add(points),
            )
            .filter(teams::Column::Id.eq(team_id))
            .exec(&self.conn)
            .await
            .context("Failed to credit team points")?;

        Ok(())
    }

    /// Top teams by accumulated points.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<teams::Model>> {
        let teams = teams::Entity::find()
            .order_by_desc(teams::Column::TotalPoints)
            .order_by_asc(teams::Column::Name)
            .limit(Some(limit as u64))
            .all(&self.conn)
            .await
            .context("Failed to query team leaderboard")?;

        Ok(teams)
    }
}
