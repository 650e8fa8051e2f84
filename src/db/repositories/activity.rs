use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{activities, activity_log, teams, users};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn catalog(&self) -> Result<Vec<activities::Model>> {
        let activities = activities::Entity::find()
            .order_by_asc(activities::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load activity catalog")?;

        Ok(activities)
    }

    pub async fn get(&self, id: i32) -> Result<Option<activities::Model>> {
        let activity = activities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query activity")?;

        Ok(activity)
    }

    /// Record one activity entry and credit the user's (and their team's)
    /// running totals. The log insert and both credits commit as one unit.
    pub async fn log(
        &self,
        user_id: &str,
        activity: &activities::Model,
        date: &str,
    ) -> Result<activity_log::Model> {
        let txn = self.conn.begin().await.context("Failed to open txn")?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to query user for activity log")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let entry = activity_log::ActiveModel {
            user_id: Set(user_id.to_string()),
            activity_id: Set(activity.id),
            date: Set(date.to_string()),
            points: Set(activity.points),
            logged_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let entry = entry
            .insert(&txn)
            .await
            .context("Failed to insert activity log entry")?;

        users::Entity::update_many()
            .col_expr(
                users::Column::TotalPoints,
                Expr::col(users::Column::TotalPoints).add(activity.points),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await
            .context("Failed to credit user points")?;

        if let Some(team_id) = &user.team_id {
            teams::Entity::update_many()
                .col_expr(
                    teams::Column::TotalPoints,
                    Expr::col(teams::Column::TotalPoints).add(activity.points),
                )
                .filter(teams::Column::Id.eq(team_id))
                .exec(&txn)
                .await
                .context("Failed to credit team points")?;
        }

        txn.commit().await.context("Failed to commit activity log")?;

        Ok(entry)
    }

    /// A user's entries for one calendar day, oldest first.
    pub async fn entries_for(&self, user_id: &str, date: &str) -> Result<Vec<activity_log::Model>> {
        let entries = activity_log::Entity::find()
            .filter(activity_log::Column::UserId.eq(user_id))
            .filter(activity_log::Column::Date.eq(date))
            .order_by_asc(activity_log::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query activity log entries")?;

        Ok(entries)
    }

    /// Sum of a user's points for one calendar day.
    pub async fn daily_points(&self, user_id: &str, date: &str) -> Result<i64> {
        let entries = self.entries_for(user_id, date).await?;
        Ok(entries.iter().map(|e| e.points).sum())
    }
}
