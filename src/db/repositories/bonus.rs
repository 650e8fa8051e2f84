use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};

use crate::entities::{bonus_records, teams};

/// Outcome of attempting to persist an achieved bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusWrite {
    /// This call inserted the record and credited the team.
    Recorded,
    /// Another evaluation already recorded this (team, date); nothing was
    /// written and no points were credited.
    AlreadyRecorded,
}

pub struct BonusRepository {
    conn: DatabaseConnection,
}

impl BonusRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, team_id: &str, date: &str) -> Result<Option<bonus_records::Model>> {
        let record = bonus_records::Entity::find()
            .filter(bonus_records::Column::TeamId.eq(team_id))
            .filter(bonus_records::Column::Date.eq(date))
            .one(&self.conn)
            .await
            .context("Failed to query bonus record")?;

        Ok(record)
    }

    /// Bonus history for a team, newest date first.
    pub async fn history(&self, team_id: &str) -> Result<Vec<bonus_records::Model>> {
        let records = bonus_records::Entity::find()
            .filter(bonus_records::Column::TeamId.eq(team_id))
            .order_by_desc(bonus_records::Column::Date)
            .all(&self.conn)
            .await
            .context("Failed to query bonus history")?;

        Ok(records)
    }

    /// Persist an achieved bonus and credit the team in one transaction.
    ///
    /// Two concurrent evaluations of the same (team, date) both reach this
    /// insert; the unique index on (team_id, date) rejects the loser, whose
    /// transaction rolls back without crediting anything. That constraint
    /// violation is the expected race outcome and maps to
    /// [`BonusWrite::AlreadyRecorded`]; every other database error
    /// propagates.
    pub async fn record_achievement(
        &self,
        team_id: &str,
        date: &str,
        bonus_points: i64,
    ) -> Result<BonusWrite> {
        let txn = self.conn.begin().await.context("Failed to open txn")?;

        let record = bonus_records::ActiveModel {
            team_id: Set(team_id.to_string()),
            date: Set(date.to_string()),
            achieved: Set(true),
            bonus_points: Set(bonus_points),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match record.insert(&txn).await {
            Ok(_) => {}
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                txn.rollback().await.ok();
                return Ok(BonusWrite::AlreadyRecorded);
            }
            Err(e) => return Err(e).context("Failed to insert bonus record"),
        }

        teams::Entity::update_many()
            .col_expr(
                teams::Column::TotalPoints,
                Expr::col(teams::Column::TotalPoints).add(bonus_points),
            )
            .filter(teams::Column::Id.eq(team_id))
            .exec(&txn)
            .await
            .context("Failed to credit bonus points")?;

        txn.commit().await.context("Failed to commit bonus record")?;

        Ok(BonusWrite::Recorded)
    }
}
