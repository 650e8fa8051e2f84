//! `SeaORM` implementation of the `BonusService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::cache::TtlCache;
use crate::constants::bonus::{BONUS_POINTS, DAILY_POINT_THRESHOLD, REQUIRED_TEAM_SIZE};
use crate::constants::cache::DEFAULT_TTL;
use crate::db::{BonusWrite, Store};
use crate::services::bonus_service::{
    BonusError, BonusRecordEntry, BonusService, EvaluationOutcome,
};

/// Cache key for a member's daily point total. Shared with the activity
/// logging path, which clears the key when a new entry lands.
#[must_use]
pub fn daily_points_key(user_id: &str, date: &str) -> String {
    format!("daily_points:{user_id}:{date}")
}

pub struct SeaOrmBonusService {
    store: Store,
    daily_totals: Arc<TtlCache<i64>>,
}

impl SeaOrmBonusService {
    #[must_use]
    pub const fn new(store: Store, daily_totals: Arc<TtlCache<i64>>) -> Self {
        Self {
            store,
            daily_totals,
        }
    }

    /// Normalizes and validates a `YYYY-MM-DD` date string. The day is a UTC
    /// calendar day; members in different timezones never disagree about
    /// which day is being evaluated.
    fn parse_date(date: &str) -> Result<String, BonusError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
            BonusError::Validation(format!("Invalid date '{date}': expected YYYY-MM-DD"))
        })?;
        Ok(parsed.format("%Y-%m-%d").to_string())
    }

    async fn daily_points_cached(&self, user_id: &str, date: &str) -> Result<i64, BonusError> {
        let key = daily_points_key(user_id, date);
        self.daily_totals
            .get_or_insert_with(&key, DEFAULT_TTL, || async {
                self.store.daily_points(user_id, date).await
            })
            .await
            .map_err(BonusError::from)
    }
}

#[async_trait]
impl BonusService for SeaOrmBonusService {
    async fn evaluate(
        &self,
        team_id: &str,
        date: &str,
    ) -> Result<EvaluationOutcome, BonusError> {
        let team_id = team_id.trim();
        if team_id.is_empty() {
            return Err(BonusError::Validation("Team id is required".to_string()));
        }
        let date = Self::parse_date(date)?;

        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or_else(|| BonusError::TeamNotFound(team_id.to_string()))?;

        // An existing record settles the day: report it, write nothing,
        // credit nothing.
        if let Some(record) = self.store.find_bonus_record(team_id, &date).await? {
            return Ok(EvaluationOutcome {
                achieved: record.achieved,
                message: format!("bonus already evaluated for {date}"),
            });
        }

        let roster = self.store.team_roster(team_id).await?;
        if roster.len() != REQUIRED_TEAM_SIZE {
            return Ok(EvaluationOutcome {
                achieved: false,
                message: format!("team needs {}/{REQUIRED_TEAM_SIZE} members", roster.len()),
            });
        }

        for member in &roster {
            let total = self.daily_points_cached(&member.id, &date).await?;
            if total < DAILY_POINT_THRESHOLD {
                // Failed checks are not persisted; the team can re-qualify
                // later the same day and be re-evaluated.
                return Ok(EvaluationOutcome {
                    achieved: false,
                    message: format!(
                        "not every member reached {DAILY_POINT_THRESHOLD} points on {date}"
                    ),
                });
            }
        }

        match self
            .store
            .record_bonus_achievement(team_id, &date, BONUS_POINTS)
            .await?
        {
            BonusWrite::Recorded => {
                info!(
                    team_id = %team_id,
                    date = %date,
                    "Team '{}' earned the weekly bonus (+{BONUS_POINTS})",
                    team.name
                );
                Ok(EvaluationOutcome {
                    achieved: true,
                    message: format!("wellness bonus earned: +{BONUS_POINTS} team points"),
                })
            }
            // Lost the insert race to a concurrent evaluation; the winner
            // already credited the points.
            BonusWrite::AlreadyRecorded => Ok(EvaluationOutcome {
                achieved: true,
                message: format!("bonus already evaluated for {date}"),
            }),
        }
    }

    async fn history(&self, team_id: &str) -> Result<Vec<BonusRecordEntry>, BonusError> {
        let team_id = team_id.trim();
        if team_id.is_empty() {
            return Err(BonusError::Validation("Team id is required".to_string()));
        }

        let records = self.store.bonus_history(team_id).await?;

        Ok(records
            .into_iter()
            .map(|r| BonusRecordEntry {
                date: r.date,
                achieved: r.achieved,
                bonus_points: r.bonus_points,
            })
            .collect())
    }
}
