//! Activity catalog and daily activity logging.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::db::Store;
use crate::entities::{activities, activity_log};
use crate::services::bonus_service_impl::daily_points_key;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Activity not found: {0}")]
    ActivityNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ActivityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A logged entry plus the user's running total for that day.
#[derive(Debug, Clone)]
pub struct LoggedActivity {
    pub entry: activity_log::Model,
    pub daily_total: i64,
}

#[derive(Debug, Clone)]
pub struct DayLog {
    pub entries: Vec<activity_log::Model>,
    pub daily_total: i64,
}

#[derive(Clone)]
pub struct ActivityService {
    store: Store,
    daily_totals: Arc<TtlCache<i64>>,
}

impl ActivityService {
    #[must_use]
    pub const fn new(store: Store, daily_totals: Arc<TtlCache<i64>>) -> Self {
        Self {
            store,
            daily_totals,
        }
    }

    /// Resolves an optional `YYYY-MM-DD` input; absent means today, UTC.
    fn resolve_date(date: Option<&str>) -> Result<String, ActivityError> {
        match date {
            None => Ok(chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()),
            Some(raw) => {
                let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                    ActivityError::Validation(format!("Invalid date '{raw}': expected YYYY-MM-DD"))
                })?;
                Ok(parsed.format("%Y-%m-%d").to_string())
            }
        }
    }

    pub async fn catalog(&self) -> Result<Vec<activities::Model>, ActivityError> {
        Ok(self.store.activity_catalog().await?)
    }

    /// Logs one activity for the user on the given day (today when absent),
    /// crediting user and team totals. The user's cached daily total for
    /// that day is invalidated so an in-window bonus evaluation sees the new
    /// entry.
    pub async fn log(
        &self,
        user_id: &str,
        activity_id: i32,
        date: Option<&str>,
    ) -> Result<LoggedActivity, ActivityError> {
        let date = Self::resolve_date(date)?;

        let activity = self
            .store
            .get_activity(activity_id)
            .await?
            .ok_or(ActivityError::ActivityNotFound(activity_id))?;

        let entry = self.store.log_activity(user_id, &activity, &date).await?;

        self.daily_totals.clear(&daily_points_key(user_id, &date));

        let daily_total = self.store.daily_points(user_id, &date).await?;

        Ok(LoggedActivity { entry, daily_total })
    }

    pub async fn day_log(&self, user_id: &str, date: Option<&str>) -> Result<DayLog, ActivityError> {
        let date = Self::resolve_date(date)?;

        let entries = self.store.activity_entries(user_id, &date).await?;
        let daily_total = entries.iter().map(|e| e.points).sum();

        Ok(DayLog {
            entries,
            daily_total,
        })
    }
}
