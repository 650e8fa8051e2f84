//! Domain service for the weekly team bonus.
//!
//! Decides, for one team and one calendar day, whether every member met the
//! daily point threshold, and persists the award exactly once per
//! (team, date).

use serde::Serialize;
use thiserror::Error;

/// Errors specific to bonus evaluation.
#[derive(Debug, Error)]
pub enum BonusError {
    /// Malformed input, rejected before any database access.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for BonusError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BonusError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result of one evaluation. `message` is display data for the UI; a
/// `false` outcome always stems from a named cause (roster size, threshold,
/// or an earlier record), never from a swallowed error.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub achieved: bool,
    pub message: String,
}

/// One recorded award, as exposed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct BonusRecordEntry {
    pub date: String,
    pub achieved: bool,
    pub bonus_points: i64,
}

/// Domain service trait for bonus evaluation and history.
#[async_trait::async_trait]
pub trait BonusService: Send + Sync {
    /// Evaluates the team for the given `YYYY-MM-DD` UTC day.
    ///
    /// Idempotent: re-evaluating an already-recorded day reports the stored
    /// outcome without writing or crediting again. The weekday gate is the
    /// caller's concern; evaluation itself works on any date.
    async fn evaluate(&self, team_id: &str, date: &str) -> Result<EvaluationOutcome, BonusError>;

    /// Recorded awards for a team, newest date first. Empty when none exist.
    async fn history(&self, team_id: &str) -> Result<Vec<BonusRecordEntry>, BonusError>;
}
