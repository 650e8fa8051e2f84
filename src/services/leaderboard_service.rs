//! Team and individual leaderboards, memoized for a short window.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::constants::cache::LEADERBOARD_TTL;
use crate::db::Store;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for LeaderboardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub total_points: i64,
}

#[derive(Clone)]
pub struct LeaderboardService {
    store: Store,
    cache: Arc<TtlCache<Vec<LeaderboardRow>>>,
}

impl LeaderboardService {
    #[must_use]
    pub const fn new(store: Store, cache: Arc<TtlCache<Vec<LeaderboardRow>>>) -> Self {
        Self { store, cache }
    }

    fn rank(rows: impl Iterator<Item = (String, String, i64)>) -> Vec<LeaderboardRow> {
        rows.enumerate()
            .map(|(i, (id, name, total_points))| LeaderboardRow {
                rank: i + 1,
                id,
                name,
                total_points,
            })
            .collect()
    }

    pub async fn teams(&self, limit: usize) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
        let key = format!("leaderboard:teams:{limit}");
        self.cache
            .get_or_insert_with(&key, LEADERBOARD_TTL, || async {
                let teams = self.store.team_leaderboard(limit).await?;
                Ok::<_, LeaderboardError>(Self::rank(
                    teams.into_iter().map(|t| (t.id, t.name, t.total_points)),
                ))
            })
            .await
    }

    pub async fn users(&self, limit: usize) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
        let key = format!("leaderboard:users:{limit}");
        self.cache
            .get_or_insert_with(&key, LEADERBOARD_TTL, || async {
                let users = self.store.user_leaderboard(limit).await?;
                Ok::<_, LeaderboardError>(Self::rank(
                    users
                        .into_iter()
                        .map(|u| (u.id, u.full_name, u.total_points)),
                ))
            })
            .await
    }
}
