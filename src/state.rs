use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ActivityService, AuthService, BonusService, LeaderboardRow, LeaderboardService,
    SeaOrmAuthService, SeaOrmBonusService, TeamService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub bonus_service: Arc<dyn BonusService>,

    pub activity_service: ActivityService,

    pub team_service: TeamService,

    pub leaderboard_service: LeaderboardService,

    /// Per-member daily point totals, shared between the bonus evaluator
    /// (reads) and activity logging (invalidation).
    pub daily_totals: Arc<TtlCache<i64>>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let daily_totals = Arc::new(TtlCache::new());
        let leaderboards: Arc<TtlCache<Vec<LeaderboardRow>>> = Arc::new(TtlCache::new());

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let bonus_service = Arc::new(SeaOrmBonusService::new(
            store.clone(),
            daily_totals.clone(),
        )) as Arc<dyn BonusService + Send + Sync + 'static>;

        let activity_service = ActivityService::new(store.clone(), daily_totals.clone());
        let team_service = TeamService::new(store.clone());
        let leaderboard_service = LeaderboardService::new(store.clone(), leaderboards);

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            bonus_service,
            activity_service,
            team_service,
            leaderboard_service,
            daily_totals,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
