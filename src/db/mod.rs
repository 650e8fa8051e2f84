use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{activities, activity_log, bonus_records, teams};

pub mod migrator;
pub mod repositories;

pub use repositories::bonus::BonusWrite;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn team_repo(&self) -> repositories::team::TeamRepository {
        repositories::team::TeamRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn bonus_repo(&self) -> repositories::bonus::BonusRepository {
        repositories::bonus::BonusRepository::new(self.conn.clone())
    }

    // --- users ---

    pub async fn create_user(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(email, full_name, password, security)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(
        &self,
        email: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(email, new_password, security)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, email: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(email).await
    }

    pub async fn set_user_team(&self, user_id: &str, team_id: Option<&str>) -> Result<()> {
        self.user_repo().set_team(user_id, team_id).await
    }

    pub async fn team_roster(&self, team_id: &str) -> Result<Vec<User>> {
        self.user_repo().roster(team_id).await
    }

    pub async fn user_count(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn user_leaderboard(&self, limit: usize) -> Result<Vec<User>> {
        self.user_repo().leaderboard(limit).await
    }

    // --- teams ---

    pub async fn create_team(
        &self,
        name: &str,
        banner_url: Option<&str>,
        creator_id: &str,
    ) -> Result<teams::Model> {
        self.team_repo().create(name, banner_url, creator_id).await
    }

    pub async fn get_team(&self, id: &str) -> Result<Option<teams::Model>> {
        self.team_repo().get(id).await
    }

    pub async fn list_teams(&self) -> Result<Vec<teams::Model>> {
        self.team_repo().list().await
    }

    pub async fn team_count(&self) -> Result<u64> {
        self.team_repo().count().await
    }

    pub async fn team_member_count(&self, team_id: &str) -> Result<u64> {
        self.team_repo().member_count(team_id).await
    }

    pub async fn add_team_points(&self, team_id: &str, points: i64) -> Result<()> {
        self.team_repo().add_points(team_id, points).await
    }

    pub async fn team_leaderboard(&self, limit: usize) -> Result<Vec<teams::Model>> {
        self.team_repo().leaderboard(limit).await
    }

    // --- activities ---

    pub async fn activity_catalog(&self) -> Result<Vec<activities::Model>> {
        self.activity_repo().catalog().await
    }

    pub async fn get_activity(&self, id: i32) -> Result<Option<activities::Model>> {
        self.activity_repo().get(id).await
    }

    pub async fn log_activity(
        &self,
        user_id: &str,
        activity: &activities::Model,
        date: &str,
    ) -> Result<activity_log::Model> {
        self.activity_repo().log(user_id, activity, date).await
    }

    pub async fn activity_entries(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<activity_log::Model>> {
        self.activity_repo().entries_for(user_id, date).await
    }

    pub async fn daily_points(&self, user_id: &str, date: &str) -> Result<i64> {
        self.activity_repo().daily_points(user_id, date).await
    }

    // --- bonus records ---

    pub async fn find_bonus_record(
        &self,
        team_id: &str,
        date: &str,
    ) -> Result<Option<bonus_records::Model>> {
        self.bonus_repo().find(team_id, date).await
    }

    pub async fn bonus_history(&self, team_id: &str) -> Result<Vec<bonus_records::Model>> {
        self.bonus_repo().history(team_id).await
    }

    pub async fn record_bonus_achievement(
        &self,
        team_id: &str,
        date: &str,
        bonus_points: i64,
    ) -> Result<BonusWrite> {
        self.bonus_repo()
            .record_achievement(team_id, date, bonus_points)
            .await
    }
}
