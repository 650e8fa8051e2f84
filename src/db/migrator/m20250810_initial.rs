use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key for the seeded admin account (regenerate after first login)
const DEFAULT_ADMIN_API_KEY: &str = "stride_default_api_key_please_regenerate";

/// Hash the default admin password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

/// Starter activity catalog: (name, emoji, points, description)
const ACTIVITY_CATALOG: &[(&str, &str, i64, &str)] = &[
    ("Walk", "🚶", 10, "Walk for at least 30 minutes"),
    ("Run", "🏃", 15, "Run or jog for at least 20 minutes"),
    ("Cycle", "🚴", 15, "Ride a bike for at least 30 minutes"),
    ("Gym session", "🏋️", 20, "Strength or cardio workout at the gym"),
    ("Yoga", "🧘", 10, "Yoga or stretching for at least 20 minutes"),
    ("Swim", "🏊", 20, "Swim laps for at least 20 minutes"),
    ("Team sport", "⚽", 15, "Play a team sport for at least 30 minutes"),
    ("Hydration", "💧", 5, "Drink at least 2 liters of water"),
    ("Sleep", "😴", 5, "Get at least 7 hours of sleep"),
    ("Meditation", "🧠", 5, "Meditate for at least 10 minutes"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Teams)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Activities)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ActivityLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(BonusRecords)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        // Duplicate-prevention invariant: at most one bonus record per
        // (team, day). Concurrent evaluations race on this index.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_bonus_records_team_date_unique ON bonus_records(team_id, date)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_activity_log_user_date ON activity_log(user_id, date)",
        )
        .await?;

        // Seed the fixed activity catalog
        for (name, emoji, points, description) in ACTIVITY_CATALOG {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Activities)
                .columns([
                    crate::entities::activities::Column::Name,
                    crate::entities::activities::Column::Emoji,
                    crate::entities::activities::Column::Points,
                    crate::entities::activities::Column::Description,
                ])
                .values_panic([
                    (*name).into(),
                    (*emoji).into(),
                    (*points).into(),
                    (*description).into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        // Seed default admin user with hashed password
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Id,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::FullName,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::ApiKey,
                crate::entities::users::Column::TotalPoints,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                uuid::Uuid::new_v4().to_string().into(),
                "admin@stride.local".into(),
                "Administrator".into(),
                password_hash.into(),
                DEFAULT_ADMIN_API_KEY.into(),
                0_i64.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BonusRecords).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActivityLog).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams).to_owned())
            .await?;

        Ok(())
    }
}
