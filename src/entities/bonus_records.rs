use sea_orm::entity::prelude::*;

/// One-time "Wellness Wednesday" award for a (team, date) pair.
/// The migration adds a unique index on (team_id, date); concurrent
/// evaluations race on the insert and the loser sees a constraint error.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bonus_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: String,

    /// Calendar day in `YYYY-MM-DD` form, always UTC.
    pub date: String,

    pub achieved: bool,

    pub bonus_points: i64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Teams,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
