use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub banner_url: Option<String>,

    /// User who created the team; not a foreign key, lookup only.
    pub creator_id: String,

    /// Running sum of every point ever credited to the team
    /// (member activity points plus awarded bonuses).
    pub total_points: i64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bonus_records::Entity")]
    BonusRecords,
}

impl Related<super::bonus_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BonusRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
