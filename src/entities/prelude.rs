pub use super::activities::Entity as Activities;
pub use super::activity_log::Entity as ActivityLog;
pub use super::bonus_records::Entity as BonusRecords;
pub use super::teams::Entity as Teams;
pub use super::users::Entity as Users;
