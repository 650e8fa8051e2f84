use serde::Serialize;

use crate::db::User;
use crate::entities::{activities, activity_log, teams};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamDto {
    pub id: String,
    pub name: String,
    pub banner_url: Option<String>,
    pub creator_id: String,
    pub total_points: i64,
    pub created_at: String,
}

impl From<teams::Model> for TeamDto {
    fn from(model: teams::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            banner_url: model.banner_url,
            creator_id: model.creator_id,
            total_points: model.total_points,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub total_points: i64,
}

impl From<User> for MemberDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            total_points: user.total_points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamDetailDto {
    #[serde(flatten)]
    pub team: TeamDto,
    pub members: Vec<MemberDto>,
}

#[derive(Debug, Serialize)]
pub struct ActivityDto {
    pub id: i32,
    pub name: String,
    pub emoji: String,
    pub points: i64,
    pub description: String,
}

impl From<activities::Model> for ActivityDto {
    fn from(model: activities::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            emoji: model.emoji,
            points: model.points,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityEntryDto {
    pub id: i32,
    pub activity_id: i32,
    pub date: String,
    pub points: i64,
    pub logged_at: String,
}

impl From<activity_log::Model> for ActivityEntryDto {
    fn from(model: activity_log::Model) -> Self {
        Self {
            id: model.id,
            activity_id: model.activity_id,
            date: model.date,
            points: model.points,
            logged_at: model.logged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayLogDto {
    pub date: String,
    pub entries: Vec<ActivityEntryDto>,
    pub daily_total: i64,
}

#[derive(Debug, Serialize)]
pub struct LoggedActivityDto {
    pub entry: ActivityEntryDto,
    pub daily_total: i64,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub users: u64,
    pub teams: u64,
    pub database: String,
}
