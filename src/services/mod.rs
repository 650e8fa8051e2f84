pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod bonus_service;
pub mod bonus_service_impl;
pub use bonus_service::{BonusError, BonusRecordEntry, BonusService, EvaluationOutcome};
pub use bonus_service_impl::SeaOrmBonusService;

pub mod activity_service;
pub use activity_service::{ActivityError, ActivityService, DayLog, LoggedActivity};

pub mod team_service;
pub use team_service::{TeamDetail, TeamError, TeamService};

pub mod leaderboard_service;
pub use leaderboard_service::{LeaderboardError, LeaderboardRow, LeaderboardService};
