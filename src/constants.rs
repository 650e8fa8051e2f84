pub mod bonus {
    /// Exact roster size required for a team to be bonus-eligible.
    pub const REQUIRED_TEAM_SIZE: usize = 5;

    /// Minimum points every member must earn on the evaluated day.
    pub const DAILY_POINT_THRESHOLD: i64 = 30;

    /// Points credited to the team when the check succeeds.
    pub const BONUS_POINTS: i64 = 25;
}

pub mod cache {
    use std::time::Duration;

    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub const LEADERBOARD_TTL: Duration = Duration::from_secs(60);
}

pub mod limits {

    pub const DEFAULT_LEADERBOARD_LIMIT: usize = 25;

    pub const MAX_LEADERBOARD_LIMIT: usize = 100;

    pub const MIN_PASSWORD_LENGTH: usize = 8;
}
