use super::ApiError;
use crate::constants::limits::MAX_LEADERBOARD_LIMIT;

pub fn validate_team_id(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Team id cannot be empty"));
    }
    Ok(trimmed)
}

pub fn validate_limit(limit: usize) -> Result<usize, ApiError> {
    const MIN_LIMIT: usize = 1;

    if !(MIN_LIMIT..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LEADERBOARD_LIMIT
        )));
    }
    Ok(limit)
}

pub fn validate_date(date: &str) -> Result<&str, ApiError> {
    let trimmed = date.trim();
    if chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err() {
        return Err(ApiError::validation(format!(
            "Invalid date '{}': expected YYYY-MM-DD",
            date
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_team_id() {
        assert!(validate_team_id("abc-123").is_ok());
        assert_eq!(validate_team_id("  abc  ").unwrap(), "abc");
        assert!(validate_team_id("").is_err());
        assert!(validate_team_id("   ").is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(50).is_ok());
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(101).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2026-08-05").is_ok());
        assert!(validate_date(" 2026-08-05 ").is_ok());
        assert!(validate_date("2026-13-01").is_err());
        assert!(validate_date("05/08/2026").is_err());
        assert!(validate_date("").is_err());
    }
}
