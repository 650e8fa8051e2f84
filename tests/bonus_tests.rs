//! Service-level tests for the team bonus evaluator: eligibility gates,
//! idempotence, and concurrent duplicate prevention.

use sea_orm::{ActiveModelTrait, Set};
use stride::config::{Config, SecurityConfig};
use stride::db::User;
use stride::entities::activity_log;
use stride::services::BonusError;
use stride::state::SharedState;

const DATE: &str = "2026-08-05"; // a Wednesday

async fn test_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("stride-bonus-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.scheduler.enabled = false;

    SharedState::new(config).await.expect("state init failed")
}

async fn seed_team(state: &SharedState) -> String {
    let creator = seed_member(state, "creator", None).await;
    let team = state
        .store
        .create_team("Wednesday Warriors", None, &creator.id)
        .await
        .unwrap();
    state
        .store
        .set_user_team(&creator.id, Some(&team.id))
        .await
        .unwrap();
    team.id
}

async fn seed_member(state: &SharedState, tag: &str, team_id: Option<&str>) -> User {
    let user = state
        .store
        .create_user(
            &format!("{tag}@example.com"),
            &format!("Member {tag}"),
            "password-123",
            &SecurityConfig::default(),
        )
        .await
        .unwrap();

    if let Some(team_id) = team_id {
        state
            .store
            .set_user_team(&user.id, Some(team_id))
            .await
            .unwrap();
    }

    user
}

/// Insert a raw activity log entry so daily totals can be set to exact
/// values the seeded catalog can't produce (e.g. 29).
async fn credit_points(state: &SharedState, user_id: &str, date: &str, points: i64) {
    let entry = activity_log::ActiveModel {
        user_id: Set(user_id.to_string()),
        activity_id: Set(1),
        date: Set(date.to_string()),
        points: Set(points),
        logged_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    entry.insert(&state.store.conn).await.unwrap();
}

/// A full team of five, each member credited `points` on `date`.
async fn seed_full_team(state: &SharedState, date: &str, points: &[i64; 5]) -> String {
    let team_id = seed_team(state).await;

    let creator = state.store.team_roster(&team_id).await.unwrap();
    credit_points(state, &creator[0].id, date, points[0]).await;

    for (i, member_points) in points.iter().enumerate().skip(1) {
        let member = seed_member(state, &format!("m{i}"), Some(&team_id)).await;
        credit_points(state, &member.id, date, *member_points).await;
    }

    team_id
}

#[tokio::test]
async fn test_success_awards_bonus_once() {
    let state = test_state().await;
    let team_id = seed_full_team(&state, DATE, &[30, 30, 30, 30, 30]).await;

    let before = state.store.get_team(&team_id).await.unwrap().unwrap();

    let outcome = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();
    assert!(outcome.achieved);

    let record = state
        .store
        .find_bonus_record(&team_id, DATE)
        .await
        .unwrap()
        .expect("a bonus record must exist after a successful evaluation");
    assert!(record.achieved);
    assert_eq!(record.bonus_points, 25);

    let after = state.store.get_team(&team_id).await.unwrap().unwrap();
    assert_eq!(after.total_points, before.total_points + 25);
}

#[tokio::test]
async fn test_evaluation_is_idempotent() {
    let state = test_state().await;
    let team_id = seed_full_team(&state, DATE, &[40, 35, 30, 50, 31]).await;

    let first = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();
    let points_after_first = state
        .store
        .get_team(&team_id)
        .await
        .unwrap()
        .unwrap()
        .total_points;

    let second = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();
    let points_after_second = state
        .store
        .get_team(&team_id)
        .await
        .unwrap()
        .unwrap()
        .total_points;

    assert_eq!(first.achieved, second.achieved);
    assert_eq!(points_after_first, points_after_second);

    let history = state.bonus_service.history(&team_id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_roster_size_gate() {
    let state = test_state().await;
    let team_id = seed_team(&state).await;

    // Three more members: four total, all above threshold
    for i in 0..3 {
        seed_member(&state, &format!("r{i}"), Some(&team_id)).await;
    }
    let roster = state.store.team_roster(&team_id).await.unwrap();
    assert_eq!(roster.len(), 4);
    for member in &roster {
        credit_points(&state, &member.id, DATE, 40).await;
    }

    let outcome = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();

    assert!(!outcome.achieved);
    assert_eq!(outcome.message, "team needs 4/5 members");
    assert!(
        state
            .store
            .find_bonus_record(&team_id, DATE)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_threshold_gate() {
    let state = test_state().await;
    let team_id = seed_full_team(&state, DATE, &[30, 30, 29, 30, 30]).await;

    let outcome = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();

    assert!(!outcome.achieved);
    assert!(outcome.message.contains("30"));
    assert!(
        state
            .store
            .find_bonus_record(&team_id, DATE)
            .await
            .unwrap()
            .is_none()
    );

    // Failed checks are not persisted, so team points are untouched
    let team = state.store.get_team(&team_id).await.unwrap().unwrap();
    assert_eq!(team.total_points, 0);
}

#[tokio::test]
async fn test_concurrent_evaluations_record_once() {
    let state = test_state().await;
    let team_id = seed_full_team(&state, DATE, &[30, 30, 30, 30, 30]).await;

    let (a, b) = tokio::join!(
        state.bonus_service.evaluate(&team_id, DATE),
        state.bonus_service.evaluate(&team_id, DATE),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert!(a.achieved);
    assert!(b.achieved);

    // Exactly one record and exactly one credit, enforced by the unique
    // index on (team_id, date)
    let history = state.bonus_service.history(&team_id).await.unwrap();
    assert_eq!(history.len(), 1);

    let team = state.store.get_team(&team_id).await.unwrap().unwrap();
    assert_eq!(team.total_points, 25);
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected_before_io() {
    let state = test_state().await;

    let err = state
        .bonus_service
        .evaluate("", "2026-08-05")
        .await
        .unwrap_err();
    assert!(matches!(err, BonusError::Validation(_)));

    let err = state
        .bonus_service
        .evaluate("some-team", "Wednesday")
        .await
        .unwrap_err();
    assert!(matches!(err, BonusError::Validation(_)));

    let err = state
        .bonus_service
        .evaluate("no-such-team", "2026-08-05")
        .await
        .unwrap_err();
    assert!(matches!(err, BonusError::TeamNotFound(_)));
}

#[tokio::test]
async fn test_history_is_newest_first_and_empty_for_fresh_team() {
    let state = test_state().await;
    let team_id = seed_team(&state).await;

    assert!(state.bonus_service.history(&team_id).await.unwrap().is_empty());

    for date in ["2026-07-29", "2026-08-12", "2026-08-05"] {
        state
            .store
            .record_bonus_achievement(&team_id, date, 25)
            .await
            .unwrap();
    }

    let history = state.bonus_service.history(&team_id).await.unwrap();
    let dates: Vec<_> = history.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2026-08-12", "2026-08-05", "2026-07-29"]);
    assert!(history.iter().all(|r| r.achieved && r.bonus_points == 25));
}

#[tokio::test]
async fn test_logging_invalidates_cached_daily_total() {
    let state = test_state().await;
    let team_id = seed_full_team(&state, DATE, &[30, 30, 25, 30, 30]).await;

    // First evaluation fails and caches the low member's total
    let outcome = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();
    assert!(!outcome.achieved);

    // The low member logs a Walk (10 pts) through the activity service,
    // which clears their cached total for the day
    let roster = state.store.team_roster(&team_id).await.unwrap();
    let mut low_member = None;
    for member in &roster {
        if state.store.daily_points(&member.id, DATE).await.unwrap() == 25 {
            low_member = Some(member.id.clone());
        }
    }
    let low_member = low_member.expect("one member must be below threshold");

    state
        .activity_service
        .log(&low_member, 1, Some(DATE))
        .await
        .unwrap();

    let outcome = state.bonus_service.evaluate(&team_id, DATE).await.unwrap();
    assert!(outcome.achieved, "stale cached total was not invalidated");
}

#[tokio::test]
async fn test_sweep_awards_only_full_qualifying_teams() {
    let state = test_state().await;

    let today = chrono::Utc::now()
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();

    let full_team = seed_full_team(&state, &today, &[30, 30, 30, 30, 30]).await;

    // A second, underfull team is skipped entirely
    let small_creator = seed_member(&state, "small", None).await;
    let small_team = state
        .store
        .create_team("Understaffed", None, &small_creator.id)
        .await
        .unwrap();
    state
        .store
        .set_user_team(&small_creator.id, Some(&small_team.id))
        .await
        .unwrap();

    let scheduler = stride::scheduler::Scheduler::new(
        state.clone(),
        stride::config::SchedulerConfig::default(),
    );
    let stats = scheduler.run_once().await.unwrap();

    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.awarded, 1);
    assert_eq!(stats.skipped, 1);

    assert!(
        state
            .store
            .find_bonus_record(&full_team, &today)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        state
            .store
            .find_bonus_record(&small_team.id, &today)
            .await
            .unwrap()
            .is_none()
    );
}
