//! Integration tests for the HTTP API: auth, activities, teams,
//! leaderboards, and system endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use stride::config::Config;
use tower::ServiceExt;

/// Default API key seeded by migration (must match m20250810_initial.rs)
const DEFAULT_API_KEY: &str = "stride_default_api_key_please_regenerate";

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("stride-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.scheduler.enabled = false;
    config.server.secure_cookies = false;

    let state = stride::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    stride::api::router(state).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/system/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "email": "runner@example.com",
        "full_name": "Road Runner",
        "password": "beep-beep-123"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["email"], "runner@example.com");
    assert_eq!(body["data"]["total_points"], 0);

    // Duplicate email is a conflict
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Login returns the API key; use it on a protected route
    let login = serde_json::json!({
        "email": "runner@example.com",
        "password": "beep-beep-123"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&login).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let api_key = body["data"]["api_key"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {api_key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["full_name"], "Road Runner");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = spawn_app().await;

    let bad_email = serde_json::json!({
        "email": "not-an-email",
        "full_name": "Nobody",
        "password": "long-enough-pw"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&bad_email).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let short_password = serde_json::json!({
        "email": "short@example.com",
        "full_name": "Shorty",
        "password": "short"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&short_password).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_catalog_is_seeded() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/activities")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let catalog = body["data"].as_array().unwrap();
    assert!(!catalog.is_empty());
    assert!(catalog.iter().any(|a| a["name"] == "Walk"));
    assert!(catalog.iter().all(|a| a["points"].as_i64().unwrap() > 0));
}

#[tokio::test]
async fn test_log_activity_and_read_day_log() {
    let app = spawn_app().await;

    let log = serde_json::json!({
        "activity_id": 1,
        "date": "2026-08-05"
    });

    let response = app.clone().oneshot(post_json("/api/activities/log", &log)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let first_total = body["data"]["daily_total"].as_i64().unwrap();
    assert!(first_total > 0);

    // Log the same activity again; the daily total accumulates
    let response = app.clone().oneshot(post_json("/api/activities/log", &log)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["daily_total"].as_i64().unwrap(), first_total * 2);

    let response = app
        .clone()
        .oneshot(get("/api/activities/log/2026-08-05"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["daily_total"].as_i64().unwrap(), first_total * 2);

    // Unknown activity id is a 404
    let bad = serde_json::json!({ "activity_id": 9999 });
    let response = app.clone().oneshot(post_json("/api/activities/log", &bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed date is rejected before any write
    let bad = serde_json::json!({ "activity_id": 1, "date": "08/05/2026" });
    let response = app.oneshot(post_json("/api/activities/log", &bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_team_create_and_membership() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/teams",
            &serde_json::json!({ "name": "Step Sisters" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let team_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["total_points"], 0);

    // Creator already joined; creating another team is a conflict
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/teams",
            &serde_json::json!({ "name": "Second Wind" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Detail includes the roster
    let response = app
        .clone()
        .oneshot(get(&format!("/api/teams/{team_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);

    // Leave, then join again by id
    let response = app
        .clone()
        .oneshot(post_json("/api/teams/me/leave", &serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/teams/{team_id}/join"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown team is a 404
    let response = app
        .clone()
        .oneshot(get("/api/teams/no-such-team"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bonus_endpoints_over_http() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/teams",
            &serde_json::json!({ "name": "Lone Wolves" }),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let team_id = body["data"]["id"].as_str().unwrap().to_string();

    // One member out of five: the roster gate fails, nothing is recorded
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/teams/{team_id}/bonus/evaluate"),
            &serde_json::json!({ "date": "2026-08-05" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["achieved"], false);
    assert_eq!(body["data"]["message"], "team needs 1/5 members");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/teams/{team_id}/bonus/history")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Malformed date is a validation error
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/teams/{team_id}/bonus/evaluate"),
            &serde_json::json!({ "date": "Wednesday" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown team is a 404
    let response = app
        .oneshot(post_json(
            "/api/teams/ghost/bonus/evaluate",
            &serde_json::json!({ "date": "2026-08-05" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboards() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/teams",
            &serde_json::json!({ "name": "Pacesetters" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Log an activity so the admin (and their team) have points
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/activities/log",
            &serde_json::json!({ "activity_id": 4 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/leaderboard/users"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let rows = body["data"].as_array().unwrap();
    assert!(!rows.is_empty());
    assert_eq!(rows[0]["rank"], 1);
    assert!(rows[0]["total_points"].as_i64().unwrap() > 0);

    let response = app
        .clone()
        .oneshot(get("/api/leaderboard/teams"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows[0]["name"], "Pacesetters");

    // Out-of-range limit is rejected
    let response = app
        .oneshot(get("/api/leaderboard/users?limit=0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_system_status_shape() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/system/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["data"]["database"], "ok");
    assert!(body["data"]["users"].as_u64().unwrap() >= 1);
}
