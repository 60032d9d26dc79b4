use axum::http::StatusCode;
use officehours_core::models::identity::{PublicProfile, Role, UserProfile};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, as_user};

#[tokio::test]
async fn test_register_accepts_legacy_role_names() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "username": "dr-ada",
            "email": "ada@university.example",
            "role": "professor",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let profile = response.json::<UserProfile>();
    assert_eq!(profile.role, Role::Owner);
    assert_eq!(profile.username, "dr-ada");
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let ctx = TestContext::new();
    let body = json!({
        "username": "sam",
        "email": "sam@university.example",
        "role": "student",
    });

    ctx.server
        .post("/api/users")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx.server.post("/api/users").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["kind"], "validation");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "username": "sam",
            "email": "not-an-email",
            "role": "consumer",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user_returns_public_profile() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let student = ctx.register(Role::Consumer).await;

    let response = as_user(ctx.server.get(&format!("/api/users/{}", professor.id)), student.id).await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<PublicProfile>(),
        PublicProfile::from(professor.clone())
    );
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let student = ctx.register(Role::Consumer).await;

    let response = as_user(ctx.server.get(&format!("/api/users/{}", Uuid::new_v4())), student.id).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<serde_json::Value>()["status"], "ok");

    let version = ctx.server.get("/version").await;
    version.assert_status_ok();
    assert_eq!(
        version.json::<serde_json::Value>()["version"],
        env!("CARGO_PKG_VERSION")
    );
}
