use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use officehours_api::{
    config::ApiConfig, middleware::error_handling::map_error, with_transport_layers,
};
use officehours_core::{
    errors::BookingError,
    models::{appointment::AppointmentStatus, identity::Role},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use crate::test_utils::{TestContext, as_user};

#[rstest]
#[case::invalid_range(BookingError::InvalidRange, StatusCode::BAD_REQUEST)]
#[case::slot_unavailable(BookingError::SlotUnavailable, StatusCode::BAD_REQUEST)]
#[case::validation(BookingError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case::unauthenticated(BookingError::Unauthenticated, StatusCode::UNAUTHORIZED)]
#[case::forbidden(BookingError::Forbidden("owners only".into()), StatusCode::FORBIDDEN)]
#[case::not_found(BookingError::NotFound("Appointment".into()), StatusCode::NOT_FOUND)]
#[case::slot_not_found(BookingError::SlotNotFound, StatusCode::NOT_FOUND)]
#[case::already_cancelled(BookingError::AlreadyCancelled(Uuid::nil()), StatusCode::CONFLICT)]
#[case::invalid_transition(
    BookingError::InvalidTransition {
        from: AppointmentStatus::Completed,
        to: AppointmentStatus::Cancelled,
    },
    StatusCode::CONFLICT
)]
#[case::store(BookingError::Store(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case::internal(
    BookingError::Internal(Box::new(std::io::Error::new(std::io::ErrorKind::Other, "Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_missing_identity_header_is_unauthenticated() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/appointments/my-appointments").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn test_malformed_identity_header_is_unauthenticated() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/appointments/my-appointments")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_static("not-a-uuid"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_unauthenticated() {
    let ctx = TestContext::new();

    let response = as_user(ctx.server.get("/api/appointments/my-appointments"), Uuid::new_v4()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_known_user_passes_authentication() {
    let ctx = TestContext::new();
    let student = ctx.register(Role::Consumer).await;

    let response = as_user(ctx.server.get("/api/appointments/my-appointments"), student.id).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<serde_json::Value>>().len(), 0);
}

fn transport_config(request_timeout: u64, cors_origins: Option<Vec<String>>) -> ApiConfig {
    ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://localhost/officehours".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::INFO,
        cors_origins,
        request_timeout,
    }
}

fn slow_router() -> Router {
    Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "finished"
            }),
        )
        .route("/fast", get(|| async { "finished" }))
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let router = with_transport_layers(slow_router(), &transport_config(1, None)).unwrap();
    let server = TestServer::new(router).unwrap();

    let response = server.get("/slow").await;

    response.assert_status(StatusCode::REQUEST_TIMEOUT);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["kind"], "timeout");
    assert_eq!(body["error"], "Request timed out");
}

#[tokio::test]
async fn test_fast_request_passes_transport_layers() {
    let config = transport_config(1, Some(vec!["https://campus.example".to_string()]));
    let router = with_transport_layers(slow_router(), &config).unwrap();
    let server = TestServer::new(router).unwrap();

    let response = server.get("/fast").await;

    response.assert_status_ok();
    response.assert_text("finished");
}

#[test]
fn test_invalid_cors_origin_is_a_config_error() {
    let config = transport_config(30, Some(vec!["bad\norigin".to_string()]));

    let err = with_transport_layers(slow_router(), &config).unwrap_err();

    assert!(err.to_string().contains("Invalid CORS origin"));
}
