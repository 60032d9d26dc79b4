use axum::http::StatusCode;
use chrono::Duration;
use officehours_core::models::{identity::Role, slot::{PublishSlotResponse, Slot}};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{TestContext, as_user, base_time};

#[test_log::test(tokio::test)]
async fn test_owner_publishes_slot() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let start = base_time() + Duration::hours(10);

    let response = as_user(ctx.server.post("/api/appointments/availability"), professor.id)
        .json(&json!({
            "start_time": start,
            "end_time": start + Duration::hours(1),
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<PublishSlotResponse>();
    assert_eq!(body.message, "Availability added successfully");
    assert_eq!(body.availability.owner_id, professor.id);
    assert_eq!(body.availability.start_time, start);
    assert!(!body.availability.is_booked);
}

#[tokio::test]
async fn test_consumer_cannot_publish() {
    let ctx = TestContext::new();
    let student = ctx.register(Role::Consumer).await;
    let start = base_time();

    let response = as_user(ctx.server.post("/api/appointments/availability"), student.id)
        .json(&json!({
            "start_time": start,
            "end_time": start + Duration::hours(1),
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inverted_window_is_rejected() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let start = base_time();

    let response = as_user(ctx.server.post("/api/appointments/availability"), professor.id)
        .json(&json!({
            "start_time": start,
            "end_time": start,
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["kind"], "invalid_range");
}

#[tokio::test]
async fn test_listing_returns_open_slots_earliest_first() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let student = ctx.register(Role::Consumer).await;

    let late = ctx.publish(&professor, 14, 15).await;
    let early = ctx.publish(&professor, 9, 10).await;
    let booked = ctx.publish(&professor, 11, 12).await;

    as_user(ctx.server.post("/api/appointments/book"), student.id)
        .json(&json!({ "availability_id": booked.id }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = as_user(
        ctx.server.get(&format!("/api/appointments/availability/{}", professor.id)),
        student.id,
    )
    .await;

    response.assert_status_ok();
    let ids: Vec<_> = response.json::<Vec<Slot>>().into_iter().map(|slot| slot.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[tokio::test]
async fn test_listing_honours_after_parameter() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;

    ctx.publish(&professor, 9, 10).await;
    let afternoon = ctx.publish(&professor, 15, 16).await;

    let cutoff = (base_time() + Duration::hours(12)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let response = as_user(
        ctx.server
            .get(&format!("/api/appointments/availability/{}", professor.id))
            .add_query_param("after", cutoff),
        professor.id,
    )
    .await;

    response.assert_status_ok();
    let slots = response.json::<Vec<Slot>>();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, afternoon.id);
}

#[tokio::test]
async fn test_listing_requires_identity() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;

    let response = ctx
        .server
        .get(&format!("/api/appointments/availability/{}", professor.id))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
