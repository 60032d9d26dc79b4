use std::sync::Arc;

use axum::http::StatusCode;
use officehours_api::ApiState;
use officehours_core::{
    ledger::AvailabilityLedger,
    models::{
        appointment::{
            AppointmentStatus, AppointmentView, BookAppointmentResponse, CancelAppointmentResponse,
        },
        identity::Role,
        slot::Slot,
    },
    scheduler::AppointmentScheduler,
};
use officehours_db::mock::repositories::MockAppointmentRepo;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, as_user, server_for};

#[test_log::test(tokio::test)]
async fn test_professor_and_student_scenario() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let student_one = ctx.register(Role::Consumer).await;
    let student_two = ctx.register(Role::Consumer).await;

    let first = ctx.publish(&professor, 9, 10).await;
    let second = ctx.publish(&professor, 10, 11).await;

    // Both students see both slots
    let listing_path = format!("/api/appointments/availability/{}", professor.id);
    let open = as_user(ctx.server.get(&listing_path), student_one.id)
        .await
        .json::<Vec<Slot>>();
    assert_eq!(open.len(), 2);

    // Student one books the first slot
    let response = as_user(ctx.server.post("/api/appointments/book"), student_one.id)
        .json(&json!({ "availability_id": first.id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let booked = response.json::<BookAppointmentResponse>();
    assert_eq!(booked.message, "Appointment booked successfully");
    assert_eq!(booked.appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(booked.appointment.slot_id, Some(first.id));
    assert_eq!(booked.appointment.start_time, first.start_time);

    // Student two books the second slot
    as_user(ctx.server.post("/api/appointments/book"), student_two.id)
        .json(&json!({ "availability_id": second.id }))
        .await
        .assert_status(StatusCode::CREATED);

    // Nothing left to book
    let open = as_user(ctx.server.get(&listing_path), student_two.id)
        .await
        .json::<Vec<Slot>>();
    assert!(open.is_empty());

    // Professor cancels student one's appointment
    let response = as_user(
        ctx.server
            .post(&format!("/api/appointments/cancel/{}", booked.appointment.id)),
        professor.id,
    )
    .await;
    response.assert_status_ok();
    let cancelled = response.json::<CancelAppointmentResponse>();
    assert_eq!(cancelled.message, "Appointment cancelled successfully");
    assert_eq!(cancelled.appointment.status, AppointmentStatus::Cancelled);
    assert!(cancelled.slot_released);
    assert_eq!(cancelled.warning, None);

    // The first slot is open again
    let open = as_user(ctx.server.get(&listing_path), student_two.id)
        .await
        .json::<Vec<Slot>>();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, first.id);

    // The professor sees both appointments with the students' profiles
    let views = as_user(ctx.server.get("/api/appointments/my-appointments"), professor.id)
        .await
        .json::<Vec<AppointmentView>>();
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|view| view.owner.as_ref().map(|p| p.id) == Some(professor.id)));
    let consumers: Vec<_> = views
        .iter()
        .filter_map(|view| view.consumer.as_ref().map(|p| p.username.clone()))
        .collect();
    assert!(consumers.contains(&student_one.username));
    assert!(consumers.contains(&student_two.username));

    // Student one only sees their own appointment
    let views = as_user(ctx.server.get("/api/appointments/my-appointments"), student_one.id)
        .await
        .json::<Vec<AppointmentView>>();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].appointment.id, booked.appointment.id);
    assert_eq!(views[0].appointment.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_second_booking_of_same_slot_is_rejected() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let first = ctx.register(Role::Consumer).await;
    let second = ctx.register(Role::Consumer).await;
    let slot = ctx.publish(&professor, 9, 10).await;

    as_user(ctx.server.post("/api/appointments/book"), first.id)
        .json(&json!({ "availability_id": slot.id }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = as_user(ctx.server.post("/api/appointments/book"), second.id)
        .json(&json!({ "availability_id": slot.id }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["error"], "Time slot not available");
}

#[tokio::test]
async fn test_simultaneous_bookings_have_one_winner() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let first = ctx.register(Role::Consumer).await;
    let second = ctx.register(Role::Consumer).await;
    let slot = ctx.publish(&professor, 9, 10).await;
    let body = json!({ "availability_id": slot.id });

    let (left, right) = tokio::join!(
        async {
            as_user(ctx.server.post("/api/appointments/book"), first.id)
                .json(&body)
                .await
        },
        async {
            as_user(ctx.server.post("/api/appointments/book"), second.id)
                .json(&body)
                .await
        },
    );

    let mut statuses = vec![left.status_code(), right.status_code()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let loser = if left.status_code() == StatusCode::BAD_REQUEST { &left } else { &right };
    assert_eq!(loser.json::<serde_json::Value>()["error"], "Time slot not available");

    let open = as_user(
        ctx.server.get(&format!("/api/appointments/availability/{}", professor.id)),
        professor.id,
    )
    .await
    .json::<Vec<Slot>>();
    assert!(open.is_empty());
}

#[tokio::test]
async fn test_booking_unknown_slot_is_rejected() {
    let ctx = TestContext::new();
    let student = ctx.register(Role::Consumer).await;

    let response = as_user(ctx.server.post("/api/appointments/book"), student.id)
        .json(&json!({ "availability_id": Uuid::new_v4() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_owner_cannot_book() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let slot = ctx.publish(&professor, 9, 10).await;

    let response = as_user(ctx.server.post("/api/appointments/book"), professor.id)
        .json(&json!({ "availability_id": slot.id }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_twice_conflicts() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let student = ctx.register(Role::Consumer).await;
    let slot = ctx.publish(&professor, 9, 10).await;

    let appointment = as_user(ctx.server.post("/api/appointments/book"), student.id)
        .json(&json!({ "availability_id": slot.id }))
        .await
        .json::<BookAppointmentResponse>()
        .appointment;

    let path = format!("/api/appointments/cancel/{}", appointment.id);
    as_user(ctx.server.post(&path), professor.id)
        .await
        .assert_status_ok();

    let response = as_user(ctx.server.post(&path), professor.id).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<serde_json::Value>()["kind"], "already_cancelled");
}

#[tokio::test]
async fn test_other_owner_cannot_cancel() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let other = ctx.register(Role::Owner).await;
    let student = ctx.register(Role::Consumer).await;
    let slot = ctx.publish(&professor, 9, 10).await;

    let appointment = as_user(ctx.server.post("/api/appointments/book"), student.id)
        .json(&json!({ "availability_id": slot.id }))
        .await
        .json::<BookAppointmentResponse>()
        .appointment;

    let response = as_user(
        ctx.server.post(&format!("/api/appointments/cancel/{}", appointment.id)),
        other.id,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_consumer_cannot_cancel() {
    let ctx = TestContext::new();
    let student = ctx.register(Role::Consumer).await;

    let response = as_user(
        ctx.server.post(&format!("/api/appointments/cancel/{}", Uuid::new_v4())),
        student.id,
    )
    .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_store_failure_maps_to_server_error() {
    let ctx = TestContext::new();
    let professor = ctx.register(Role::Owner).await;
    let student = ctx.register(Role::Consumer).await;
    let slot = ctx.publish(&professor, 9, 10).await;

    let mut appointments = MockAppointmentRepo::new();
    appointments
        .expect_insert_appointment()
        .returning(|_| Err(eyre::eyre!("connection reset")));

    let store = ctx.store.clone();
    let scheduler = AppointmentScheduler::new(
        AvailabilityLedger::new(store.clone()),
        Arc::new(appointments),
        store.clone(),
    );
    let server = server_for(Arc::new(ApiState::from_parts(scheduler, store)));

    let response = as_user(server.post("/api/appointments/book"), student.id)
        .json(&json!({ "availability_id": slot.id }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<serde_json::Value>()["kind"], "store_failure");

    // The failed booking left the slot open
    let open = as_user(
        ctx.server.get(&format!("/api/appointments/availability/{}", professor.id)),
        student.id,
    )
    .await
    .json::<Vec<Slot>>();
    assert_eq!(open.len(), 1);
}
