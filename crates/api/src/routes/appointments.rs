use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments/availability",
            post(handlers::availability::publish_slot),
        )
        .route(
            "/api/appointments/availability/:owner_id",
            get(handlers::availability::list_open_slots),
        )
        .route(
            "/api/appointments/book",
            post(handlers::appointments::book_appointment),
        )
        .route(
            "/api/appointments/cancel/:appointment_id",
            post(handlers::appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/my-appointments",
            get(handlers::appointments::my_appointments),
        )
}
