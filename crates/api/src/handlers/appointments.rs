use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use officehours_core::models::appointment::{
    AppointmentView, BookAppointmentRequest, BookAppointmentResponse, CancelAppointmentResponse,
    SlotRelease,
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// Books an open slot for the calling consumer
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<BookAppointmentResponse>), AppError> {
    let appointment = state
        .scheduler
        .book(&identity, payload.availability_id)
        .await?;

    let response = BookAppointmentResponse {
        message: "Appointment booked successfully".to_string(),
        appointment,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Cancels one of the calling owner's appointments
///
/// The cancellation stands even when the slot could not be reopened; the
/// response then carries `slot_released: false` and a warning.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentUser(identity): CurrentUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<CancelAppointmentResponse>, AppError> {
    let outcome = state.scheduler.cancel(&identity, appointment_id).await?;

    let slot_released = outcome.slot_released();
    let warning = match outcome.slot_release {
        SlotRelease::Released(_) => None,
        SlotRelease::NotFound => {
            Some("No matching slot was found to reopen for this appointment".to_string())
        }
        SlotRelease::Failed(reason) => Some(format!("The slot could not be reopened: {reason}")),
    };

    Ok(Json(CancelAppointmentResponse {
        message: "Appointment cancelled successfully".to_string(),
        appointment: outcome.appointment,
        slot_released,
        warning,
    }))
}

/// Lists the appointments the caller takes part in, with both parties' profiles
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn my_appointments(
    State(state): State<Arc<ApiState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<AppointmentView>>, AppError> {
    let views = state.scheduler.list_for_identity(&identity).await?;
    Ok(Json(views))
}
