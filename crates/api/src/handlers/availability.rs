//! # Availability Handlers
//!
//! Owners publish bookable slots here; anyone signed in can list an owner's
//! open slots.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use officehours_core::models::slot::{PublishSlotRequest, PublishSlotResponse, Slot};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// Query parameters for listing open slots
#[derive(Debug, Default, Deserialize)]
pub struct OpenSlotsQuery {
    /// Only slots starting after this instant are listed (default: now)
    pub after: Option<DateTime<Utc>>,
}

/// Publishes a new slot for the calling owner
///
/// Responds with `201 Created`. Overlapping slots are accepted.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn publish_slot(
    State(state): State<Arc<ApiState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<PublishSlotRequest>,
) -> Result<(StatusCode, Json<PublishSlotResponse>), AppError> {
    let slot = state
        .ledger()
        .publish(&identity, payload.start_time, payload.end_time)
        .await?;

    let response = PublishSlotResponse {
        message: "Availability added successfully".to_string(),
        availability: slot,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_open_slots(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_identity): CurrentUser,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let after = query.after.unwrap_or_else(Utc::now);
    let slots = state.ledger().list_open_slots(owner_id, after).await?;

    Ok(Json(slots))
}
