//! # User Handlers
//!
//! Profile registration and lookup. Credentials live with the upstream
//! authentication proxy, so a profile is only a name, an email and a role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use officehours_core::{
    errors::BookingError,
    models::identity::{PublicProfile, RegisterUserRequest, UserProfile},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn register_user(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    payload.validate()?;

    let email = payload.email.clone();
    let profile = state
        .directory
        .insert_profile(payload)
        .await?
        .ok_or_else(|| BookingError::Validation(format!("a user with email {email} already exists")))?;
    info!(user_id = %profile.id, role = %profile.role, "Registered user");

    Ok((StatusCode::CREATED, Json(profile)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_user(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_identity): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicProfile>, AppError> {
    let profile = state
        .directory
        .find_profile(id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("User with ID {} not found", id)))?;

    Ok(Json(profile.into()))
}
