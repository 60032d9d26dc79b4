//! # Authentication Module
//!
//! Resolves the caller of a request into an `AuthenticatedIdentity`.
//!
//! Credentials are verified upstream by the authentication proxy, which
//! forwards the verified user id in the `X-User-Id` header. This module
//! only looks that id up in the identity directory to learn the caller's
//! role; it never inspects passwords or tokens itself.
//!
//! A request without the header, with a malformed id, or with an id the
//! directory does not know is rejected with `401 Unauthorized` before any
//! handler touches scheduling state.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};
use officehours_core::{errors::BookingError, models::identity::AuthenticatedIdentity};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Header carrying the id of the already-authenticated user
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Extractor for the identity of the calling user
///
/// # Example
///
/// ```ignore
/// async fn handler(CurrentUser(identity): CurrentUser) -> String {
///     format!("hello {}", identity.id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthenticatedIdentity);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(&USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(BookingError::Unauthenticated)?;

        let profile = state.directory.find_profile(user_id).await?.ok_or_else(|| {
            debug!(%user_id, "Rejecting request from unknown user");
            BookingError::Unauthenticated
        })?;

        Ok(CurrentUser(profile.identity()))
    }
}
