use thiserror::Error;
use uuid::Uuid;

use crate::models::appointment::AppointmentStatus;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid time range: end time must be after start time")]
    InvalidRange,

    #[error("Time slot not available")]
    SlotUnavailable,

    #[error("Time slot not found")]
    SlotNotFound,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Appointment {0} is already cancelled")]
    AlreadyCancelled(Uuid),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidRange => "invalid_range",
            BookingError::SlotUnavailable => "slot_unavailable",
            BookingError::SlotNotFound => "slot_not_found",
            BookingError::NotFound(_) => "not_found",
            BookingError::AlreadyCancelled(_) => "already_cancelled",
            BookingError::InvalidTransition { .. } => "invalid_transition",
            BookingError::Forbidden(_) => "forbidden",
            BookingError::Unauthenticated => "unauthenticated",
            BookingError::Validation(_) => "validation",
            BookingError::Store(_) => "store_failure",
            BookingError::Internal(_) => "internal",
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
