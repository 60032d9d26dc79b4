use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;
use crate::models::identity::PublicProfile;
use crate::models::slot::{Slot, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// `scheduled` may move to `cancelled` or `completed`; both are terminal.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(BookingError::Validation(format!(
                "Unknown appointment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub consumer_id: Uuid,
    /// The slot claimed for this appointment. `None` for rows recorded
    /// before slots were referenced directly.
    pub slot_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub owner_id: Uuid,
    pub consumer_id: Uuid,
    pub slot_id: Uuid,
    pub window: TimeWindow,
}

impl NewAppointment {
    pub fn for_claimed_slot(slot: &Slot, consumer_id: Uuid, window: TimeWindow) -> Self {
        Self {
            owner_id: slot.owner_id,
            consumer_id,
            slot_id: slot.id,
            window,
        }
    }
}

/// Which side of the appointment a listing is filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentFilter {
    Owner(Uuid),
    Consumer(Uuid),
}

/// What happened to the slot when an appointment was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "slot", rename_all = "snake_case")]
pub enum SlotRelease {
    Released(Slot),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub appointment: Appointment,
    pub slot_release: SlotRelease,
}

impl CancelOutcome {
    pub fn slot_released(&self) -> bool {
        matches!(self.slot_release, SlotRelease::Released(_))
    }
}

/// An appointment joined with both parties' public profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub owner: Option<PublicProfile>,
    pub consumer: Option<PublicProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub availability_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentResponse {
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentResponse {
    pub message: String,
    pub appointment: Appointment,
    pub slot_released: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
