//! # Store Ports
//!
//! Persistence contracts the scheduling core is written against. Every
//! method is a suspension point and returns an `eyre::Result`; the core
//! turns failures into `BookingError::Store` and never retries them.
//!
//! Mutations that guard an invariant are conditional updates, which each
//! backend performs as a single atomic step:
//!
//! - [`SlotStore::claim_slot_if_open`] flips `is_booked` from `false` to
//!   `true` only if it is still `false`.
//! - [`AppointmentStore::transition_appointment`] changes the status only
//!   if it still holds the expected value.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use uuid::Uuid;

use crate::models::{
    appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
    identity::{RegisterUserRequest, UserProfile},
    slot::{NewSlot, Slot, TimeWindow},
};

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn insert_slot(&self, slot: NewSlot) -> Result<Slot>;

    async fn find_slot(&self, id: Uuid) -> Result<Option<Slot>>;

    /// Open slots of `owner_id` starting strictly after `after`, ascending by
    /// start time, then by creation order.
    async fn find_open_slots(&self, owner_id: Uuid, after: DateTime<Utc>) -> Result<Vec<Slot>>;

    /// Slots of `owner_id` with exactly this window. Booked slots come
    /// first, then creation order. Slots referenced by a scheduled
    /// appointment are left out.
    async fn find_slots_by_window(&self, owner_id: Uuid, window: TimeWindow) -> Result<Vec<Slot>>;

    /// Atomically marks the slot booked if it exists and is open.
    async fn claim_slot_if_open(&self, id: Uuid) -> Result<Option<Slot>>;

    /// Marks the slot open. `None` if no such slot belongs to `owner_id`.
    async fn reopen_slot(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Slot>>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment>;

    async fn find_appointment_for_owner(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Appointment>>;

    /// Appointments matching `filter`, ascending by start time.
    async fn find_appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>>;

    /// Moves the appointment from `from` to `to` if it belongs to `owner_id`
    /// and its status is still `from`.
    async fn transition_appointment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>>;
}

/// Read side of the identity collaborator, plus profile registration.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Registers a profile. `None` means the email is already taken.
    async fn insert_profile(&self, request: RegisterUserRequest) -> Result<Option<UserProfile>>;

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;

    async fn find_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>>;
}
