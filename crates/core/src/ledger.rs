//! # Availability Ledger
//!
//! Owns the set of publishable slots for each owner. The ledger is the only
//! component that mutates a slot's `is_booked` flag, and it does so through
//! the store's conditional updates so that concurrent claims on the same
//! slot resolve to exactly one winner.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::{
    identity::{AuthenticatedIdentity, Role},
    slot::{NewSlot, Slot, TimeWindow},
};
use crate::store::SlotStore;

#[derive(Clone)]
pub struct AvailabilityLedger {
    slots: Arc<dyn SlotStore>,
}

impl AvailabilityLedger {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Publishes a new open slot for the calling owner.
    ///
    /// Overlapping or duplicate windows are accepted; nothing is
    /// de-duplicated.
    ///
    /// # Errors
    ///
    /// * `BookingError::Forbidden` - the caller is not an owner
    /// * `BookingError::InvalidRange` - `end_time <= start_time`
    /// * `BookingError::Store` - the store failed
    pub async fn publish(
        &self,
        identity: &AuthenticatedIdentity,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BookingResult<Slot> {
        identity.require_role(Role::Owner)?;
        let window = TimeWindow::new(start_time, end_time)?;

        let slot = self
            .slots
            .insert_slot(NewSlot {
                owner_id: identity.id,
                window,
            })
            .await?;

        info!(slot_id = %slot.id, owner_id = %slot.owner_id, "Published slot");
        Ok(slot)
    }

    /// Open slots of `owner_id` that start after `after`, earliest first.
    pub async fn list_open_slots(
        &self,
        owner_id: Uuid,
        after: DateTime<Utc>,
    ) -> BookingResult<Vec<Slot>> {
        let slots = self.slots.find_open_slots(owner_id, after).await?;
        debug!(%owner_id, count = slots.len(), "Listed open slots");
        Ok(slots)
    }

    /// Claims the slot for a booking.
    ///
    /// A missing slot and an already booked slot are reported the same way:
    /// `BookingError::SlotUnavailable`.
    pub async fn claim(&self, slot_id: Uuid) -> BookingResult<Slot> {
        match self.slots.claim_slot_if_open(slot_id).await? {
            Some(slot) => {
                debug!(%slot_id, "Claimed slot");
                Ok(slot)
            }
            None => {
                debug!(%slot_id, "Slot claim lost or slot missing");
                Err(BookingError::SlotUnavailable)
            }
        }
    }

    /// Reopens the slot of `owner_id` with exactly this window.
    ///
    /// If several slots share the window, exactly one is reopened: the
    /// earliest-created booked one, or the earliest-created one if none is
    /// booked. Slots still held by a scheduled appointment are never picked.
    pub async fn release(
        &self,
        owner_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BookingResult<Slot> {
        let window = TimeWindow::new(start_time, end_time)?;
        let candidate = self
            .slots
            .find_slots_by_window(owner_id, window)
            .await?
            .into_iter()
            .next()
            .ok_or(BookingError::SlotNotFound)?;

        self.release_slot(owner_id, candidate.id).await
    }

    /// Reopens a slot by id.
    pub async fn release_slot(&self, owner_id: Uuid, slot_id: Uuid) -> BookingResult<Slot> {
        let slot = self
            .slots
            .reopen_slot(owner_id, slot_id)
            .await?
            .ok_or(BookingError::SlotNotFound)?;

        info!(%slot_id, %owner_id, "Released slot");
        Ok(slot)
    }
}
