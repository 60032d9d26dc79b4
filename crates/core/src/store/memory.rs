//! In-process implementation of the store ports.
//!
//! All state sits behind a single `RwLock`. Conditional updates take the
//! write lock for the whole check-and-set, which gives them the same
//! atomicity as a conditional `UPDATE` in the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
    identity::{RegisterUserRequest, UserProfile},
    slot::{NewSlot, Slot, TimeWindow},
};
use crate::store::{AppointmentStore, IdentityDirectory, SlotStore};

#[derive(Debug, Default)]
struct MemoryState {
    // Vecs keep insertion order, which stands in for creation order.
    slots: Vec<Slot>,
    appointments: Vec<Appointment>,
    profiles: Vec<UserProfile>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn insert_slot(&self, slot: NewSlot) -> Result<Slot> {
        let now = Utc::now();
        let slot = Slot {
            id: Uuid::new_v4(),
            owner_id: slot.owner_id,
            start_time: slot.window.start(),
            end_time: slot.window.end(),
            is_booked: false,
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.slots.push(slot.clone());
        Ok(slot)
    }

    async fn find_slot(&self, id: Uuid) -> Result<Option<Slot>> {
        let state = self.state.read().await;
        Ok(state.slots.iter().find(|slot| slot.id == id).cloned())
    }

    async fn find_open_slots(&self, owner_id: Uuid, after: DateTime<Utc>) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        let mut slots: Vec<Slot> = state
            .slots
            .iter()
            .filter(|slot| slot.owner_id == owner_id && !slot.is_booked && slot.start_time > after)
            .cloned()
            .collect();
        // Stable sort keeps creation order among equal start times.
        slots.sort_by_key(|slot| slot.start_time);
        Ok(slots)
    }

    async fn find_slots_by_window(&self, owner_id: Uuid, window: TimeWindow) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        let mut slots: Vec<Slot> = state
            .slots
            .iter()
            .filter(|slot| {
                slot.owner_id == owner_id
                    && slot.start_time == window.start()
                    && slot.end_time == window.end()
            })
            .filter(|slot| {
                !state.appointments.iter().any(|appointment| {
                    appointment.slot_id == Some(slot.id)
                        && appointment.status == AppointmentStatus::Scheduled
                })
            })
            .cloned()
            .collect();
        slots.sort_by_key(|slot| !slot.is_booked);
        Ok(slots)
    }

    async fn claim_slot_if_open(&self, id: Uuid) -> Result<Option<Slot>> {
        let mut state = self.state.write().await;
        let claimed = state
            .slots
            .iter_mut()
            .find(|slot| slot.id == id && !slot.is_booked)
            .map(|slot| {
                slot.is_booked = true;
                slot.updated_at = Utc::now();
                slot.clone()
            });
        Ok(claimed)
    }

    async fn reopen_slot(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Slot>> {
        let mut state = self.state.write().await;
        let reopened = state
            .slots
            .iter_mut()
            .find(|slot| slot.id == id && slot.owner_id == owner_id)
            .map(|slot| {
                slot.is_booked = false;
                slot.updated_at = Utc::now();
                slot.clone()
            });
        Ok(reopened)
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            owner_id: appointment.owner_id,
            consumer_id: appointment.consumer_id,
            slot_id: Some(appointment.slot_id),
            start_time: appointment.window.start(),
            end_time: appointment.window.end(),
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        let slot_taken = state.appointments.iter().any(|existing| {
            existing.slot_id == appointment.slot_id
                && existing.status == AppointmentStatus::Scheduled
        });
        if slot_taken {
            eyre::bail!(
                "slot {} already has a scheduled appointment",
                appointment.slot_id.unwrap_or_default()
            );
        }
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment_for_owner(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Appointment>> {
        let state = self.state.read().await;
        Ok(state
            .appointments
            .iter()
            .find(|appointment| appointment.id == id && appointment.owner_id == owner_id)
            .cloned())
    }

    async fn find_appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|appointment| match filter {
                AppointmentFilter::Owner(id) => appointment.owner_id == id,
                AppointmentFilter::Consumer(id) => appointment.consumer_id == id,
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.start_time);
        Ok(appointments)
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let mut state = self.state.write().await;
        let updated = state
            .appointments
            .iter_mut()
            .find(|appointment| {
                appointment.id == id && appointment.owner_id == owner_id && appointment.status == from
            })
            .map(|appointment| {
                appointment.status = to;
                appointment.updated_at = Utc::now();
                appointment.clone()
            });
        Ok(updated)
    }
}

#[async_trait]
impl IdentityDirectory for MemoryStore {
    async fn insert_profile(&self, request: RegisterUserRequest) -> Result<Option<UserProfile>> {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: request.username,
            email: request.email,
            role: request.role,
            created_at: Utc::now(),
        };

        let mut state = self.state.write().await;
        if state.profiles.iter().any(|existing| existing.email == profile.email) {
            return Ok(None);
        }
        state.profiles.push(profile.clone());
        Ok(Some(profile))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|profile| profile.id == id).cloned())
    }

    async fn find_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .filter(|profile| ids.contains(&profile.id))
            .cloned()
            .collect())
    }
}
