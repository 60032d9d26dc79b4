//! PostgreSQL implementation of the core store ports.
//!
//! Each port method delegates to a repository function and converts the row
//! type into the domain model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use uuid::Uuid;

use officehours_core::{
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        identity::{RegisterUserRequest, UserProfile},
        slot::{NewSlot, Slot, TimeWindow},
    },
    store::{AppointmentStore, IdentityDirectory, SlotStore},
};

use crate::repositories::{appointment, slot, user};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SlotStore for PgStore {
    async fn insert_slot(&self, new_slot: NewSlot) -> Result<Slot> {
        let row = slot::create_slot(
            &self.pool,
            new_slot.owner_id,
            new_slot.window.start(),
            new_slot.window.end(),
        )
        .await?;
        Ok(row.into())
    }

    async fn find_slot(&self, id: Uuid) -> Result<Option<Slot>> {
        Ok(slot::get_slot_by_id(&self.pool, id).await?.map(Slot::from))
    }

    async fn find_open_slots(&self, owner_id: Uuid, after: DateTime<Utc>) -> Result<Vec<Slot>> {
        let rows = slot::get_open_slots_by_owner(&self.pool, owner_id, after).await?;
        Ok(rows.into_iter().map(Slot::from).collect())
    }

    async fn find_slots_by_window(&self, owner_id: Uuid, window: TimeWindow) -> Result<Vec<Slot>> {
        let rows =
            slot::get_slots_by_window(&self.pool, owner_id, window.start(), window.end()).await?;
        Ok(rows.into_iter().map(Slot::from).collect())
    }

    async fn claim_slot_if_open(&self, id: Uuid) -> Result<Option<Slot>> {
        Ok(slot::claim_slot(&self.pool, id).await?.map(Slot::from))
    }

    async fn reopen_slot(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Slot>> {
        Ok(slot::reopen_slot(&self.pool, owner_id, id).await?.map(Slot::from))
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn insert_appointment(&self, new_appointment: NewAppointment) -> Result<Appointment> {
        let row = appointment::create_appointment(
            &self.pool,
            new_appointment.owner_id,
            new_appointment.consumer_id,
            new_appointment.slot_id,
            new_appointment.window.start(),
            new_appointment.window.end(),
        )
        .await?;
        Appointment::try_from(row)
    }

    async fn find_appointment_for_owner(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Appointment>> {
        appointment::get_appointment_for_owner(&self.pool, id, owner_id)
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn find_appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
        let rows = match filter {
            AppointmentFilter::Owner(owner_id) => {
                appointment::get_appointments_by_owner(&self.pool, owner_id).await?
            }
            AppointmentFilter::Consumer(consumer_id) => {
                appointment::get_appointments_by_consumer(&self.pool, consumer_id).await?
            }
        };
        rows.into_iter().map(Appointment::try_from).collect()
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        appointment::update_appointment_status(&self.pool, id, owner_id, from.as_str(), to.as_str())
            .await?
            .map(Appointment::try_from)
            .transpose()
    }
}

#[async_trait]
impl IdentityDirectory for PgStore {
    async fn insert_profile(&self, request: RegisterUserRequest) -> Result<Option<UserProfile>> {
        user::create_user(
            &self.pool,
            &request.username,
            &request.email,
            request.role.as_str(),
        )
        .await?
        .map(UserProfile::try_from)
        .transpose()
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        user::get_user_by_id(&self.pool, id)
            .await?
            .map(UserProfile::try_from)
            .transpose()
    }

    async fn find_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>> {
        let rows = user::get_users_by_ids(&self.pool, ids).await?;
        rows.into_iter().map(UserProfile::try_from).collect()
    }
}
