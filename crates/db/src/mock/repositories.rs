use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

use officehours_core::{
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        identity::{RegisterUserRequest, UserProfile},
        slot::{NewSlot, Slot, TimeWindow},
    },
    store::{AppointmentStore, IdentityDirectory, SlotStore},
};

// Mock stores for failure injection in tests
mock! {
    pub SlotRepo {}

    #[async_trait]
    impl SlotStore for SlotRepo {
        async fn insert_slot(&self, slot: NewSlot) -> eyre::Result<Slot>;

        async fn find_slot(&self, id: Uuid) -> eyre::Result<Option<Slot>>;

        async fn find_open_slots(
            &self,
            owner_id: Uuid,
            after: DateTime<Utc>,
        ) -> eyre::Result<Vec<Slot>>;

        async fn find_slots_by_window(
            &self,
            owner_id: Uuid,
            window: TimeWindow,
        ) -> eyre::Result<Vec<Slot>>;

        async fn claim_slot_if_open(&self, id: Uuid) -> eyre::Result<Option<Slot>>;

        async fn reopen_slot(&self, owner_id: Uuid, id: Uuid) -> eyre::Result<Option<Slot>>;
    }
}

mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentStore for AppointmentRepo {
        async fn insert_appointment(
            &self,
            appointment: NewAppointment,
        ) -> eyre::Result<Appointment>;

        async fn find_appointment_for_owner(
            &self,
            id: Uuid,
            owner_id: Uuid,
        ) -> eyre::Result<Option<Appointment>>;

        async fn find_appointments(
            &self,
            filter: AppointmentFilter,
        ) -> eyre::Result<Vec<Appointment>>;

        async fn transition_appointment(
            &self,
            id: Uuid,
            owner_id: Uuid,
            from: AppointmentStatus,
            to: AppointmentStatus,
        ) -> eyre::Result<Option<Appointment>>;
    }
}

mock! {
    pub UserDirectory {}

    #[async_trait]
    impl IdentityDirectory for UserDirectory {
        async fn insert_profile(&self, request: RegisterUserRequest) -> eyre::Result<Option<UserProfile>>;

        async fn find_profile(&self, id: Uuid) -> eyre::Result<Option<UserProfile>>;

        async fn find_profiles(&self, ids: &[Uuid]) -> eyre::Result<Vec<UserProfile>>;
    }
}
