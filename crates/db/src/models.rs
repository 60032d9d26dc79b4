use chrono::{DateTime, Utc};
use eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use officehours_core::models::{
    appointment::{Appointment, AppointmentStatus},
    identity::{Role, UserProfile},
    slot::Slot,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub consumer_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for UserProfile {
    type Error = Report;

    fn try_from(row: DbUser) -> Result<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| eyre::eyre!("user {} has an invalid role: {}", row.id, e))?;

        Ok(UserProfile {
            id: row.id,
            username: row.username,
            email: row.email,
            role,
            created_at: row.created_at,
        })
    }
}

impl From<DbSlot> for Slot {
    fn from(row: DbSlot) -> Self {
        Slot {
            id: row.id,
            owner_id: row.owner_id,
            start_time: row.start_time,
            end_time: row.end_time,
            is_booked: row.is_booked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let status: AppointmentStatus = row
            .status
            .parse()
            .map_err(|e| eyre::eyre!("appointment {} has an invalid status: {}", row.id, e))?;

        Ok(Appointment {
            id: row.id,
            owner_id: row.owner_id,
            consumer_id: row.consumer_id,
            slot_id: row.slot_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
