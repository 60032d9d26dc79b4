use crate::models::DbAppointment;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str =
    "id, owner_id, consumer_id, slot_id, start_time, end_time, status, created_at, updated_at";

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    consumer_id: Uuid,
    slot_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, slot_id={}, consumer_id={}",
        id, slot_id, consumer_id
    );

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, owner_id, consumer_id, slot_id, start_time, end_time, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', $7, $7)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(consumer_id)
    .bind(slot_id)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_for_owner(
    pool: &Pool<Postgres>,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE id = $1 AND owner_id = $2
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointments_by_owner(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE owner_id = $1
        ORDER BY start_time ASC, created_at ASC
        "#
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_appointments_by_consumer(
    pool: &Pool<Postgres>,
    consumer_id: Uuid,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE consumer_id = $1
        ORDER BY start_time ASC, created_at ASC
        "#
    ))
    .bind(consumer_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Conditional status update; returns `None` if the appointment is not the
/// owner's or its status is no longer `from`.
pub async fn update_appointment_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    owner_id: Uuid,
    from: &str,
    to: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $4, updated_at = $5
        WHERE id = $1 AND owner_id = $2 AND status = $3
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(from)
    .bind(to)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}
