use crate::models::DbSlot;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const SLOT_COLUMNS: &str = "id, owner_id, start_time, end_time, is_booked, created_at, updated_at";

pub async fn create_slot(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<DbSlot> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating slot: id={}, owner_id={}", id, owner_id);

    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        INSERT INTO slots (id, owner_id, start_time, end_time, is_booked, created_at, updated_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, $5)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(slot)
}

pub async fn get_slot_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM slots
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn get_open_slots_by_owner(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    after: DateTime<Utc>,
) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM slots
        WHERE owner_id = $1 AND is_booked = FALSE AND start_time > $2
        ORDER BY start_time ASC, created_seq ASC
        "#
    ))
    .bind(owner_id)
    .bind(after)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

pub async fn get_slots_by_window(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM slots
        WHERE owner_id = $1 AND start_time = $2 AND end_time = $3
          AND NOT EXISTS (
              SELECT 1 FROM appointments
              WHERE appointments.slot_id = slots.id AND appointments.status = 'scheduled'
          )
        ORDER BY is_booked DESC, created_seq ASC
        "#
    ))
    .bind(owner_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

/// Flips `is_booked` to true only if it is still false. Concurrent callers
/// serialize on the row lock and re-check the predicate, so at most one of
/// them gets a row back.
pub async fn claim_slot(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        UPDATE slots
        SET is_booked = TRUE, updated_at = $2
        WHERE id = $1 AND is_booked = FALSE
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    tracing::debug!("Claim on slot {}: won={}", id, slot.is_some());
    Ok(slot)
}

pub async fn reopen_slot(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        UPDATE slots
        SET is_booked = FALSE, updated_at = $3
        WHERE id = $1 AND owner_id = $2
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}
