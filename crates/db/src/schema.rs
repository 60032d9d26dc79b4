use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        username VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        role VARCHAR(16) NOT NULL CHECK (role IN ('owner', 'consumer')),
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS slots (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        created_seq BIGSERIAL NOT NULL,
        owner_id UUID NOT NULL REFERENCES users(id),
        start_time TIMESTAMP WITH TIME ZONE NOT NULL,
        end_time TIMESTAMP WITH TIME ZONE NOT NULL,
        is_booked BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_slot_range CHECK (end_time > start_time)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        owner_id UUID NOT NULL REFERENCES users(id),
        consumer_id UUID NOT NULL REFERENCES users(id),
        slot_id UUID NULL REFERENCES slots(id),
        start_time TIMESTAMP WITH TIME ZONE NOT NULL,
        end_time TIMESTAMP WITH TIME ZONE NOT NULL,
        status VARCHAR(16) NOT NULL DEFAULT 'scheduled'
            CHECK (status IN ('scheduled', 'cancelled', 'completed')),
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_appointment_range CHECK (end_time > start_time)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_slots_owner_start ON slots(owner_id, start_time);",
    "CREATE INDEX IF NOT EXISTS idx_appointments_owner_start ON appointments(owner_id, start_time);",
    "CREATE INDEX IF NOT EXISTS idx_appointments_consumer_start ON appointments(consumer_id, start_time);",
    // At most one live appointment per slot, whatever the claim path did.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_one_scheduled_per_slot
        ON appointments(slot_id) WHERE status = 'scheduled';
    "#,
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
