use crate::models::DbUser;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Returns `None` when the email is already registered.
pub async fn create_user(
    pool: &Pool<Postgres>,
    username: &str,
    email: &str,
    role: &str,
) -> Result<Option<DbUser>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, role={}", id, role);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, username, email, role, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, username, email, role, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(role)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, email, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_users_by_ids(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<Vec<DbUser>> {
    let users = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, username, email, role, created_at
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
