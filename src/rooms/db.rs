use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::server::error::ServerError;

pub async fn insert_room(
    pool: &Pool<Postgres>,
    room_id: &Uuid,
    room_code: &str,
    host_id: &Uuid,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "room" (id, room_code, host_id, status, created_at)
        VALUES ($1, $2, $3, 'active', now())
        "#,
    )
    .bind(room_id)
    .bind(room_code)
    .bind(host_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to persist room".into()));
    }

    Ok(())
}

pub async fn close_room(pool: &Pool<Postgres>, room_id: &Uuid) -> Result<(), ServerError> {
    sqlx::query(
        r#"
        UPDATE "room"
        SET status = 'closed', closed_at = now()
        WHERE id = $1
        "#,
    )
    .bind(room_id)
    .execute(pool)
    .await?;

    Ok(())
}
