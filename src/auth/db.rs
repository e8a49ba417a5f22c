use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::server::error::ServerError;

pub async fn create_guest_user(
    pool: &Pool<Postgres>,
    username: Option<&str>,
) -> Result<Uuid, ServerError> {
    let guest_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO "guest_user" (id, username, created_at)
        VALUES ($1, $2, now())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(guest_id)
}
