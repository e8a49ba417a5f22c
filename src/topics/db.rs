use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{server::error::ServerError, topics::models::Topic};

/// Upserts a topic by name, merging the given subtopics into the stored set.
pub async fn get_or_create_topic(
    pool: &Pool<Postgres>,
    name: &str,
    subtopics: &[String],
) -> Result<Topic, ServerError> {
    let topic = sqlx::query_as::<_, Topic>(
        r#"
        INSERT INTO "topic" (id, name, subtopics)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE
        SET subtopics = ARRAY(SELECT DISTINCT unnest("topic".subtopics || EXCLUDED.subtopics))
        RETURNING id, name, subtopics
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(subtopics)
    .fetch_one(pool)
    .await?;

    Ok(topic)
}
