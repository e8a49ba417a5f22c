use sqlx::{Pool, Postgres};

use crate::system_log::models::{LogAction, LogSeverity, SubjectType};

#[allow(clippy::too_many_arguments)]
pub async fn create_system_log(
    pool: &Pool<Postgres>,
    subject_id: &str,
    subject_type: SubjectType,
    action: LogAction,
    severity: LogSeverity,
    function: &str,
    description: &str,
    metadata: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "system_log" (subject_id, subject_type, action, severity, function, description, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        "#,
    )
    .bind(subject_id)
    .bind(subject_type.to_string())
    .bind(action.to_string())
    .bind(severity.to_string())
    .bind(function)
    .bind(description)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}
