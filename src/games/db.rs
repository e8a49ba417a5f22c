use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    games::models::{GameStatus, Question},
    server::error::ServerError,
    session::events::LeaderboardEntry,
};

pub async fn insert_game(
    pool: &Pool<Postgres>,
    game_id: &Uuid,
    room_id: &Uuid,
    topic_id: &Uuid,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "game" (id, room_id, topic_id, status, created_at)
        VALUES ($1, $2, $3, $4, now())
        "#,
    )
    .bind(game_id)
    .bind(room_id)
    .bind(topic_id)
    .bind(GameStatus::Waiting.to_string())
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to persist game".into()));
    }

    Ok(())
}

pub async fn set_game_status(
    pool: &Pool<Postgres>,
    game_id: &Uuid,
    status: GameStatus,
) -> Result<(), ServerError> {
    sqlx::query(
        r#"
        UPDATE "game"
        SET status = $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(game_id)
    .bind(status.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_questions(
    pool: &Pool<Postgres>,
    topic_id: &Uuid,
    questions: &[Question],
) -> Result<(), ServerError> {
    let mut tx = pool.begin().await?;

    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO "question" (id, game_id, topic_id, subtopic, question, options, correct_answer, timer)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(question.id)
        .bind(question.game_id)
        .bind(topic_id)
        .bind(&question.subtopic)
        .bind(&question.question)
        .bind(&question.options)
        .bind(&question.correct_answer)
        .bind(question.timer)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn record_results(
    pool: &Pool<Postgres>,
    game_id: &Uuid,
    leaderboard: &[LeaderboardEntry],
) -> Result<(), ServerError> {
    let mut tx = pool.begin().await?;

    for (placement, entry) in leaderboard.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO "game_result" (game_id, user_id, username, score, placement)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(game_id)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.score)
        .bind(placement as i32 + 1)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
