use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};

use crate::{
    server::{app_state::AppState, error::ServerError},
    topics::{
        db,
        models::{QuestionsRequest, QuestionsResponse, SubtopicsRequest, SubtopicsResponse},
    },
};

pub fn topics_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/subtopics", post(get_subtopics))
        .route("/questions", post(preview_questions))
        .with_state(state)
}

async fn get_subtopics(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubtopicsRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "topic is required".into(),
        ));
    }

    let subtopics = fetch_subtopics_cached(&state, topic).await?;

    Ok((StatusCode::OK, Json(SubtopicsResponse { subtopics })))
}

/// Previews a generated question set without installing anything on a room.
/// Host tooling for building a game by hand.
async fn preview_questions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuestionsRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "topic is required".into(),
        ));
    }

    let subtopics = if request.subtopics.is_empty() {
        fetch_subtopics_cached(&state, topic).await?
    } else {
        request.subtopics.clone()
    };

    let generated = state
        .get_quizgen_client()
        .generate_questions(
            state.get_client(),
            topic,
            &subtopics,
            request.n,
            request.difficulty,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(QuestionsResponse {
            questions: generated.questions,
        }),
    ))
}

/// Read-through cache in front of the generation service. Generated
/// subtopics are merged into the persisted topic row, so the catalogue grows
/// with every distinct topic asked for.
pub async fn fetch_subtopics_cached(
    state: &Arc<AppState>,
    topic: &str,
) -> Result<Vec<String>, ServerError> {
    let key = topic.to_lowercase();

    state
        .get_subtopic_cache()
        .get(&key, || generate_and_store_subtopics(state.clone(), key.clone()))
        .await
}

async fn generate_and_store_subtopics(
    state: Arc<AppState>,
    topic: String,
) -> Result<Vec<String>, ServerError> {
    let generated = state
        .get_quizgen_client()
        .generate_subtopics(state.get_client(), &topic)
        .await?;

    let row = db::get_or_create_topic(state.get_pool(), &topic, &generated.subtopics).await?;

    Ok(row.subtopics)
}
