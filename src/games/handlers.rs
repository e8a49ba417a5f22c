use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::models::Subject,
    config::config::CONFIG,
    games::{
        db,
        models::{
            CreateGameRequest, CreateGameResponse, EndGameRequest, GameStatus, Question,
            StartGameRequest, StartGameResponse,
        },
    },
    server::{app_state::AppState, error::ServerError},
    session::{
        error::SessionError,
        room::EndedBy,
        runner::{finalize_game, spawn_round},
    },
    system_log::models::LogAction,
    topics,
};

pub fn games_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/create", post(create_game))
        .route("/start", post(start_game))
        .route("/end", post(end_game))
        .with_state(state)
}

async fn create_game(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Response, ServerError> {
    if request.room_code.trim().is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "roomCode is required".into(),
        ));
    }
    let topic = request.topic.trim().to_string();
    if topic.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "topic is required".into(),
        ));
    }

    let session = state.get_registry().get(&request.room_code)?;
    if subject.0 != session.host_id {
        return Err(ServerError::Api(
            StatusCode::FORBIDDEN,
            "Only the host can create the game.".into(),
        ));
    }

    // A live game means we hand back its id instead of generating a new
    // question set.
    if let Some((game_id, status)) = session.current_game().await {
        if status != GameStatus::Ended {
            return Ok((StatusCode::OK, Json(CreateGameResponse { game_id })).into_response());
        }
    }

    let subtopics = if request.subtopics.is_empty() {
        topics::handlers::fetch_subtopics_cached(&state, &topic).await?
    } else {
        request.subtopics.clone()
    };

    let generated = state
        .get_quizgen_client()
        .generate_questions(
            state.get_client(),
            &topic,
            &subtopics,
            request.n,
            request.difficulty,
        )
        .await?;

    let game_id = Uuid::new_v4();
    let questions: Vec<Question> = generated
        .questions
        .into_iter()
        .map(|q| Question::from_generated(game_id, q, CONFIG.room.default_timer_secs))
        .collect();

    if questions.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_GATEWAY,
            "Generation service returned no questions".into(),
        ));
    }

    let handle = session
        .install_game(subject.0, game_id, questions.clone())
        .await?;
    if !handle.created {
        // Another create raced us onto the room; return the winner's id.
        return Ok((
            StatusCode::OK,
            Json(CreateGameResponse {
                game_id: handle.game_id,
            }),
        )
            .into_response());
    }

    let topic_row = topics::db::get_or_create_topic(state.get_pool(), &topic, &subtopics).await?;
    db::insert_game(state.get_pool(), &game_id, &session.room_id, &topic_row.id).await?;
    db::insert_questions(state.get_pool(), &topic_row.id, &questions).await?;

    state
        .syslog()
        .subject(subject)
        .action(LogAction::Create)
        .function("create_game")
        .description(&format!(
            "Game {} created in room {} with {} questions",
            game_id,
            session.code,
            questions.len()
        ))
        .log_async();

    Ok((StatusCode::CREATED, Json(CreateGameResponse { game_id })).into_response())
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Json(request): Json<StartGameRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if request.room_code.trim().is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "roomCode is required".into(),
        ));
    }

    let session = state.get_registry().get(&request.room_code)?;
    let round = session.start_game(subject.0).await?;
    let game_id = round.game_id;

    db::set_game_status(state.get_pool(), &game_id, GameStatus::InProgress).await?;
    spawn_round(state.clone(), session.clone(), round);

    state
        .syslog()
        .subject(subject)
        .action(LogAction::Update)
        .function("start_game")
        .description(&format!("Game {} started in room {}", game_id, session.code))
        .log_async();

    Ok((StatusCode::OK, Json(StartGameResponse { game_id })))
}

async fn end_game(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Json(request): Json<EndGameRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if request.room_code.trim().is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "roomCode and gameId required".into(),
        ));
    }

    let session = state.get_registry().get(&request.room_code)?;

    match session.current_game().await {
        Some((game_id, _)) if game_id == request.game_id => {}
        Some(_) => {
            return Err(ServerError::Api(
                StatusCode::BAD_REQUEST,
                "gameId does not match the game on this room".into(),
            ));
        }
        None => return Err(ServerError::Session(SessionError::NoActiveGame)),
    }

    let summary = session.end_game(EndedBy::Host(subject.0)).await?;

    finalize_game(&state, &session, &summary).await;

    Ok((StatusCode::OK, Json(json!({ "status": "game_ended" }))))
}
