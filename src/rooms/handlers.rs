use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use uuid::Uuid;

use crate::{
    auth::{self, models::Subject},
    config::config::CONFIG,
    rooms::{
        db,
        models::{
            CreateRoomRequest, CreateRoomResponse, HostInfo, JoinRoomRequest, JoinRoomResponse,
        },
    },
    server::{app_state::AppState, error::ServerError},
    session::room::Role,
    system_log::models::LogAction,
};

pub fn rooms_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(create_room))
        .route("/join", post(join_room))
        .with_state(state)
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "username must not be empty".into(),
        ));
    }

    let host_id = auth::db::create_guest_user(state.get_pool(), Some(username)).await?;
    let room_id = Uuid::new_v4();

    let session = state.get_registry().create_room(
        room_id,
        host_id,
        username.to_string(),
        CONFIG.room.max_players,
    )?;

    // The live session is authoritative; roll it back if the room row
    // cannot be written.
    if let Err(e) = db::insert_room(state.get_pool(), &room_id, &session.code, &host_id).await {
        state.get_registry().remove(&session.code);
        return Err(e);
    }

    state
        .syslog()
        .subject(Subject(host_id))
        .action(LogAction::Create)
        .function("create_room")
        .description(&format!("Room {} created", session.code))
        .log_async();

    let response = CreateRoomResponse {
        room_id,
        room_code: session.code.clone(),
        qr_code: join_link(&session.code),
        host: HostInfo {
            user_id: host_id,
            user_name: username.to_string(),
            role: Role::Host,
        },
        ws: ws_url(&session.code, &host_id),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn join_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ServerError::Api(
            StatusCode::BAD_REQUEST,
            "username is required".into(),
        ));
    }

    let session = state.get_registry().get(&request.room_code)?;
    let user_id = auth::db::create_guest_user(state.get_pool(), Some(username)).await?;

    session.join(user_id, username).await?;

    let response = JoinRoomResponse {
        user_id,
        username: username.to_string(),
        room_id: session.room_id,
        room_code: session.code.clone(),
        role: Role::Player,
        ws: ws_url(&session.code, &user_id),
    };

    Ok((StatusCode::OK, Json(response)))
}

fn join_link(room_code: &str) -> String {
    format!("{}/join?code={}", CONFIG.server.public_url, room_code)
}

fn ws_url(room_code: &str, user_id: &Uuid) -> String {
    format!("{}/ws/rooms/{}/{}", CONFIG.server.ws_url, room_code, user_id)
}
