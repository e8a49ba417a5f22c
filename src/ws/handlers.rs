use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    rooms,
    server::{app_state::AppState, error::ServerError},
    session::{
        error::SessionError,
        events::{ClientEvent, ServerEvent},
        room::RoomSession,
        runner::finalize_game,
    },
};

pub fn ws_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms/{room_code}/{user_id}", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((room_code, user_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ServerError> {
    // Reject unknown rooms before upgrading.
    let session = state.get_registry().get(&room_code)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session, user_id)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session: Arc<RoomSession>,
    user_id: Uuid,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    if let Err(e) = session.register_connection(user_id, tx.clone()).await {
        let event = ServerEvent::Error {
            code: "connection_rejected".into(),
            message: e.to_string(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            let _ = ws_sender.send(Message::Text(json.into())).await;
        }
        let _ = ws_sender.close().await;
        return;
    }

    info!(user_id = %user_id, room_code = %session.code, "Websocket connected");

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&event) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    let left = handle_client_event(&state, &session, user_id, &tx, event).await;
                    if left {
                        break;
                    }
                }
                Err(_) => {
                    let _ = tx.send(ServerEvent::Error {
                        code: "bad_event".into(),
                        message: "Could not parse event".into(),
                    });
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    session.disconnect(user_id);
    if session.should_remove().await {
        state.get_registry().remove(&session.code);
        if let Err(e) = rooms::db::close_room(state.get_pool(), &session.room_id).await {
            error!("Failed to close room {}: {}", session.room_id, e);
        }
    }

    send_task.abort();
    info!(user_id = %user_id, room_code = %session.code, "Websocket closed");
}

/// Dispatches one client event. Returns true when the participant left and
/// the socket should close.
async fn handle_client_event(
    state: &Arc<AppState>,
    session: &Arc<RoomSession>,
    user_id: Uuid,
    sender: &UnboundedSender<ServerEvent>,
    event: ClientEvent,
) -> bool {
    match event {
        ClientEvent::Heartbeat => {
            let _ = sender.send(ServerEvent::HeartbeatAck);
            false
        }
        ClientEvent::Ready => {
            report(sender, "ready_rejected", session.set_ready(user_id, true).await);
            false
        }
        ClientEvent::Unready => {
            report(sender, "ready_rejected", session.set_ready(user_id, false).await);
            false
        }
        ClientEvent::Answer {
            question_id,
            answer,
        } => {
            report(
                sender,
                "answer_rejected",
                session.record_answer(user_id, question_id, &answer).await,
            );
            false
        }
        ClientEvent::Leave => {
            match session.leave(user_id).await {
                Ok(outcome) => {
                    // A leaving host ends a running round; its results still
                    // have to reach the database.
                    if let Some(summary) = &outcome.ended_game {
                        finalize_game(state, session, summary).await;
                    }
                }
                Err(e) => report(sender, "leave_rejected", Err(e)),
            }
            true
        }
    }
}

fn report(sender: &UnboundedSender<ServerEvent>, code: &str, result: Result<(), SessionError>) {
    if let Err(e) = result {
        let _ = sender.send(ServerEvent::Error {
            code: code.into(),
            message: e.to_string(),
        });
    }
}
