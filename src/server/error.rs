use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{client::quizgen_client::QuizGenClientError, session::error::SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{1}")]
    Api(StatusCode, String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to serialize object: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    QuizGen(#[from] QuizGenClientError),
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Api(status, _) => *status,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Session(e) => session_status_code(e),
            ServerError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::QuizGen(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

fn session_status_code(error: &SessionError) -> StatusCode {
    match error {
        SessionError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::RoomClosed
        | SessionError::NotHost
        | SessionError::NotParticipant => StatusCode::FORBIDDEN,
        SessionError::RoomFull | SessionError::UsernameTaken(_) => StatusCode::CONFLICT,
        SessionError::GameInProgress
        | SessionError::ParticipantsNotReady
        | SessionError::NoPlayers
        | SessionError::NoWaitingGame
        | SessionError::NoActiveGame
        | SessionError::QuestionNotOpen
        | SessionError::AlreadyAnswered
        | SessionError::HostCannotAnswer => StatusCode::BAD_REQUEST,
        SessionError::CodesExhausted | SessionError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
