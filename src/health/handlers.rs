use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;
use tracing::error;

use crate::{
    health::db,
    server::{app_state::AppState, error::ServerError},
    system_log::models::{LogAction, LogSeverity},
};

pub fn health_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/detailed", get(health_detailed))
        .with_state(state.clone())
}

async fn health() -> impl IntoResponse {
    "OK".into_response()
}

async fn health_detailed(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let platform = true;

    let db_status = db::health_check(state.get_pool()).await.is_ok();

    let quizgen_status = match state
        .get_quizgen_client()
        .health_check(state.get_client())
        .await
    {
        Ok(_) => true,
        Err(e) => {
            error!("Failed question generation health check: {}", e);
            state
                .syslog()
                .system()
                .action(LogAction::Other)
                .severity(LogSeverity::Critical)
                .function("health_detailed")
                .description("Failed health check on question generation service")
                .log_async();

            false
        }
    };

    let json = json!({
        "platform": platform,
        "database": db_status,
        "quizgen": quizgen_status,
        "live_rooms": state.get_registry().room_count(),
    });

    Ok((StatusCode::OK, Json(json)))
}
