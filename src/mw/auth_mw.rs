use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::models::Subject,
    server::{app_state::AppState, error::ServerError},
    system_log::models::LogSeverity,
};

/// Requires a guest uuid in the `Authorization` header and stores it as the
/// request's `Subject`. Host authority is room-scoped and checked in the
/// handlers, not here.
pub async fn auth_mw(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(header) = extract_header(AUTHORIZATION.as_str(), req.headers()) else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing authorization header".into(),
        ));
    };

    let value = header.strip_prefix("Bearer ").unwrap_or(&header);
    let Ok(user_id) = value.parse::<Uuid>() else {
        warn!("Rejected request with malformed authorization header");
        state
            .syslog()
            .severity(LogSeverity::Warning)
            .function("auth_mw")
            .description("Malformed authorization header")
            .log_async();

        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Authorization header is not a valid user id".into(),
        ));
    };

    req.extensions_mut().insert(Subject(user_id));

    Ok(next.run(req).await)
}

fn extract_header(key: &str, header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(key)
        .and_then(|header| header.to_str().ok())
        .map(|s| s.to_owned())
}
