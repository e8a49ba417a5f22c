use std::time::Duration;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use dotenv::dotenv;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::{
    auth::handlers::public_auth_routes,
    config::config::CONFIG,
    games::handlers::games_routes,
    health::handlers::health_routes,
    mw::{auth_mw::auth_mw, request_mw::request_mw},
    rooms::{db as rooms_db, handlers::rooms_routes},
    server::app_state::AppState,
    topics::handlers::topics_routes,
    ws::handlers::ws_routes,
};

mod auth;
mod client;
mod config;
mod games;
mod health;
mod mw;
mod rooms;
mod server;
mod session;
mod system_log;
mod tests;
mod topics;
mod ws;

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_connection_string(&CONFIG.database_url)
        .await
        .unwrap_or_else(|e| panic!("{}", e));

    // Sweep rooms that are closed, empty or idle past the timeout
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = sweep_state
                .get_registry()
                .sweep_idle(Duration::from_secs(CONFIG.room.idle_timeout_secs))
                .await;

            for session in removed {
                if let Err(e) =
                    rooms_db::close_room(sweep_state.get_pool(), &session.room_id).await
                {
                    error!("Failed to close swept room {}: {}", session.room_id, e);
                }
            }
        }
    });

    // Initialize routes
    let public_routes = Router::new()
        .nest("/health", health_routes(state.clone()))
        .nest("/guest-user", public_auth_routes(state.clone()))
        .nest("/rooms", rooms_routes(state.clone()))
        .nest("/ws", ws_routes(state.clone()));

    let protected_routes = Router::new()
        .nest("/games", games_routes(state.clone()))
        .nest("/topics", topics_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), auth_mw));

    let app = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn(request_mw));

    // Initialize webserver
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", CONFIG.server.address, CONFIG.server.port))
            .await
            .unwrap();

    info!(
        "Server listening on address: {}",
        listener.local_addr().unwrap()
    );
    axum::serve(listener, app).await.unwrap();
}
