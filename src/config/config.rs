use once_cell::sync::Lazy;
use serde::Deserialize;

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().unwrap_or_else(|e| panic!("Failed to load configuration: {}", e)));

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub server: ServerConfig,
    pub ai: AiConfig,
    pub room: RoomConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Base url clients use to reach the http api, e.g. `https://quizio.app`
    pub public_url: String,
    /// Base url clients use for the websocket channel, e.g. `wss://quizio.app`
    pub ws_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub domain: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoomConfig {
    pub max_players: usize,
    pub code_length: usize,
    pub idle_timeout_secs: u64,
    pub default_timer_secs: i32,
}

impl Config {
    /// Loads configuration from `QUIZIO__` prefixed environment variables,
    /// e.g. `QUIZIO__DATABASE_URL` and `QUIZIO__SERVER__PORT`.
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("server.address", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.public_url", "http://localhost:8080")?
            .set_default("server.ws_url", "ws://localhost:8080")?
            .set_default("room.max_players", 8)?
            .set_default("room.code_length", 6)?
            .set_default("room.idle_timeout_secs", 3600)?
            .set_default("room.default_timer_secs", 30)?
            .add_source(config::Environment::with_prefix("QUIZIO").separator("__"))
            .build()?
            .try_deserialize()
    }
}
