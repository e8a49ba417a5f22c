use std::sync::Arc;

use gustcache::GustCache;
use reqwest::Client;
use sqlx::{Pool, Postgres};

use crate::{
    client::quizgen_client::QuizGenClient, config::config::CONFIG, server::error::ServerError,
    session::registry::SessionRegistry, system_log::builder::SystemLogBuilder,
};

pub struct AppState {
    pool: Pool<Postgres>,
    client: Client,
    quizgen_client: QuizGenClient,
    registry: SessionRegistry,
    subtopic_cache: GustCache<Vec<String>>,
}

impl AppState {
    pub async fn from_connection_string(connection_string: &str) -> Result<Arc<Self>, ServerError> {
        let pool = Pool::<Postgres>::connect(connection_string).await?;
        let client = Client::new();
        let quizgen_client = QuizGenClient::new(&CONFIG.ai.domain);
        let registry = SessionRegistry::new(CONFIG.room.code_length);
        let subtopic_cache = GustCache::from_ttl(chrono::Duration::minutes(2));

        let state = Arc::new(Self {
            pool,
            client,
            quizgen_client,
            registry,
            subtopic_cache,
        });

        Ok(state)
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }

    pub fn get_quizgen_client(&self) -> &QuizGenClient {
        &self.quizgen_client
    }

    pub fn get_registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn get_subtopic_cache(&self) -> &GustCache<Vec<String>> {
        &self.subtopic_cache
    }

    pub fn syslog(&self) -> SystemLogBuilder {
        SystemLogBuilder::new(&self.pool)
    }
}
