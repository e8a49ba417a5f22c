use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{error, info};

use crate::games::models::Difficulty;

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedSubtopics {
    pub subtopics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub subtopic: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, thiserror::Error)]
pub enum QuizGenClientError {
    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Api error: {0} - {1}")]
    ApiError(StatusCode, String),
}

/// Client for the external question generation service. The service owns the
/// prompt engineering; this side only speaks its json api.
#[derive(Debug, Clone)]
pub struct QuizGenClient {
    domain: String,
}

impl QuizGenClient {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();

        Self { domain }
    }

    pub async fn health_check(&self, client: &Client) -> Result<(), QuizGenClientError> {
        let response = client.get(format!("{}/health", self.domain)).send().await?;
        if !response.status().is_success() {
            error!("Failed health check on question generation service");
            return Err(QuizGenClientError::ApiError(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to reach question generation service".into(),
            ));
        }

        Ok(())
    }

    pub async fn generate_subtopics(
        &self,
        client: &Client,
        topic: &str,
    ) -> Result<GeneratedSubtopics, QuizGenClientError> {
        self.post_json(client, "subtopics", &json!({ "topic": topic }))
            .await
    }

    pub async fn generate_questions(
        &self,
        client: &Client,
        topic: &str,
        subtopics: &[String],
        n: u32,
        difficulty: Difficulty,
    ) -> Result<GeneratedQuestions, QuizGenClientError> {
        let body = json!({
            "topic": topic,
            "subtopics": subtopics,
            "n": n,
            "difficulty": difficulty,
        });

        self.post_json(client, "questions", &body).await
    }

    async fn post_json<T, B>(
        &self,
        client: &Client,
        uri: &str,
        body: &B,
    ) -> Result<T, QuizGenClientError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}/{}", self.domain, uri);
        info!("QuizGenClient sending request to: {}", url);

        let response = client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or("No body".into());
            error!("QuizGenClient request failed: {} - {}", status, body);
            return Err(QuizGenClientError::ApiError(status, body));
        }

        Ok(response.json::<T>().await?)
    }
}
