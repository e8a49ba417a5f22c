use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{client::quizgen_client::GeneratedQuestion, games::models::Difficulty};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub subtopics: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubtopicsRequest {
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubtopicsResponse {
    pub subtopics: Vec<String>,
}

fn default_question_count() -> u32 {
    5
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsRequest {
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default = "default_question_count")]
    pub n: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<GeneratedQuestion>,
}
