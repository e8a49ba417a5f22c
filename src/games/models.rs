use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::quizgen_client::GeneratedQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Ended,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Waiting => write!(f, "waiting"),
            GameStatus::InProgress => write!(f, "in_progress"),
            GameStatus::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: Uuid,
    pub game_id: Uuid,
    pub subtopic: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub timer: i32,
}

impl Question {
    pub fn from_generated(game_id: Uuid, generated: GeneratedQuestion, timer: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            subtopic: generated.subtopic,
            question: generated.question,
            options: generated.options,
            correct_answer: generated.answer,
            timer,
        }
    }

    /// The shape players see. The correct answer stays on the server until
    /// the question closes.
    pub fn public(&self) -> QuestionPublic {
        QuestionPublic {
            id: self.id,
            question: self.question.clone(),
            options: self.options.clone(),
            timer: self.timer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPublic {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub timer: i32,
}

fn default_question_count() -> u32 {
    5
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub room_code: String,
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default = "default_question_count")]
    pub n: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub game_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub room_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub game_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGameRequest {
    pub room_code: String,
    pub game_id: Uuid,
}
