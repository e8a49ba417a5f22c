use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{games::models::QuestionPublic, session::room::Participant};

/// Client to server messages on the room websocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEvent {
    Heartbeat,
    Ready,
    Unready,
    #[serde(rename_all = "camelCase")]
    Answer {
        question_id: Uuid,
        answer: String,
    },
    Leave,
}

/// Server to client messages on the room websocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Connected {
        user_id: Uuid,
        room_code: String,
        participants: Vec<Participant>,
    },
    HeartbeatAck,
    Error {
        code: String,
        message: String,
    },

    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        user_id: Uuid,
        username: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        user_id: Uuid,
        username: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayerReady {
        user_id: Uuid,
        ready: bool,
    },

    #[serde(rename_all = "camelCase")]
    GameCreated {
        game_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        game_id: Uuid,
        question_count: usize,
    },
    Question {
        question: QuestionPublic,
        index: usize,
        total: usize,
    },
    #[serde(rename_all = "camelCase")]
    QuestionClosed {
        question_id: Uuid,
        correct_answer: String,
        leaderboard: Vec<LeaderboardEntry>,
    },
    #[serde(rename_all = "camelCase")]
    GameEnded {
        game_id: Uuid,
        leaderboard: Vec<LeaderboardEntry>,
    },
    RoomClosed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub username: String,
    pub score: i64,
}
