use core::fmt;
use std::{collections::HashMap, sync::Arc, time::Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, RwLock, mpsc::UnboundedSender};
use uuid::Uuid;

use crate::{
    games::models::{GameStatus, Question},
    session::{
        error::SessionError,
        events::{LeaderboardEntry, ServerEvent},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Player => write!(f, "player"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Joined,
    Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub status: ParticipantStatus,
    pub score: i64,
}

struct AnswerRecord {
    correct: bool,
    score: i64,
}

/// One quiz round installed on a room. Lives inside the room lock, so every
/// status transition is serialized with joins and answers.
pub struct GameSession {
    pub game_id: Uuid,
    pub status: GameStatus,
    questions: Vec<Question>,
    current: usize,
    open: bool,
    question_opened_at: Instant,
    answers: HashMap<Uuid, HashMap<Uuid, AnswerRecord>>,
    abort: Arc<Notify>,
}

impl GameSession {
    fn new(game_id: Uuid, questions: Vec<Question>) -> Self {
        Self {
            game_id,
            status: GameStatus::Waiting,
            questions,
            current: 0,
            open: false,
            question_opened_at: Instant::now(),
            answers: HashMap::new(),
            abort: Arc::new(Notify::new()),
        }
    }
}

struct RoomInner {
    status: RoomStatus,
    participants: HashMap<Uuid, Participant>,
    game: Option<GameSession>,
    last_activity: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct GameHandle {
    pub game_id: Uuid,
    pub created: bool,
}

/// Snapshot handed to the round runner when a game starts.
pub struct StartedRound {
    pub game_id: Uuid,
    pub questions: Vec<Question>,
    pub abort: Arc<Notify>,
}

pub struct ClosedQuestion {
    pub question_id: Uuid,
    pub correct_answer: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug)]
pub struct RoundSummary {
    pub game_id: Uuid,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy)]
pub enum EndedBy {
    Host(Uuid),
    Runner,
}

#[derive(Debug)]
pub struct LeaveOutcome {
    pub closed: bool,
    pub empty: bool,
    /// Set when the departure ended a game that was in progress; the caller
    /// persists the summary.
    pub ended_game: Option<RoundSummary>,
}

/// A live room. All lifecycle state sits behind one write lock so concurrent
/// join/start/end requests serialize into atomic transitions. Connected
/// sockets are tracked separately for fan-out.
pub struct RoomSession {
    pub room_id: Uuid,
    pub code: String,
    pub host_id: Uuid,
    capacity: usize,
    inner: RwLock<RoomInner>,
    connections: DashMap<Uuid, UnboundedSender<ServerEvent>>,
}

impl RoomSession {
    pub fn new(
        room_id: Uuid,
        code: String,
        host_id: Uuid,
        host_name: String,
        capacity: usize,
    ) -> Self {
        let host = Participant {
            user_id: host_id,
            username: host_name,
            role: Role::Host,
            status: ParticipantStatus::Joined,
            score: 0,
        };

        let mut participants = HashMap::new();
        participants.insert(host_id, host);

        Self {
            room_id,
            code,
            host_id,
            capacity,
            inner: RwLock::new(RoomInner {
                status: RoomStatus::Active,
                participants,
                game: None,
                last_activity: Instant::now(),
            }),
            connections: DashMap::new(),
        }
    }

    /// Registers a websocket sender for a participant and replies with a
    /// snapshot of the current lobby.
    pub async fn register_connection(
        &self,
        user_id: Uuid,
        sender: UnboundedSender<ServerEvent>,
    ) -> Result<(), SessionError> {
        {
            let inner = self.inner.read().await;
            if inner.status == RoomStatus::Closed {
                return Err(SessionError::RoomClosed);
            }
            if !inner.participants.contains_key(&user_id) {
                return Err(SessionError::NotParticipant);
            }

            let mut participants: Vec<Participant> =
                inner.participants.values().cloned().collect();
            participants.sort_by(|a, b| a.username.cmp(&b.username));

            // Registered while the lock is held, so no broadcast can land
            // between the snapshot and the registration.
            self.connections.insert(user_id, sender.clone());

            let _ = sender.send(ServerEvent::Connected {
                user_id,
                room_code: self.code.clone(),
                participants,
            });
        }

        self.touch().await;

        Ok(())
    }

    /// Drops the socket registration but keeps the participant, so a
    /// reconnect can pick the seat back up.
    pub fn disconnect(&self, user_id: Uuid) {
        self.connections.remove(&user_id);
    }

    pub fn broadcast(&self, event: ServerEvent) {
        self.connections
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }

    pub async fn join(&self, user_id: Uuid, username: &str) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();

            if inner.status == RoomStatus::Closed {
                return Err(SessionError::RoomClosed);
            }
            if inner.participants.contains_key(&user_id) {
                // Rejoin of a known participant, nothing to change.
                return Ok(());
            }
            if let Some(game) = &inner.game {
                if game.status == GameStatus::InProgress {
                    return Err(SessionError::GameInProgress);
                }
            }
            if inner.participants.len() >= self.capacity {
                return Err(SessionError::RoomFull);
            }
            if inner
                .participants
                .values()
                .any(|p| p.username.eq_ignore_ascii_case(username))
            {
                return Err(SessionError::UsernameTaken(username.to_string()));
            }

            inner.participants.insert(
                user_id,
                Participant {
                    user_id,
                    username: username.to_string(),
                    role: Role::Player,
                    status: ParticipantStatus::Joined,
                    score: 0,
                },
            );
        }

        self.broadcast(ServerEvent::PlayerJoined {
            user_id,
            username: username.to_string(),
        });

        Ok(())
    }

    pub async fn set_ready(&self, user_id: Uuid, ready: bool) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();

            let Some(participant) = inner.participants.get_mut(&user_id) else {
                return Err(SessionError::NotParticipant);
            };

            participant.status = if ready {
                ParticipantStatus::Ready
            } else {
                ParticipantStatus::Joined
            };
        }

        self.broadcast(ServerEvent::PlayerReady { user_id, ready });

        Ok(())
    }

    /// Installs a waiting game on the room. When a non-ended game already
    /// exists its id is returned instead, which makes game creation
    /// idempotent for the host.
    pub async fn install_game(
        &self,
        subject: Uuid,
        game_id: Uuid,
        questions: Vec<Question>,
    ) -> Result<GameHandle, SessionError> {
        if subject != self.host_id {
            return Err(SessionError::NotHost);
        }

        {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();

            if inner.status == RoomStatus::Closed {
                return Err(SessionError::RoomClosed);
            }
            if let Some(game) = &inner.game {
                if game.status != GameStatus::Ended {
                    return Ok(GameHandle {
                        game_id: game.game_id,
                        created: false,
                    });
                }
            }

            inner.game = Some(GameSession::new(game_id, questions));
        }

        self.broadcast(ServerEvent::GameCreated { game_id });

        Ok(GameHandle {
            game_id,
            created: true,
        })
    }

    /// Transitions the waiting game to in progress. Requires every player to
    /// be ready; the host seat is exempt since the host drives the round.
    pub async fn start_game(&self, subject: Uuid) -> Result<StartedRound, SessionError> {
        if subject != self.host_id {
            return Err(SessionError::NotHost);
        }

        let (round, question_count) = {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();
            let inner = &mut *inner;

            if inner.status == RoomStatus::Closed {
                return Err(SessionError::RoomClosed);
            }

            let players: Vec<&Participant> = inner
                .participants
                .values()
                .filter(|p| p.role == Role::Player)
                .collect();
            if players.is_empty() {
                return Err(SessionError::NoPlayers);
            }
            if players
                .iter()
                .any(|p| p.status != ParticipantStatus::Ready)
            {
                return Err(SessionError::ParticipantsNotReady);
            }

            let Some(game) = inner.game.as_mut() else {
                return Err(SessionError::NoWaitingGame);
            };
            match game.status {
                GameStatus::Waiting => {}
                GameStatus::InProgress => return Err(SessionError::GameInProgress),
                GameStatus::Ended => return Err(SessionError::NoWaitingGame),
            }

            game.status = GameStatus::InProgress;
            game.current = 0;
            game.open = false;
            game.answers.clear();

            let round = StartedRound {
                game_id: game.game_id,
                questions: game.questions.clone(),
                abort: game.abort.clone(),
            };
            let question_count = round.questions.len();

            for participant in inner.participants.values_mut() {
                participant.score = 0;
            }

            (round, question_count)
        };

        self.broadcast(ServerEvent::GameStarted {
            game_id: round.game_id,
            question_count,
        });

        Ok(round)
    }

    /// Opens a question for answers. Returns `None` when the game is no
    /// longer in progress, which tells the round runner to stop.
    pub async fn open_question(&self, index: usize) -> Option<Question> {
        let mut inner = self.inner.write().await;
        inner.last_activity = Instant::now();

        let game = inner.game.as_mut()?;
        if game.status != GameStatus::InProgress {
            return None;
        }

        let question = game.questions.get(index)?.clone();
        game.current = index;
        game.open = true;
        game.question_opened_at = Instant::now();

        Some(question)
    }

    /// Closes the current question, applies the collected answer scores and
    /// returns the reveal payload.
    pub async fn close_question(&self, index: usize) -> Option<ClosedQuestion> {
        let mut inner = self.inner.write().await;
        inner.last_activity = Instant::now();
        let inner = &mut *inner;

        let game = inner.game.as_mut()?;
        if game.status != GameStatus::InProgress || game.current != index || !game.open {
            return None;
        }

        game.open = false;
        let question_id = game.questions[index].id;
        let correct_answer = game.questions[index].correct_answer.clone();

        if let Some(records) = game.answers.remove(&question_id) {
            let correct = records.values().filter(|r| r.correct).count();
            tracing::debug!(
                question_id = %question_id,
                answers = records.len(),
                correct = correct,
                "Question closed"
            );

            for (user_id, record) in records {
                if let Some(participant) = inner.participants.get_mut(&user_id) {
                    participant.score += record.score;
                }
            }
        }

        Some(ClosedQuestion {
            question_id,
            correct_answer,
            leaderboard: leaderboard_of(&inner.participants),
        })
    }

    /// Records a player's answer for the currently open question. The first
    /// answer per player wins. A correct answer earns a base score plus a
    /// bonus that shrinks as the question timer runs down.
    pub async fn record_answer(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        answer: &str,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.write().await;
        inner.last_activity = Instant::now();

        match inner.participants.get(&user_id) {
            None => return Err(SessionError::NotParticipant),
            // The host seat drives the round and holds no score.
            Some(p) if p.role == Role::Host => return Err(SessionError::HostCannotAnswer),
            Some(_) => {}
        }
        let Some(game) = inner.game.as_mut() else {
            return Err(SessionError::NoActiveGame);
        };
        if game.status != GameStatus::InProgress {
            return Err(SessionError::NoActiveGame);
        }
        if !game.open {
            return Err(SessionError::QuestionNotOpen);
        }

        let current = &game.questions[game.current];
        if current.id != question_id {
            return Err(SessionError::QuestionNotOpen);
        }
        let correct = current
            .correct_answer
            .trim()
            .eq_ignore_ascii_case(answer.trim());
        let timer = current.timer as f64;

        let records = game.answers.entry(question_id).or_default();
        if records.contains_key(&user_id) {
            return Err(SessionError::AlreadyAnswered);
        }

        let elapsed = game.question_opened_at.elapsed().as_secs_f64();
        let bonus = if correct && timer > 0.0 && elapsed < timer {
            (((timer - elapsed) / timer) * 100.0).round() as i64
        } else {
            0
        };
        let score = if correct { 100 + bonus } else { 0 };

        records.insert(user_id, AnswerRecord { correct, score });

        Ok(())
    }

    /// Ends the running game, resets readiness and interrupts a live round
    /// runner. A game that never started cannot be ended.
    pub async fn end_game(&self, by: EndedBy) -> Result<RoundSummary, SessionError> {
        if let EndedBy::Host(subject) = by {
            if subject != self.host_id {
                return Err(SessionError::NotHost);
            }
        }

        let summary = {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();
            let inner = &mut *inner;

            let Some(game) = inner.game.as_mut() else {
                return Err(SessionError::NoActiveGame);
            };
            if game.status != GameStatus::InProgress {
                return Err(SessionError::NoActiveGame);
            }

            game.status = GameStatus::Ended;
            game.open = false;
            game.abort.notify_one();
            let game_id = game.game_id;

            for participant in inner.participants.values_mut() {
                participant.status = ParticipantStatus::Joined;
            }

            RoundSummary {
                game_id,
                leaderboard: leaderboard_of(&inner.participants),
            }
        };

        self.broadcast(ServerEvent::GameEnded {
            game_id: summary.game_id,
            leaderboard: summary.leaderboard.clone(),
        });

        Ok(summary)
    }

    /// Removes a participant. A leaving host closes the room for everyone;
    /// a round that was still running is ended and its summary handed back
    /// so the caller can persist the results.
    pub async fn leave(&self, user_id: Uuid) -> Result<LeaveOutcome, SessionError> {
        let (participant, closed, empty, ended_game) = {
            let mut inner = self.inner.write().await;
            inner.last_activity = Instant::now();
            let inner = &mut *inner;

            let Some(participant) = inner.participants.remove(&user_id) else {
                return Err(SessionError::NotParticipant);
            };

            let closed = user_id == self.host_id;
            let mut ended_game = None;
            if closed {
                inner.status = RoomStatus::Closed;
                if let Some(game) = inner.game.as_mut() {
                    if game.status == GameStatus::InProgress {
                        game.status = GameStatus::Ended;
                        ended_game = Some(RoundSummary {
                            game_id: game.game_id,
                            leaderboard: leaderboard_of(&inner.participants),
                        });
                    }
                    game.abort.notify_one();
                }
            }

            (
                participant,
                closed,
                inner.participants.is_empty(),
                ended_game,
            )
        };

        self.connections.remove(&user_id);

        if closed {
            self.broadcast(ServerEvent::RoomClosed);
        } else {
            self.broadcast(ServerEvent::PlayerLeft {
                user_id,
                username: participant.username,
            });
        }

        Ok(LeaveOutcome {
            closed,
            empty,
            ended_game,
        })
    }

    pub async fn current_game(&self) -> Option<(Uuid, GameStatus)> {
        let inner = self.inner.read().await;
        inner.game.as_ref().map(|game| (game.game_id, game.status))
    }

    pub async fn participants(&self) -> Vec<Participant> {
        let inner = self.inner.read().await;
        let mut participants: Vec<Participant> = inner.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.username.cmp(&b.username));
        participants
    }

    pub async fn should_remove(&self) -> bool {
        let inner = self.inner.read().await;
        inner.status == RoomStatus::Closed || inner.participants.is_empty()
    }

    pub async fn idle_for(&self) -> std::time::Duration {
        let inner = self.inner.read().await;
        inner.last_activity.elapsed()
    }

    async fn touch(&self) {
        let mut inner = self.inner.write().await;
        inner.last_activity = Instant::now();
    }
}

fn leaderboard_of(participants: &HashMap<Uuid, Participant>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = participants
        .values()
        .map(|p| LeaderboardEntry {
            user_id: p.user_id,
            username: p.username.clone(),
            score: p.score,
        })
        .collect();

    entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.username.cmp(&b.username)));
    entries
}
