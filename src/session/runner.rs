use std::{sync::Arc, time::Duration};

use serde_json::json;
use tracing::{error, info};

use crate::{
    games::{db, models::GameStatus},
    server::app_state::AppState,
    session::{
        events::ServerEvent,
        room::{EndedBy, RoomSession, RoundSummary, StartedRound},
    },
    system_log::models::LogAction,
};

/// Spawns the timed round loop for a started game. The task broadcasts each
/// question, waits out its timer and reveals the answer. An early host end
/// fires the round's abort notify and the loop exits.
pub fn spawn_round(state: Arc<AppState>, session: Arc<RoomSession>, round: StartedRound) {
    tokio::spawn(async move {
        run_round(state, session, round).await;
    });
}

async fn run_round(state: Arc<AppState>, session: Arc<RoomSession>, round: StartedRound) {
    let total = round.questions.len();
    info!(
        game_id = %round.game_id,
        room_code = %session.code,
        questions = total,
        "Round runner started"
    );

    for (index, question) in round.questions.iter().enumerate() {
        // open_question returns None once the game is no longer in progress.
        if session.open_question(index).await.is_none() {
            break;
        }

        session.broadcast(ServerEvent::Question {
            question: question.public(),
            index,
            total,
        });

        let timer = Duration::from_secs(question.timer.max(1) as u64);
        tokio::select! {
            _ = tokio::time::sleep(timer) => {}
            _ = round.abort.notified() => break,
        }

        let Some(closed) = session.close_question(index).await else {
            break;
        };
        session.broadcast(ServerEvent::QuestionClosed {
            question_id: closed.question_id,
            correct_answer: closed.correct_answer,
            leaderboard: closed.leaderboard,
        });
    }

    // When the host ended the game mid-round (request or leave), that path
    // already persisted the results; NoActiveGame is the expected error then.
    match session.end_game(EndedBy::Runner).await {
        Ok(summary) => {
            finalize_game(&state, &session, &summary).await;
            info!(game_id = %summary.game_id, "Round completed");
        }
        Err(_) => {
            info!(game_id = %round.game_id, "Round runner exited after early end");
        }
    }
}

/// Persists the final state and results of an ended game.
pub async fn finalize_game(state: &Arc<AppState>, session: &Arc<RoomSession>, summary: &RoundSummary) {
    if let Err(e) = db::set_game_status(state.get_pool(), &summary.game_id, GameStatus::Ended).await
    {
        error!("Failed to mark game {} as ended: {}", summary.game_id, e);
    }

    if let Err(e) =
        db::record_results(state.get_pool(), &summary.game_id, &summary.leaderboard).await
    {
        error!("Failed to persist results for game {}: {}", summary.game_id, e);
    }

    state
        .syslog()
        .system()
        .action(LogAction::Update)
        .function("finalize_game")
        .description(&format!(
            "Game {} in room {} ended with {} participants",
            summary.game_id,
            session.code,
            summary.leaderboard.len()
        ))
        .metadata(json!({ "leaderboard": summary.leaderboard }))
        .log_async();
}
