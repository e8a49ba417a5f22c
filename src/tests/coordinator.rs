#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::{
        games::models::{GameStatus, Question},
        session::{
            error::SessionError,
            events::ServerEvent,
            registry::SessionRegistry,
            room::{EndedBy, ParticipantStatus, Role, RoomSession},
        },
    };

    fn questions(game_id: Uuid, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: Uuid::new_v4(),
                game_id,
                subtopic: "general".into(),
                question: format!("Question {}", i),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: "A".into(),
                timer: 30,
            })
            .collect()
    }

    fn new_room(capacity: usize) -> (SessionRegistry, Arc<RoomSession>, Uuid) {
        let registry = SessionRegistry::new(6);
        let host_id = Uuid::new_v4();
        let session = registry
            .create_room(Uuid::new_v4(), host_id, "Host".into(), capacity)
            .unwrap();
        (registry, session, host_id)
    }

    async fn ready_player(session: &Arc<RoomSession>, name: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        session.join(user_id, name).await.unwrap();
        session.set_ready(user_id, true).await.unwrap();
        user_id
    }

    #[tokio::test]
    async fn lobby_flow_starts_game() {
        let (_registry, session, host_id) = new_room(8);
        let p1 = ready_player(&session, "alice").await;
        let _p2 = ready_player(&session, "bob").await;

        let game_id = Uuid::new_v4();
        let handle = session
            .install_game(host_id, game_id, questions(game_id, 3))
            .await
            .unwrap();
        assert!(handle.created);

        let round = session.start_game(host_id).await.unwrap();
        assert_eq!(round.game_id, game_id);
        assert_eq!(round.questions.len(), 3);

        let (current_id, status) = session.current_game().await.unwrap();
        assert_eq!(current_id, game_id);
        assert_eq!(status, GameStatus::InProgress);

        // Scores were zeroed for everyone, including the newly started round
        let participants = session.participants().await;
        assert!(participants.iter().all(|p| p.score == 0));
        assert!(participants.iter().any(|p| p.user_id == p1));
    }

    #[tokio::test]
    async fn start_requires_all_players_ready() {
        let (_registry, session, host_id) = new_room(8);
        let _ready = ready_player(&session, "alice").await;

        let straggler = Uuid::new_v4();
        session.join(straggler, "bob").await.unwrap();

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();

        let result = session.start_game(host_id).await;
        assert!(matches!(
            result.err().unwrap(),
            SessionError::ParticipantsNotReady
        ));
    }

    #[tokio::test]
    async fn start_requires_at_least_one_player() {
        let (_registry, session, host_id) = new_room(8);

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();

        let result = session.start_game(host_id).await;
        assert!(matches!(result.err().unwrap(), SessionError::NoPlayers));
    }

    #[tokio::test]
    async fn only_host_can_start_and_end() {
        let (_registry, session, host_id) = new_room(8);
        let player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();

        let start = session.start_game(player).await;
        assert!(matches!(start.err().unwrap(), SessionError::NotHost));

        session.start_game(host_id).await.unwrap();

        let end = session.end_game(EndedBy::Host(player)).await;
        assert!(matches!(end.err().unwrap(), SessionError::NotHost));
    }

    #[tokio::test]
    async fn join_rejected_when_full() {
        let (_registry, session, _host_id) = new_room(3);
        session.join(Uuid::new_v4(), "alice").await.unwrap();
        session.join(Uuid::new_v4(), "bob").await.unwrap();

        let result = session.join(Uuid::new_v4(), "carol").await;
        assert!(matches!(result.err().unwrap(), SessionError::RoomFull));
    }

    #[tokio::test]
    async fn join_rejected_on_taken_username() {
        let (_registry, session, _host_id) = new_room(8);
        session.join(Uuid::new_v4(), "alice").await.unwrap();

        let result = session.join(Uuid::new_v4(), "ALICE").await;
        assert!(matches!(
            result.err().unwrap(),
            SessionError::UsernameTaken(_)
        ));
    }

    #[tokio::test]
    async fn join_rejected_mid_game() {
        let (_registry, session, host_id) = new_room(8);
        let _player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();
        session.start_game(host_id).await.unwrap();

        let result = session.join(Uuid::new_v4(), "bob").await;
        assert!(matches!(
            result.err().unwrap(),
            SessionError::GameInProgress
        ));
    }

    #[tokio::test]
    async fn install_game_is_idempotent_while_live() {
        let (_registry, session, host_id) = new_room(8);

        let first = Uuid::new_v4();
        let handle = session
            .install_game(host_id, first, questions(first, 2))
            .await
            .unwrap();
        assert!(handle.created);

        let second = Uuid::new_v4();
        let handle = session
            .install_game(host_id, second, questions(second, 2))
            .await
            .unwrap();
        assert!(!handle.created);
        assert_eq!(handle.game_id, first);
    }

    #[tokio::test]
    async fn answer_scoring_first_answer_wins() {
        let (_registry, session, host_id) = new_room(8);
        let p1 = ready_player(&session, "alice").await;
        let p2 = ready_player(&session, "bob").await;

        let game_id = Uuid::new_v4();
        let qs = questions(game_id, 1);
        let question_id = qs[0].id;
        session.install_game(host_id, game_id, qs).await.unwrap();
        session.start_game(host_id).await.unwrap();

        let opened = session.open_question(0).await.unwrap();
        assert_eq!(opened.id, question_id);

        session.record_answer(p1, question_id, "a").await.unwrap();
        session.record_answer(p2, question_id, "B").await.unwrap();

        let repeat = session.record_answer(p1, question_id, "B").await;
        assert!(matches!(
            repeat.err().unwrap(),
            SessionError::AlreadyAnswered
        ));

        let closed = session.close_question(0).await.unwrap();
        assert_eq!(closed.question_id, question_id);
        assert_eq!(closed.correct_answer, "A");

        let alice = closed
            .leaderboard
            .iter()
            .find(|e| e.user_id == p1)
            .unwrap();
        let bob = closed.leaderboard.iter().find(|e| e.user_id == p2).unwrap();

        // Correct answer earns the base score plus a time bonus
        assert!(alice.score >= 100 && alice.score <= 200);
        assert_eq!(bob.score, 0);
        assert_eq!(closed.leaderboard[0].user_id, p1);
    }

    #[tokio::test]
    async fn answers_rejected_outside_open_question() {
        let (_registry, session, host_id) = new_room(8);
        let player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        let qs = questions(game_id, 2);
        let first_id = qs[0].id;
        let second_id = qs[1].id;
        session.install_game(host_id, game_id, qs).await.unwrap();
        session.start_game(host_id).await.unwrap();

        // Nothing opened yet
        let early = session.record_answer(player, first_id, "A").await;
        assert!(matches!(
            early.err().unwrap(),
            SessionError::QuestionNotOpen
        ));

        session.open_question(0).await.unwrap();

        // Answer for a question that is not the current one
        let wrong = session.record_answer(player, second_id, "A").await;
        assert!(matches!(
            wrong.err().unwrap(),
            SessionError::QuestionNotOpen
        ));
    }

    #[tokio::test]
    async fn end_game_resets_lobby() {
        let (_registry, session, host_id) = new_room(8);
        let _player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();
        session.start_game(host_id).await.unwrap();

        let summary = session.end_game(EndedBy::Host(host_id)).await.unwrap();
        assert_eq!(summary.game_id, game_id);

        let (_, status) = session.current_game().await.unwrap();
        assert_eq!(status, GameStatus::Ended);

        // Everyone has to flag ready again before the next round
        let participants = session.participants().await;
        assert!(
            participants
                .iter()
                .all(|p| p.status == ParticipantStatus::Joined)
        );

        let again = session.end_game(EndedBy::Host(host_id)).await;
        assert!(matches!(again.err().unwrap(), SessionError::NoActiveGame));
    }

    #[tokio::test]
    async fn host_answers_are_rejected() {
        let (_registry, session, host_id) = new_room(8);
        let _player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        let qs = questions(game_id, 1);
        let question_id = qs[0].id;
        session.install_game(host_id, game_id, qs).await.unwrap();
        session.start_game(host_id).await.unwrap();
        session.open_question(0).await.unwrap();

        let result = session.record_answer(host_id, question_id, "A").await;
        assert!(matches!(
            result.err().unwrap(),
            SessionError::HostCannotAnswer
        ));
    }

    #[tokio::test]
    async fn ending_a_waiting_game_is_rejected() {
        let (_registry, session, host_id) = new_room(8);
        let _player = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        session
            .install_game(host_id, game_id, questions(game_id, 2))
            .await
            .unwrap();

        // Never started, so there is nothing to end
        let result = session.end_game(EndedBy::Host(host_id)).await;
        assert!(matches!(result.err().unwrap(), SessionError::NoActiveGame));

        let (_, status) = session.current_game().await.unwrap();
        assert_eq!(status, GameStatus::Waiting);
    }

    #[tokio::test]
    async fn host_leave_mid_round_yields_final_summary() {
        let (_registry, session, host_id) = new_room(8);
        let p1 = ready_player(&session, "alice").await;

        let game_id = Uuid::new_v4();
        let qs = questions(game_id, 1);
        let question_id = qs[0].id;
        session.install_game(host_id, game_id, qs).await.unwrap();
        session.start_game(host_id).await.unwrap();
        session.open_question(0).await.unwrap();
        session.record_answer(p1, question_id, "A").await.unwrap();
        session.close_question(0).await.unwrap();

        let outcome = session.leave(host_id).await.unwrap();
        assert!(outcome.closed);

        // The departure ended the round, so the caller gets the summary to
        // persist
        let summary = outcome.ended_game.unwrap();
        assert_eq!(summary.game_id, game_id);
        assert_eq!(summary.leaderboard[0].user_id, p1);
        assert!(summary.leaderboard[0].score >= 100);

        // The interrupted runner backs off instead of ending twice
        let runner_end = session.end_game(EndedBy::Runner).await;
        assert!(matches!(
            runner_end.err().unwrap(),
            SessionError::NoActiveGame
        ));
    }

    #[tokio::test]
    async fn host_leave_without_round_yields_no_summary() {
        let (_registry, session, host_id) = new_room(8);
        session.join(Uuid::new_v4(), "alice").await.unwrap();

        let outcome = session.leave(host_id).await.unwrap();
        assert!(outcome.closed);
        assert!(outcome.ended_game.is_none());
    }

    #[tokio::test]
    async fn host_leave_closes_room() {
        let (_registry, session, host_id) = new_room(8);
        session.join(Uuid::new_v4(), "alice").await.unwrap();

        let outcome = session.leave(host_id).await.unwrap();
        assert!(outcome.closed);

        let rejoin = session.join(Uuid::new_v4(), "bob").await;
        assert!(matches!(rejoin.err().unwrap(), SessionError::RoomClosed));
        assert!(session.should_remove().await);
    }

    #[tokio::test]
    async fn events_fan_out_to_connected_players() {
        let (_registry, session, host_id) = new_room(8);

        let (host_tx, mut host_rx) = mpsc::unbounded_channel();
        session.register_connection(host_id, host_tx).await.unwrap();

        match host_rx.try_recv().unwrap() {
            ServerEvent::Connected {
                user_id,
                participants,
                ..
            } => {
                assert_eq!(user_id, host_id);
                assert_eq!(participants.len(), 1);
                assert_eq!(participants[0].role, Role::Host);
            }
            other => panic!("Expected Connected, got {:?}", other),
        }

        let player = Uuid::new_v4();
        session.join(player, "alice").await.unwrap();

        match host_rx.try_recv().unwrap() {
            ServerEvent::PlayerJoined { user_id, username } => {
                assert_eq!(user_id, player);
                assert_eq!(username, "alice");
            }
            other => panic!("Expected PlayerJoined, got {:?}", other),
        }

        session.set_ready(player, true).await.unwrap();
        match host_rx.try_recv().unwrap() {
            ServerEvent::PlayerReady { user_id, ready } => {
                assert_eq!(user_id, player);
                assert!(ready);
            }
            other => panic!("Expected PlayerReady, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn concurrent_joins_respect_capacity() {
        // Host takes one seat, leaving four for players
        let (_registry, session, _host_id) = new_room(5);

        let mut handles = Vec::new();
        for i in 0..10 {
            let session = Arc::clone(&session);
            handles.push(tokio::spawn(async move {
                session
                    .join(Uuid::new_v4(), &format!("player-{}", i))
                    .await
            }));
        }

        let results = futures::future::join_all(handles).await;
        let successes = results
            .into_iter()
            .filter(|r| r.as_ref().unwrap().is_ok())
            .count();

        assert_eq!(successes, 4);
        assert_eq!(session.participants().await.len(), 5);
    }

    #[tokio::test]
    async fn registry_resolves_and_removes_rooms() {
        let registry = SessionRegistry::new(6);
        let host_id = Uuid::new_v4();
        let session = registry
            .create_room(Uuid::new_v4(), host_id, "Host".into(), 8)
            .unwrap();

        let found = registry.get(&session.code).unwrap();
        assert_eq!(found.room_id, session.room_id);

        // Codes are matched case-insensitively
        let lower = registry.get(&session.code.to_lowercase()).unwrap();
        assert_eq!(lower.room_id, session.room_id);

        let missing = registry.get("NOPE42");
        assert!(matches!(
            missing.err().unwrap(),
            SessionError::RoomNotFound(_)
        ));

        registry.remove(&session.code);
        assert!(registry.get(&session.code).is_err());
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn sweep_returns_dropped_rooms() {
        let registry = SessionRegistry::new(6);
        let host_id = Uuid::new_v4();
        let session = registry
            .create_room(Uuid::new_v4(), host_id, "Host".into(), 8)
            .unwrap();
        let live = registry
            .create_room(Uuid::new_v4(), Uuid::new_v4(), "Other".into(), 8)
            .unwrap();

        session.leave(host_id).await.unwrap();
        let removed = registry
            .sweep_idle(std::time::Duration::from_secs(3600))
            .await;

        // The sweep hands back the dropped sessions so their room rows get
        // closed
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].room_id, session.room_id);
        assert_eq!(registry.room_count(), 1);
        assert!(registry.get(&live.code).is_ok());
    }

    #[tokio::test]
    async fn connect_sees_every_concurrent_join() {
        let (_registry, session, host_id) = new_room(32);

        let mut joins = Vec::new();
        for i in 0..10 {
            let session = Arc::clone(&session);
            joins.push(tokio::spawn(async move {
                session
                    .join(Uuid::new_v4(), &format!("player-{}", i))
                    .await
            }));
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let connect = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.register_connection(host_id, tx).await })
        };

        futures::future::join_all(joins).await;
        connect.await.unwrap().unwrap();

        // Every joined player shows up in the snapshot or as a PlayerJoined
        // event; none slip through the registration window
        let mut seen = std::collections::HashSet::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ServerEvent::Connected { participants, .. } => {
                    seen.extend(participants.iter().map(|p| p.user_id));
                }
                ServerEvent::PlayerJoined { user_id, .. } => {
                    seen.insert(user_id);
                }
                _ => {}
            }
        }

        let participants = session.participants().await;
        assert_eq!(participants.len(), 11);
        assert!(participants.iter().all(|p| seen.contains(&p.user_id)));
    }
}
