#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        games::models::{CreateGameRequest, Difficulty, GameStatus, Question},
        rooms::models::{CreateRoomResponse, HostInfo},
        session::{
            events::{ClientEvent, ServerEvent},
            room::Role,
        },
    };

    #[test]
    fn client_events_parse_from_tagged_json() {
        let heartbeat: ClientEvent = serde_json::from_str(r#"{"type": "Heartbeat"}"#).unwrap();
        assert!(matches!(heartbeat, ClientEvent::Heartbeat));

        let question_id = Uuid::new_v4();
        let raw = json!({
            "type": "Answer",
            "payload": { "questionId": question_id, "answer": "B" }
        });
        let answer: ClientEvent = serde_json::from_value(raw).unwrap();
        match answer {
            ClientEvent::Answer {
                question_id: id,
                answer,
            } => {
                assert_eq!(id, question_id);
                assert_eq!(answer, "B");
            }
            other => panic!("Expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn question_event_hides_the_correct_answer() {
        let question = Question {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            subtopic: "history".into(),
            question: "Who painted the Mona Lisa?".into(),
            options: vec![
                "Da Vinci".into(),
                "Michelangelo".into(),
                "Raphael".into(),
                "Donatello".into(),
            ],
            correct_answer: "Da Vinci".into(),
            timer: 30,
        };

        let event = ServerEvent::Question {
            question: question.public(),
            index: 0,
            total: 5,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "Question");
        assert_eq!(value["payload"]["question"]["timer"], 30);
        assert!(value["payload"]["question"].get("correctAnswer").is_none());
        assert!(value["payload"]["question"].get("correct_answer").is_none());
        assert!(value["payload"]["question"].get("subtopic").is_none());
    }

    #[test]
    fn server_events_use_camel_case_payloads() {
        let event = ServerEvent::GameStarted {
            game_id: Uuid::new_v4(),
            question_count: 5,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "GameStarted");
        assert!(value["payload"].get("gameId").is_some());
        assert_eq!(value["payload"]["questionCount"], 5);
    }

    #[test]
    fn create_room_response_uses_camel_case() {
        let host_id = Uuid::new_v4();
        let response = CreateRoomResponse {
            room_id: Uuid::new_v4(),
            room_code: "ABC234".into(),
            qr_code: "https://quizio.app/join?code=ABC234".into(),
            host: HostInfo {
                user_id: host_id,
                user_name: "Host".into(),
                role: Role::Host,
            },
            ws: "ws://localhost:8080/ws/rooms/ABC234".into(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["roomCode"], "ABC234");
        assert!(value.get("qrCode").is_some());
        assert_eq!(value["host"]["userName"], "Host");
        assert_eq!(value["host"]["role"], "host");
    }

    #[test]
    fn create_game_request_fills_defaults() {
        let raw = json!({ "roomCode": "ABC234", "topic": "Space" });
        let request: CreateGameRequest = serde_json::from_value(raw).unwrap();

        assert_eq!(request.room_code, "ABC234");
        assert!(request.subtopics.is_empty());
        assert_eq!(request.n, 5);
        assert_eq!(request.difficulty, Difficulty::Easy);
    }

    #[test]
    fn status_enums_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_value(GameStatus::InProgress).unwrap(),
            json!("in_progress")
        );
        assert_eq!(GameStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            serde_json::to_value(Difficulty::Medium).unwrap(),
            json!("medium")
        );
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }
}
