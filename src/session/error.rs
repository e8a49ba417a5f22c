#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Room with code {0} not found or has been closed.")]
    RoomNotFound(String),

    #[error("Room has been closed.")]
    RoomClosed,

    #[error("Room is full.")]
    RoomFull,

    #[error("Username {0} is already taken in this room.")]
    UsernameTaken(String),

    #[error("A game is already in progress.")]
    GameInProgress,

    #[error("Only the host can perform this action.")]
    NotHost,

    #[error("User is not a participant of this room.")]
    NotParticipant,

    #[error("All participants must be ready to start the game.")]
    ParticipantsNotReady,

    #[error("At least one player must join before the game can start.")]
    NoPlayers,

    #[error("There is no waiting game to start.")]
    NoWaitingGame,

    #[error("No game is currently running.")]
    NoActiveGame,

    #[error("The question is not open for answers.")]
    QuestionNotOpen,

    #[error("An answer was already submitted for this question.")]
    AlreadyAnswered,

    #[error("The host cannot submit answers.")]
    HostCannotAnswer,

    #[error("All room codes are in use.")]
    CodesExhausted,

    #[error("Room code vault lock was poisoned.")]
    Poisoned,
}
