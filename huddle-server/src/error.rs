use huddle_core::{ConnectionId, ErrorCode, RoomId, ServerMessage};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Participant {0} not found in the room")]
    ParticipantNotFound(ConnectionId),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Only the room host can {0}")]
    NotAuthorized(&'static str),

    #[error("Room {0} already exists")]
    DuplicateRoom(RoomId),

    #[error("Connection {0} is not an active participant of this room")]
    InvalidTarget(ConnectionId),
}

impl CoreError {
    pub fn to_code(&self) -> ErrorCode {
        match self {
            CoreError::RoomNotFound(_) => ErrorCode::RoomNotFound,
            CoreError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            CoreError::InvalidState(_) => ErrorCode::InvalidState,
            CoreError::NotAuthorized(_) => ErrorCode::NotAuthorized,
            CoreError::DuplicateRoom(_) => ErrorCode::DuplicateRoom,
            CoreError::InvalidTarget(_) => ErrorCode::InvalidTarget,
        }
    }
}

impl From<&CoreError> for ServerMessage {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::RoomNotFound(_) => ServerMessage::RoomNotFound,
            other => ServerMessage::error(other.to_code(), other.to_string()),
        }
    }
}
