use serde::{Deserialize, Serialize};

/// Stable error identifiers surfaced to the client in `error` frames.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RoomNotFound,
    ParticipantNotFound,
    InvalidState,
    NotAuthorized,
    DuplicateRoom,
    InvalidTarget,
    Malformed,
}
