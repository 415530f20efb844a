mod connection;
mod error_code;
mod participant;
mod payload;
mod request;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use error_code::ErrorCode;
pub use participant::{FlagsPatch, MediaFlags, ParticipantInfo, ParticipantView, Role};
pub use payload::Payload;
pub use request::RequestId;
pub use room::{JoinPolicy, ParseRoomKindError, RoomId, RoomKind};
pub use signaling::{ClientMessage, ServerMessage, SignalKind};
