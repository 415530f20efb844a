use crate::model::connection::ConnectionId;
use crate::model::error_code::ErrorCode;
use crate::model::participant::{FlagsPatch, MediaFlags, ParticipantInfo, ParticipantView};
use crate::model::payload::Payload;
use crate::model::request::RequestId;
use crate::model::room::{JoinPolicy, RoomId, RoomKind};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// Frames a client may send. `op` must precede `d` in the JSON object.
#[derive(Debug, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom {
        kind: RoomKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<JoinPolicy>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant: Option<ParticipantInfo>,
    },
    JoinRoom {
        room_id: RoomId,
        participant: ParticipantInfo,
    },
    ApproveJoin {
        request_id: RequestId,
    },
    RejectJoin {
        request_id: RequestId,
    },
    #[serde(deserialize_with = "empty_body")]
    LeaveRoom,
    #[serde(deserialize_with = "empty_body")]
    EndRoom,
    Signal {
        #[serde(rename = "type")]
        kind: SignalKind,
        target_connection_id: ConnectionId,
        payload: Payload,
    },
    UpdateFlags {
        partial: FlagsPatch,
    },
    AppEvent {
        room_id: RoomId,
        payload: Payload,
    },
    ChatMessage {
        text: String,
    },
    LowerHand {
        connection_id: ConnectionId,
    },
    SetChatEnabled {
        enabled: bool,
    },
}

/// Bodies of `leave-room` and `end-room`: `null` and `{}` are both accepted.
fn empty_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(), D::Error> {
    struct EmptyBody;

    impl<'de> Visitor<'de> for EmptyBody {
        type Value = ();

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("null or an empty object")
        }

        fn visit_unit<E: de::Error>(self) -> Result<(), E> {
            Ok(())
        }

        fn visit_none<E: de::Error>(self) -> Result<(), E> {
            Ok(())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(())
        }
    }

    deserializer.deserialize_any(EmptyBody)
}

/// Frames the server emits to one or more connections.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    RoomCreated {
        room_id: RoomId,
        kind: RoomKind,
        policy: JoinPolicy,
    },
    RoomNotFound,
    JoinPending {
        request_id: RequestId,
    },
    JoinRequest {
        request_id: RequestId,
        participant: ParticipantView,
    },
    JoinApproved {
        room_id: RoomId,
        #[serde(rename = "self")]
        me: ParticipantView,
        host_connection_id: Option<ConnectionId>,
        chat_enabled: bool,
    },
    JoinRejected,
    ParticipantJoined {
        participant: ParticipantView,
    },
    ParticipantLeft {
        connection_id: ConnectionId,
    },
    ParticipantList {
        participants: Vec<ParticipantView>,
    },
    HostChanged {
        connection_id: Option<ConnectionId>,
    },
    Signal {
        #[serde(rename = "type")]
        kind: SignalKind,
        from_connection_id: ConnectionId,
        payload: Payload,
    },
    ChatMessage {
        from_connection_id: ConnectionId,
        text: String,
    },
    HandRaiseChanged {
        connection_id: ConnectionId,
        hand_raised: bool,
    },
    MediaFlagsChanged {
        connection_id: ConnectionId,
        media_flags: MediaFlags,
    },
    ScreenShareChanged {
        connection_id: ConnectionId,
        screen_sharing: bool,
    },
    ChatEnabledChanged {
        enabled: bool,
    },
    AppEvent {
        from_connection_id: ConnectionId,
        payload: Payload,
    },
    RoomEnded,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMessage {
    /// Room chatter that a slow consumer may lose. Everything else is critical.
    pub fn is_droppable(&self) -> bool {
        matches!(
            self,
            Self::ChatMessage { .. }
                | Self::HandRaiseChanged { .. }
                | Self::MediaFlagsChanged { .. }
                | Self::ScreenShareChanged { .. }
                | Self::AppEvent { .. }
        )
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}
