use crate::error::CoreError;
use crate::relay::SignalEnvelope;
use huddle_core::{
    ConnectionId, FlagsPatch, JoinPolicy, ParticipantInfo, ParticipantView, Payload, RequestId,
    RoomId, RoomKind,
};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

pub type Reply<T> = oneshot::Sender<Result<T, CoreError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Active,
    Pending(RequestId),
}

/// Point-in-time view of a room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub kind: RoomKind,
    pub policy: JoinPolicy,
    pub host: Option<ConnectionId>,
    pub participants: Vec<ParticipantView>,
    pub pending_requests: usize,
    pub chat_enabled: bool,
    pub created_at: Instant,
}

/// Everything a room actor can be asked to do, handled strictly in arrival order.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        conn: ConnectionId,
        info: ParticipantInfo,
        reply: Reply<JoinOutcome>,
    },
    Approve {
        by: ConnectionId,
        request_id: RequestId,
        reply: Reply<ConnectionId>,
    },
    Reject {
        by: ConnectionId,
        request_id: RequestId,
        reply: Reply<ConnectionId>,
    },
    /// Replies whether the connection was in the room at all.
    Leave {
        conn: ConnectionId,
        reply: Reply<bool>,
    },
    /// Replies with every connection that was evicted.
    End {
        by: ConnectionId,
        reply: Reply<Vec<ConnectionId>>,
    },
    Signal {
        envelope: SignalEnvelope,
        reply: Reply<()>,
    },
    UpdateFlags {
        conn: ConnectionId,
        patch: FlagsPatch,
        reply: Reply<()>,
    },
    AppEvent {
        from: ConnectionId,
        payload: Payload,
        reply: Reply<()>,
    },
    Chat {
        from: ConnectionId,
        text: String,
        reply: Reply<()>,
    },
    LowerHand {
        by: ConnectionId,
        target: ConnectionId,
        reply: Reply<()>,
    },
    SetChatEnabled {
        by: ConnectionId,
        enabled: bool,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<RoomSnapshot>,
    },
    /// Closes the room if it has been empty for `idle`; replies with the
    /// pending requesters that were turned away, or `None` if still in use.
    ExpireIfIdle {
        idle: Duration,
        reply: Reply<Option<Vec<ConnectionId>>>,
    },
    /// Unconditional close; replies with every evicted connection.
    Shutdown {
        reply: Reply<Vec<ConnectionId>>,
    },
}
