use huddle_core::{ConnectionId, MediaFlags, ParticipantView, Payload, ServerMessage};

/// Room-scoped events fanned out to active participants.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    ChatMessage {
        from: ConnectionId,
        text: String,
    },
    /// `by` differs from `connection_id` when a host lowers someone's hand.
    HandRaiseChanged {
        connection_id: ConnectionId,
        hand_raised: bool,
        by: ConnectionId,
    },
    MediaFlagsChanged {
        connection_id: ConnectionId,
        media_flags: MediaFlags,
    },
    ScreenShareChanged {
        connection_id: ConnectionId,
        screen_sharing: bool,
    },
    ParticipantJoined(ParticipantView),
    ParticipantLeft(ConnectionId),
    ParticipantListChanged(Vec<ParticipantView>),
    HostChanged(Option<ConnectionId>),
    ChatEnabledChanged(bool),
    AppEvent {
        from: ConnectionId,
        payload: Payload,
    },
    RoomEnded,
}

impl RoomEvent {
    /// Connection that caused the event, if any.
    pub fn origin(&self) -> Option<ConnectionId> {
        match self {
            Self::ChatMessage { from, .. } | Self::AppEvent { from, .. } => Some(*from),
            Self::HandRaiseChanged { by, .. } => Some(*by),
            Self::MediaFlagsChanged { connection_id, .. }
            | Self::ScreenShareChanged { connection_id, .. } => Some(*connection_id),
            Self::ParticipantJoined(view) => Some(view.connection_id),
            Self::ParticipantLeft(conn) => Some(*conn),
            Self::ParticipantListChanged(_)
            | Self::HostChanged(_)
            | Self::ChatEnabledChanged(_)
            | Self::RoomEnded => None,
        }
    }

    /// Whether the originator is left out of the fan-out.
    ///
    /// Flag changes and app events are already applied locally by the sender.
    /// A hand lowered by the host is not the target's own change, so nobody
    /// is skipped. Newcomers get a full participant list instead of their own
    /// join notice. Chat is echoed so every client orders messages the same way.
    pub fn skips_origin(&self) -> bool {
        match self {
            Self::HandRaiseChanged {
                connection_id, by, ..
            } => connection_id == by,
            Self::MediaFlagsChanged { .. }
            | Self::ScreenShareChanged { .. }
            | Self::AppEvent { .. }
            | Self::ParticipantJoined(_)
            | Self::ParticipantLeft(_) => true,
            Self::ChatMessage { .. }
            | Self::ParticipantListChanged(_)
            | Self::HostChanged(_)
            | Self::ChatEnabledChanged(_)
            | Self::RoomEnded => false,
        }
    }

    pub fn into_message(self) -> ServerMessage {
        match self {
            Self::ChatMessage { from, text } => ServerMessage::ChatMessage {
                from_connection_id: from,
                text,
            },
            Self::HandRaiseChanged {
                connection_id,
                hand_raised,
                ..
            } => ServerMessage::HandRaiseChanged {
                connection_id,
                hand_raised,
            },
            Self::MediaFlagsChanged {
                connection_id,
                media_flags,
            } => ServerMessage::MediaFlagsChanged {
                connection_id,
                media_flags,
            },
            Self::ScreenShareChanged {
                connection_id,
                screen_sharing,
            } => ServerMessage::ScreenShareChanged {
                connection_id,
                screen_sharing,
            },
            Self::ParticipantJoined(participant) => {
                ServerMessage::ParticipantJoined { participant }
            }
            Self::ParticipantLeft(connection_id) => {
                ServerMessage::ParticipantLeft { connection_id }
            }
            Self::ParticipantListChanged(participants) => {
                ServerMessage::ParticipantList { participants }
            }
            Self::HostChanged(connection_id) => ServerMessage::HostChanged { connection_id },
            Self::ChatEnabledChanged(enabled) => ServerMessage::ChatEnabledChanged { enabled },
            Self::AppEvent { from, payload } => ServerMessage::AppEvent {
                from_connection_id: from,
                payload,
            },
            Self::RoomEnded => ServerMessage::RoomEnded,
        }
    }
}
