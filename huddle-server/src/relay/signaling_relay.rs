use crate::error::CoreError;
use crate::presence::PresenceTracker;
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, Payload, ServerMessage, SignalKind};
use std::sync::Arc;
use tracing::debug;

/// One negotiation message in flight. Never stored.
#[derive(Debug, Clone)]
pub struct SignalEnvelope {
    pub kind: SignalKind,
    pub from: ConnectionId,
    pub to: ConnectionId,
    pub payload: Payload,
}

/// Routes negotiation payloads between two active participants of a room.
///
/// Per-pair ordering holds because a room handles one command at a time and
/// each connection drains a single FIFO queue.
#[derive(Clone)]
pub struct SignalingRelay {
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    pub async fn relay(
        &self,
        presence: &PresenceTracker,
        envelope: SignalEnvelope,
    ) -> Result<(), CoreError> {
        if !presence.contains(&envelope.from) {
            return Err(CoreError::InvalidTarget(envelope.from));
        }
        if envelope.to == envelope.from || !presence.contains(&envelope.to) {
            return Err(CoreError::InvalidTarget(envelope.to));
        }

        debug!(
            "Relaying {:?} {} -> {}",
            envelope.kind, envelope.from, envelope.to
        );
        self.output
            .send(
                envelope.to,
                ServerMessage::Signal {
                    kind: envelope.kind,
                    from_connection_id: envelope.from,
                    payload: envelope.payload,
                },
            )
            .await;
        Ok(())
    }
}
