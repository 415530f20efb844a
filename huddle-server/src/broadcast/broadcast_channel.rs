use crate::broadcast::RoomEvent;
use crate::presence::PresenceTracker;
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, ServerMessage};
use std::sync::Arc;
use tracing::debug;

/// Fan-out of room events to the current active participants.
#[derive(Clone)]
pub struct BroadcastChannel {
    output: Arc<dyn SignalingOutput>,
}

impl BroadcastChannel {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    /// Returns the number of connections the event was queued for.
    pub async fn publish(&self, presence: &PresenceTracker, event: RoomEvent) -> usize {
        let skipped = event.origin().filter(|_| event.skips_origin());
        let targets: Vec<ConnectionId> = presence
            .ids()
            .into_iter()
            .filter(|conn| Some(*conn) != skipped)
            .collect();

        debug!("Broadcasting {:?} to {} participants", event, targets.len());
        let msg = event.into_message();
        self.output.send_many(&targets, msg).await;
        targets.len()
    }

    pub async fn send_to(&self, conn: ConnectionId, msg: ServerMessage) {
        self.output.send(conn, msg).await;
    }

    pub async fn send_to_many(&self, conns: &[ConnectionId], msg: ServerMessage) {
        self.output.send_many(conns, msg).await;
    }
}
