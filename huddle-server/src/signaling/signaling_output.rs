use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};

/// Outbound side of the transport. Rooms push frames through it without
/// knowing how connections are carried.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue a frame for one connection. Must not wait on the consumer.
    async fn send(&self, to: ConnectionId, msg: ServerMessage);

    async fn send_many(&self, to: &[ConnectionId], msg: ServerMessage) {
        for conn in to {
            self.send(*conn, msg.clone()).await;
        }
    }
}
