use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};
use huddle_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures every outgoing frame in delivery order.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel mirroring each captured frame.
    tx: mpsc::UnboundedSender<(ConnectionId, ServerMessage)>,
    /// All captured frames (for verification).
    sent: Arc<Mutex<Vec<(ConnectionId, ServerMessage)>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(ConnectionId, ServerMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// Create a MockSignalingOutput without a receiver (frames are only stored).
    pub fn new_stored_only() -> Self {
        Self::new().0
    }

    /// Frames delivered to `conn`, oldest first.
    pub async fn messages_for(&self, conn: &ConnectionId) -> Vec<ServerMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == conn)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn count_for(
        &self,
        conn: &ConnectionId,
        pred: impl Fn(&ServerMessage) -> bool,
    ) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, msg)| to == conn && pred(msg))
            .count()
    }

    /// Total frames matching `pred`, whoever they went to.
    pub async fn count_all(&self, pred: impl Fn(&ServerMessage) -> bool) -> usize {
        self.sent.lock().await.iter().filter(|(_, msg)| pred(msg)).count()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockSignalingOutput {
    fn default() -> Self {
        Self::new_stored_only()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, to: ConnectionId, msg: ServerMessage) {
        tracing::debug!("[MockSignaling] send to {}: {:?}", to, msg);

        self.sent.lock().await.push((to, msg.clone()));
        let _ = self.tx.send((to, msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_signaling_captures_frames() {
        let (signaling, mut rx) = MockSignalingOutput::new();
        let conn = ConnectionId::new();

        signaling.send(conn, ServerMessage::JoinRejected).await;

        let (to, msg) = rx.recv().await.unwrap();
        assert_eq!(to, conn);
        assert_eq!(msg, ServerMessage::JoinRejected);
        assert_eq!(signaling.messages_for(&conn).await, vec![ServerMessage::JoinRejected]);
    }

    #[tokio::test]
    async fn test_mock_signaling_filters_by_connection() {
        let signaling = MockSignalingOutput::new_stored_only();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        signaling.send_many(&[a, b], ServerMessage::RoomEnded).await;
        signaling.send(a, ServerMessage::JoinRejected).await;

        assert_eq!(signaling.messages_for(&a).await.len(), 2);
        assert_eq!(signaling.messages_for(&b).await, vec![ServerMessage::RoomEnded]);
    }
}
