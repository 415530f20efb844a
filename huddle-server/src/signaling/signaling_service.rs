use crate::signaling::SignalingOutput;
use crate::transport::{OutboundQueue, PushOutcome, TransportConfig};
use async_trait::async_trait;
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerMessage};
use std::sync::Arc;
use tracing::{debug, warn};

struct SignalingInner {
    peers: DashMap<ConnectionId, Arc<OutboundQueue>>,
    transport: TransportConfig,
}

/// Table of live connections and their outbound queues.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(transport: TransportConfig) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                transport,
            }),
        }
    }

    pub fn transport_config(&self) -> &TransportConfig {
        &self.inner.transport
    }

    pub fn add_peer(&self, conn: ConnectionId) -> Arc<OutboundQueue> {
        let queue = Arc::new(OutboundQueue::new(self.inner.transport.queue_capacity));
        if let Some(previous) = self.inner.peers.insert(conn, queue.clone()) {
            previous.close();
        }
        queue
    }

    pub fn remove_peer(&self, conn: &ConnectionId) {
        if let Some((_, queue)) = self.inner.peers.remove(conn) {
            queue.close();
        }
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send_signal(&self, conn: ConnectionId, msg: ServerMessage) {
        let Some(queue) = self.inner.peers.get(&conn).map(|q| q.value().clone()) else {
            debug!("Dropping frame for disconnected connection {}", conn);
            return;
        };

        match queue.push(msg) {
            PushOutcome::Queued => {}
            PushOutcome::EvictedOldest | PushOutcome::DiscardedIncoming => {
                warn!(
                    "Slow consumer {}: shed room event ({} dropped so far)",
                    conn,
                    queue.dropped()
                );
            }
            PushOutcome::Closed => debug!("Queue of {} already closed", conn),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, to: ConnectionId, msg: ServerMessage) {
        self.send_signal(to, msg);
    }
}
