use std::time::Duration;

/// Per-connection delivery and liveness settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Soft bound of each connection's outbound queue.
    pub queue_capacity: usize,
    pub heartbeat_interval: Duration,
    /// Silent intervals tolerated before the connection is declared dead.
    pub missed_heartbeats: u32,
}

impl TransportConfig {
    pub fn liveness_timeout(&self) -> Duration {
        self.heartbeat_interval * self.missed_heartbeats.max(1)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            heartbeat_interval: Duration::from_secs(15),
            missed_heartbeats: 2,
        }
    }
}
