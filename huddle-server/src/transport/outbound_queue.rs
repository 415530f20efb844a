use huddle_core::ServerMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// The queue was full; the oldest droppable message was evicted.
    EvictedOldest,
    /// The queue was full of critical messages; the new droppable one was discarded.
    DiscardedIncoming,
    Closed,
}

struct QueueState {
    items: VecDeque<ServerMessage>,
    closed: bool,
    dropped: u64,
}

/// Single-consumer send queue of one connection.
///
/// Pushing never waits. At capacity, droppable room chatter is shed oldest
/// first; critical messages are always kept, so only this consumer's queue
/// grows when it falls behind.
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(64)),
                closed: false,
                dropped: 0,
            }),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, msg: ServerMessage) -> PushOutcome {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return PushOutcome::Closed;
            }

            if state.items.len() < self.capacity {
                state.items.push_back(msg);
                PushOutcome::Queued
            } else if let Some(pos) = state.items.iter().position(ServerMessage::is_droppable) {
                state.items.remove(pos);
                state.items.push_back(msg);
                state.dropped += 1;
                PushOutcome::EvictedOldest
            } else if msg.is_droppable() {
                state.dropped += 1;
                PushOutcome::DiscardedIncoming
            } else {
                state.items.push_back(msg);
                PushOutcome::Queued
            }
        };

        if outcome != PushOutcome::DiscardedIncoming {
            self.notify.notify_one();
        }
        outcome
    }

    /// Next message in FIFO order; `None` once closed and drained.
    pub async fn pop(&self) -> Option<ServerMessage> {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(msg) = state.items.pop_front() {
                    return Some(msg);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }
}
