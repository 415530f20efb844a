use crate::error::CoreError;
use crate::relay::SignalEnvelope;
use crate::room::{JoinOutcome, Reply, RoomCommand, RoomSnapshot};
use huddle_core::{ConnectionId, FlagsPatch, ParticipantInfo, Payload, RequestId, RoomId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Counters a room actor publishes for lock-free reads by the registry.
#[derive(Debug, Default)]
pub struct RoomStats {
    participants: AtomicUsize,
}

impl RoomStats {
    pub fn set_participants(&self, count: usize) {
        self.participants.store(count, Ordering::Relaxed);
    }

    pub fn participants(&self) -> usize {
        self.participants.load(Ordering::Relaxed)
    }
}

/// Cloneable address of a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    id: RoomId,
    tx: mpsc::Sender<RoomCommand>,
    stats: Arc<RoomStats>,
}

impl RoomHandle {
    pub(crate) fn new(id: RoomId, tx: mpsc::Sender<RoomCommand>, stats: Arc<RoomStats>) -> Self {
        Self { id, tx, stats }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn participant_count(&self) -> usize {
        self.stats.participants()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub(crate) fn same_room(&self, other: &RoomHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Sends one command and waits for its reply. A room that stopped
    /// between lookup and delivery reads as not found.
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CoreError::RoomNotFound(self.id.clone()))?;
        rx.await
            .map_err(|_| CoreError::RoomNotFound(self.id.clone()))?
    }

    pub async fn join(
        &self,
        conn: ConnectionId,
        info: ParticipantInfo,
    ) -> Result<JoinOutcome, CoreError> {
        self.request(|reply| RoomCommand::Join { conn, info, reply })
            .await
    }

    pub async fn approve(
        &self,
        by: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        self.request(|reply| RoomCommand::Approve {
            by,
            request_id,
            reply,
        })
        .await
    }

    pub async fn reject(
        &self,
        by: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        self.request(|reply| RoomCommand::Reject {
            by,
            request_id,
            reply,
        })
        .await
    }

    pub async fn leave(&self, conn: ConnectionId) -> Result<bool, CoreError> {
        self.request(|reply| RoomCommand::Leave { conn, reply }).await
    }

    pub async fn end(&self, by: ConnectionId) -> Result<Vec<ConnectionId>, CoreError> {
        self.request(|reply| RoomCommand::End { by, reply }).await
    }

    pub async fn signal(&self, envelope: SignalEnvelope) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::Signal { envelope, reply })
            .await
    }

    pub async fn update_flags(
        &self,
        conn: ConnectionId,
        patch: FlagsPatch,
    ) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::UpdateFlags { conn, patch, reply })
            .await
    }

    pub async fn app_event(&self, from: ConnectionId, payload: Payload) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::AppEvent {
            from,
            payload,
            reply,
        })
        .await
    }

    pub async fn chat(&self, from: ConnectionId, text: String) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::Chat { from, text, reply })
            .await
    }

    pub async fn lower_hand(
        &self,
        by: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::LowerHand { by, target, reply })
            .await
    }

    pub async fn set_chat_enabled(&self, by: ConnectionId, enabled: bool) -> Result<(), CoreError> {
        self.request(|reply| RoomCommand::SetChatEnabled { by, enabled, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, CoreError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn expire_if_idle(
        &self,
        idle: Duration,
    ) -> Result<Option<Vec<ConnectionId>>, CoreError> {
        self.request(|reply| RoomCommand::ExpireIfIdle { idle, reply })
            .await
    }

    pub async fn shutdown(&self) -> Result<Vec<ConnectionId>, CoreError> {
        self.request(|reply| RoomCommand::Shutdown { reply }).await
    }
}
