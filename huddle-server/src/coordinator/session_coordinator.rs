use crate::error::CoreError;
use crate::presence::Participant;
use crate::registry::{RegistryStats, RoomHandle, RoomRegistry};
use crate::relay::SignalEnvelope;
use crate::room::{JoinOutcome, RoomSnapshot};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::{
    ClientMessage, ConnectionId, FlagsPatch, JoinPolicy, ParticipantInfo, Payload, RequestId,
    RoomId, RoomKind, ServerMessage, SignalKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const DEFAULT_HOST_NAME: &str = "Host";

/// Drives the per-connection protocol on top of the registry.
///
/// Keeps the single binding from each connection to the room it is in or
/// waiting on. Everything about the room itself lives in the room actor.
#[derive(Clone)]
pub struct SessionCoordinator {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
    sessions: Arc<DashMap<ConnectionId, RoomId>>,
}

impl SessionCoordinator {
    pub fn new(registry: RoomRegistry, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry,
            output,
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Handles one inbound frame. Failures are reported to `conn` only.
    pub async fn dispatch(&self, conn: ConnectionId, msg: ClientMessage) {
        let result = match msg {
            ClientMessage::CreateRoom {
                kind,
                room_id,
                policy,
                participant,
            } => self
                .create_room(conn, kind, room_id, policy, participant)
                .await
                .map(drop),
            ClientMessage::JoinRoom {
                room_id,
                participant,
            } => self.request_join(conn, room_id, participant).await.map(drop),
            ClientMessage::ApproveJoin { request_id } => {
                self.approve_join(conn, request_id).await.map(drop)
            }
            ClientMessage::RejectJoin { request_id } => {
                self.reject_join(conn, request_id).await.map(drop)
            }
            ClientMessage::LeaveRoom => self.leave(conn).await,
            ClientMessage::EndRoom => self.end_room(conn).await,
            ClientMessage::Signal {
                kind,
                target_connection_id,
                payload,
            } => self.relay(conn, kind, target_connection_id, payload).await,
            ClientMessage::UpdateFlags { partial } => self.update_flags(conn, partial).await,
            ClientMessage::AppEvent { room_id, payload } => {
                self.app_event(conn, &room_id, payload).await
            }
            ClientMessage::ChatMessage { text } => self.chat(conn, text).await,
            ClientMessage::LowerHand { connection_id } => {
                self.lower_hand(conn, connection_id).await
            }
            ClientMessage::SetChatEnabled { enabled } => {
                self.set_chat_enabled(conn, enabled).await
            }
        };

        if let Err(e) = result {
            warn!("Request from {} rejected: {}", conn, e);
            self.output.send(conn, ServerMessage::from(&e)).await;
        }
    }

    pub async fn create_room(
        &self,
        conn: ConnectionId,
        kind: RoomKind,
        room_id: Option<RoomId>,
        policy: Option<JoinPolicy>,
        participant: Option<ParticipantInfo>,
    ) -> Result<RoomId, CoreError> {
        if self.sessions.contains_key(&conn) {
            return Err(CoreError::InvalidState("connection is already in a room"));
        }

        let info = participant.unwrap_or_else(|| ParticipantInfo::host(DEFAULT_HOST_NAME));
        let handle = self
            .registry
            .create_room(kind, room_id, policy, Participant::new(conn, info))?;

        let id = handle.id().clone();
        self.sessions.insert(conn, id.clone());
        info!("{} created room {}", conn, id);
        Ok(id)
    }

    pub async fn request_join(
        &self,
        conn: ConnectionId,
        room_id: RoomId,
        participant: ParticipantInfo,
    ) -> Result<JoinOutcome, CoreError> {
        self.bind(conn, &room_id)?;

        let outcome = match self.registry.get_room(&room_id) {
            Ok(handle) => handle.join(conn, participant).await,
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            self.unbind(&conn, &room_id);
        }
        outcome
    }

    pub async fn approve_join(
        &self,
        conn: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        let handle = self.bound_room(&conn)?;
        handle.approve(conn, request_id).await
    }

    pub async fn reject_join(
        &self,
        conn: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        let handle = self.bound_room(&conn)?;
        let requester = handle.reject(conn, request_id).await?;
        self.unbind(&requester, handle.id());
        Ok(requester)
    }

    /// Leaves the current room or withdraws a pending request. Leaving
    /// without being in a room is a no-op.
    pub async fn leave(&self, conn: ConnectionId) -> Result<(), CoreError> {
        let Some((_, room_id)) = self.sessions.remove(&conn) else {
            debug!("{} left without being in a room", conn);
            return Ok(());
        };

        match self.registry.get_room(&room_id) {
            Ok(handle) => match handle.leave(conn).await {
                Ok(_) | Err(CoreError::RoomNotFound(_)) => Ok(()),
                Err(e) => Err(e),
            },
            Err(_) => Ok(()),
        }
    }

    pub async fn end_room(&self, conn: ConnectionId) -> Result<(), CoreError> {
        let handle = self.bound_room(&conn)?;
        let evicted = handle.end(conn).await?;

        self.registry.forget(&handle);
        for member in &evicted {
            self.unbind(member, handle.id());
        }
        info!("{} ended room {}", conn, handle.id());
        Ok(())
    }

    pub async fn relay(
        &self,
        conn: ConnectionId,
        kind: SignalKind,
        target: ConnectionId,
        payload: Payload,
    ) -> Result<(), CoreError> {
        let handle = self
            .bound_room(&conn)
            .map_err(|_| CoreError::InvalidTarget(conn))?;
        handle
            .signal(SignalEnvelope {
                kind,
                from: conn,
                to: target,
                payload,
            })
            .await
    }

    pub async fn update_flags(
        &self,
        conn: ConnectionId,
        patch: FlagsPatch,
    ) -> Result<(), CoreError> {
        self.bound_room(&conn)?.update_flags(conn, patch).await
    }

    pub async fn app_event(
        &self,
        conn: ConnectionId,
        room_id: &RoomId,
        payload: Payload,
    ) -> Result<(), CoreError> {
        let handle = self.bound_room(&conn)?;
        if handle.id() != room_id {
            return Err(CoreError::InvalidState(
                "app events can only target the connection's own room",
            ));
        }
        handle.app_event(conn, payload).await
    }

    pub async fn chat(&self, conn: ConnectionId, text: String) -> Result<(), CoreError> {
        self.bound_room(&conn)?.chat(conn, text).await
    }

    pub async fn lower_hand(
        &self,
        conn: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), CoreError> {
        self.bound_room(&conn)?.lower_hand(conn, target).await
    }

    pub async fn set_chat_enabled(
        &self,
        conn: ConnectionId,
        enabled: bool,
    ) -> Result<(), CoreError> {
        self.bound_room(&conn)?.set_chat_enabled(conn, enabled).await
    }

    /// Transport reports the connection gone.
    pub async fn disconnect(&self, conn: ConnectionId) {
        if let Err(e) = self.leave(conn).await {
            warn!("Cleanup of {} failed: {}", conn, e);
        }
    }

    pub async fn room(&self, room_id: &RoomId) -> Result<RoomSnapshot, CoreError> {
        self.registry.get_room(room_id)?.snapshot().await
    }

    pub fn session_room(&self, conn: &ConnectionId) -> Option<RoomId> {
        self.sessions.get(conn).map(|entry| entry.value().clone())
    }

    /// One idle-expiry pass; returns how many rooms were removed.
    pub async fn sweep_idle_rooms(&self, idle: Duration) -> usize {
        let expired = self.registry.sweep(idle).await;
        for room in &expired {
            for conn in &room.evicted {
                self.unbind(conn, &room.id);
            }
        }
        expired.len()
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    pub fn spawn_sweeper(&self, idle: Duration, every: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = coordinator.sweep_idle_rooms(idle).await;
                let stats = coordinator.stats();
                debug!(
                    "Sweep pass: removed={} rooms={} participants={}",
                    removed, stats.rooms, stats.participants
                );
            }
        })
    }

    fn bind(&self, conn: ConnectionId, room_id: &RoomId) -> Result<(), CoreError> {
        match self.sessions.entry(conn) {
            Entry::Occupied(_) => Err(CoreError::InvalidState(
                "connection is already in a room or awaiting approval",
            )),
            Entry::Vacant(slot) => {
                slot.insert(room_id.clone());
                Ok(())
            }
        }
    }

    fn unbind(&self, conn: &ConnectionId, room_id: &RoomId) {
        self.sessions.remove_if(conn, |_, bound| bound == room_id);
    }

    fn bound_room(&self, conn: &ConnectionId) -> Result<RoomHandle, CoreError> {
        let room_id = self
            .session_room(conn)
            .ok_or(CoreError::InvalidState("connection is not in a room"))?;

        self.registry.get_room(&room_id).inspect_err(|_| {
            self.unbind(conn, &room_id);
        })
    }
}
