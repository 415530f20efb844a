use crate::broadcast::{BroadcastChannel, RoomEvent};
use crate::error::CoreError;
use crate::presence::{HostChange, Participant, PresenceTracker};
use crate::registry::RoomStats;
use crate::relay::{SignalEnvelope, SignalingRelay};
use crate::room::room_command::{JoinOutcome, RoomCommand, RoomSnapshot};
use crate::room::room_policy::RoomPolicy;
use crate::signaling::SignalingOutput;
use huddle_core::{
    ConnectionId, FlagsPatch, JoinPolicy, ParticipantInfo, ParticipantView, Payload, RequestId,
    Role, RoomId, RoomKind, ServerMessage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Fixed attributes of a room, decided at creation.
#[derive(Debug, Clone)]
pub struct RoomSetup {
    pub id: RoomId,
    pub kind: RoomKind,
    pub policy: JoinPolicy,
    pub room_policy: RoomPolicy,
}

struct PendingRequest {
    request_id: RequestId,
    participant: Participant,
}

/// Actor owning all state of one room. Commands are handled one at a time,
/// so nothing inside needs locking.
pub struct Room {
    id: RoomId,
    kind: RoomKind,
    policy: JoinPolicy,
    created_at: Instant,
    empty_since: Option<Instant>,
    presence: PresenceTracker,
    pending: Vec<PendingRequest>,
    chat_enabled: bool,
    relay: SignalingRelay,
    broadcast: BroadcastChannel,
    command_rx: mpsc::Receiver<RoomCommand>,
    stats: Arc<RoomStats>,
    closed: bool,
}

impl Room {
    pub fn new(
        setup: RoomSetup,
        host: Participant,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
        stats: Arc<RoomStats>,
    ) -> Self {
        let presence = PresenceTracker::with_host(setup.room_policy, host);
        stats.set_participants(presence.len());

        Self {
            id: setup.id,
            kind: setup.kind,
            policy: setup.policy,
            created_at: Instant::now(),
            empty_since: None,
            presence,
            pending: Vec::new(),
            chat_enabled: true,
            relay: SignalingRelay::new(signaling.clone()),
            broadcast: BroadcastChannel::new(signaling),
            command_rx,
            stats,
            closed: false,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} event loop started", self.id);
        self.announce_creation().await;

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
            if self.closed {
                break;
            }
        }

        info!("Room {} event loop finished", self.id);
    }

    async fn announce_creation(&self) {
        let created = ServerMessage::RoomCreated {
            room_id: self.id.clone(),
            kind: self.kind,
            policy: self.policy,
        };
        self.broadcast.send_to_many(&self.presence.ids(), created).await;
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { conn, info, reply } => {
                let _ = reply.send(self.join(conn, info).await);
            }
            RoomCommand::Approve {
                by,
                request_id,
                reply,
            } => {
                let _ = reply.send(self.approve(by, request_id).await);
            }
            RoomCommand::Reject {
                by,
                request_id,
                reply,
            } => {
                let _ = reply.send(self.reject(by, request_id).await);
            }
            RoomCommand::Leave { conn, reply } => {
                let _ = reply.send(Ok(self.leave(conn).await));
            }
            RoomCommand::End { by, reply } => {
                let result = match self.require_host(&by, "end the room") {
                    Ok(()) => Ok(self.close_room().await),
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Signal { envelope, reply } => {
                let _ = reply.send(self.signal(envelope).await);
            }
            RoomCommand::UpdateFlags { conn, patch, reply } => {
                let _ = reply.send(self.update_flags(conn, patch).await);
            }
            RoomCommand::AppEvent {
                from,
                payload,
                reply,
            } => {
                let _ = reply.send(self.app_event(from, payload).await);
            }
            RoomCommand::Chat { from, text, reply } => {
                let _ = reply.send(self.chat(from, text).await);
            }
            RoomCommand::LowerHand { by, target, reply } => {
                let _ = reply.send(self.lower_hand(by, target).await);
            }
            RoomCommand::SetChatEnabled { by, enabled, reply } => {
                let _ = reply.send(self.set_chat_enabled(by, enabled).await);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(self.snapshot()));
            }
            RoomCommand::ExpireIfIdle { idle, reply } => {
                let _ = reply.send(Ok(self.expire_if_idle(idle).await));
            }
            RoomCommand::Shutdown { reply } => {
                let _ = reply.send(Ok(self.close_room().await));
            }
        }
    }

    async fn join(
        &mut self,
        conn: ConnectionId,
        info: ParticipantInfo,
    ) -> Result<JoinOutcome, CoreError> {
        if self.presence.contains(&conn) || self.pending_position(&conn).is_some() {
            return Err(CoreError::InvalidState(
                "connection has already joined or is awaiting approval",
            ));
        }

        let participant = Participant::new(conn, info);
        let claims_empty_seat = participant.is_host() && self.presence.host().is_none();

        if self.policy == JoinPolicy::Approval && !claims_empty_seat {
            let request_id = RequestId::new();
            info!(
                "Join request {} from {} waiting for approval in room {}",
                request_id, conn, self.id
            );

            let view = participant.view();
            self.pending.push(PendingRequest {
                request_id,
                participant,
            });
            self.broadcast
                .send_to(conn, ServerMessage::JoinPending { request_id })
                .await;
            self.broadcast
                .send_to_many(
                    &self.presence.hosts(),
                    ServerMessage::JoinRequest {
                        request_id,
                        participant: view,
                    },
                )
                .await;
            return Ok(JoinOutcome::Pending(request_id));
        }

        self.admit(participant).await?;
        Ok(JoinOutcome::Active)
    }

    /// Seats a participant and runs the newcomer fan-out: the newcomer gets
    /// the current state once, every peer already inside gets one join notice.
    async fn admit(&mut self, participant: Participant) -> Result<ParticipantView, CoreError> {
        let conn = participant.connection_id;
        let had_host = self.presence.host().is_some();

        let view = self.presence.add(participant)?;
        self.empty_since = None;
        self.stats.set_participants(self.presence.len());
        info!("{} joined room {} as {:?}", conn, self.id, view.role);

        self.broadcast
            .send_to(
                conn,
                ServerMessage::JoinApproved {
                    room_id: self.id.clone(),
                    me: view.clone(),
                    host_connection_id: self.presence.host(),
                    chat_enabled: self.chat_enabled,
                },
            )
            .await;
        self.broadcast
            .send_to(
                conn,
                ServerMessage::ParticipantList {
                    participants: self.presence.list(),
                },
            )
            .await;
        self.broadcast
            .publish(&self.presence, RoomEvent::ParticipantJoined(view.clone()))
            .await;

        if view.role == Role::Host {
            if !had_host {
                self.broadcast
                    .publish(&self.presence, RoomEvent::HostChanged(Some(conn)))
                    .await;
            }
            self.forward_pending_to(conn).await;
        }

        Ok(view)
    }

    async fn approve(
        &mut self,
        by: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        self.require_host(&by, "approve join requests")?;
        let request = self.take_pending(request_id)?;
        let conn = request.participant.connection_id;

        info!("Host {} approved {} into room {}", by, conn, self.id);
        self.admit(request.participant).await?;
        Ok(conn)
    }

    async fn reject(
        &mut self,
        by: ConnectionId,
        request_id: RequestId,
    ) -> Result<ConnectionId, CoreError> {
        self.require_host(&by, "reject join requests")?;
        let request = self.take_pending(request_id)?;
        let conn = request.participant.connection_id;

        info!("Host {} rejected {} from room {}", by, conn, self.id);
        self.broadcast.send_to(conn, ServerMessage::JoinRejected).await;
        Ok(conn)
    }

    async fn leave(&mut self, conn: ConnectionId) -> bool {
        if let Some(pos) = self.pending_position(&conn) {
            let request = self.pending.remove(pos);
            info!(
                "{} withdrew join request {} for room {}",
                conn, request.request_id, self.id
            );
            self.broadcast
                .send_to_many(
                    &self.presence.hosts(),
                    ServerMessage::ParticipantLeft {
                        connection_id: conn,
                    },
                )
                .await;
            return true;
        }

        let Some(removal) = self.presence.remove(&conn) else {
            debug!("{} is not in room {}, nothing to leave", conn, self.id);
            return false;
        };

        info!(
            "{} ({}) left room {}",
            removal.participant.display_name, conn, self.id
        );
        self.broadcast
            .publish(&self.presence, RoomEvent::ParticipantLeft(conn))
            .await;
        self.announce_host_change(removal.host_change).await;

        if self.presence.is_empty() {
            self.empty_since = Some(Instant::now());
        }
        self.stats.set_participants(self.presence.len());
        true
    }

    async fn announce_host_change(&self, change: HostChange) {
        match change {
            HostChange::Unchanged => {}
            HostChange::Promoted(new_host) => {
                info!("{} is now host of room {}", new_host, self.id);
                self.broadcast
                    .publish(&self.presence, RoomEvent::HostChanged(Some(new_host)))
                    .await;
                self.broadcast
                    .publish(
                        &self.presence,
                        RoomEvent::ParticipantListChanged(self.presence.list()),
                    )
                    .await;
                self.forward_pending_to(new_host).await;
            }
            HostChange::Vacated => {
                info!("Room {} is now without a host", self.id);
                self.broadcast
                    .publish(&self.presence, RoomEvent::HostChanged(None))
                    .await;
            }
        }
    }

    async fn forward_pending_to(&self, host: ConnectionId) {
        for request in &self.pending {
            self.broadcast
                .send_to(
                    host,
                    ServerMessage::JoinRequest {
                        request_id: request.request_id,
                        participant: request.participant.view(),
                    },
                )
                .await;
        }
    }

    /// Evicts everyone, active and pending, and marks the actor for shutdown.
    async fn close_room(&mut self) -> Vec<ConnectionId> {
        self.broadcast.publish(&self.presence, RoomEvent::RoomEnded).await;

        let pending: Vec<ConnectionId> = self
            .pending
            .drain(..)
            .map(|r| r.participant.connection_id)
            .collect();
        self.broadcast.send_to_many(&pending, ServerMessage::RoomEnded).await;

        let mut evicted: Vec<ConnectionId> = self
            .presence
            .drain()
            .into_iter()
            .map(|p| p.connection_id)
            .collect();
        evicted.extend(pending);

        self.closed = true;
        self.stats.set_participants(0);
        info!("Room {} ended, {} connections released", self.id, evicted.len());
        evicted
    }

    async fn signal(&mut self, envelope: SignalEnvelope) -> Result<(), CoreError> {
        let sender = envelope.from;
        self.relay
            .relay(&self.presence, envelope)
            .await
            .inspect_err(|e| warn!("Relay from {} rejected: {}", sender, e))
    }

    async fn update_flags(
        &mut self,
        conn: ConnectionId,
        patch: FlagsPatch,
    ) -> Result<(), CoreError> {
        let changes = self.presence.update_flags(&conn, patch)?;

        if let Some(media_flags) = changes.media_flags {
            self.broadcast
                .publish(
                    &self.presence,
                    RoomEvent::MediaFlagsChanged {
                        connection_id: conn,
                        media_flags,
                    },
                )
                .await;
        }
        if let Some(screen_sharing) = changes.screen_sharing {
            self.broadcast
                .publish(
                    &self.presence,
                    RoomEvent::ScreenShareChanged {
                        connection_id: conn,
                        screen_sharing,
                    },
                )
                .await;
        }
        if let Some(hand_raised) = changes.hand_raised {
            self.broadcast
                .publish(
                    &self.presence,
                    RoomEvent::HandRaiseChanged {
                        connection_id: conn,
                        hand_raised,
                        by: conn,
                    },
                )
                .await;
        }
        Ok(())
    }

    async fn app_event(&mut self, from: ConnectionId, payload: Payload) -> Result<(), CoreError> {
        self.require_active(&from)?;
        self.broadcast
            .publish(&self.presence, RoomEvent::AppEvent { from, payload })
            .await;
        Ok(())
    }

    async fn chat(&mut self, from: ConnectionId, text: String) -> Result<(), CoreError> {
        self.require_active(&from)?;
        if !self.chat_enabled && !self.presence.is_host(&from) {
            return Err(CoreError::NotAuthorized("chat while chat is disabled"));
        }
        self.broadcast
            .publish(&self.presence, RoomEvent::ChatMessage { from, text })
            .await;
        Ok(())
    }

    async fn lower_hand(
        &mut self,
        by: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), CoreError> {
        if by != target {
            self.require_host(&by, "lower another participant's hand")?;
        }
        if self.presence.lower_hand(&target)? {
            self.broadcast
                .publish(
                    &self.presence,
                    RoomEvent::HandRaiseChanged {
                        connection_id: target,
                        hand_raised: false,
                        by,
                    },
                )
                .await;
        }
        Ok(())
    }

    async fn set_chat_enabled(&mut self, by: ConnectionId, enabled: bool) -> Result<(), CoreError> {
        self.require_host(&by, "toggle chat")?;
        if self.chat_enabled != enabled {
            self.chat_enabled = enabled;
            self.broadcast
                .publish(&self.presence, RoomEvent::ChatEnabledChanged(enabled))
                .await;
        }
        Ok(())
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            kind: self.kind,
            policy: self.policy,
            host: self.presence.host(),
            participants: self.presence.list(),
            pending_requests: self.pending.len(),
            chat_enabled: self.chat_enabled,
            created_at: self.created_at,
        }
    }

    async fn expire_if_idle(&mut self, idle: Duration) -> Option<Vec<ConnectionId>> {
        if !self.presence.is_empty() {
            return None;
        }

        // empty_since is never earlier than created_at
        let quiet_since = self.empty_since.unwrap_or(self.created_at);
        if quiet_since.elapsed() < idle {
            return None;
        }

        info!("Room {} idle for {:?}, expiring", self.id, quiet_since.elapsed());
        Some(self.close_room().await)
    }

    fn require_host(&self, conn: &ConnectionId, action: &'static str) -> Result<(), CoreError> {
        if self.presence.is_host(conn) {
            Ok(())
        } else {
            Err(CoreError::NotAuthorized(action))
        }
    }

    fn require_active(&self, conn: &ConnectionId) -> Result<(), CoreError> {
        if self.presence.contains(conn) {
            Ok(())
        } else {
            Err(CoreError::ParticipantNotFound(*conn))
        }
    }

    fn pending_position(&self, conn: &ConnectionId) -> Option<usize> {
        self.pending
            .iter()
            .position(|r| &r.participant.connection_id == conn)
    }

    fn take_pending(&mut self, request_id: RequestId) -> Result<PendingRequest, CoreError> {
        let pos = self
            .pending
            .iter()
            .position(|r| r.request_id == request_id)
            .ok_or(CoreError::InvalidState("no pending join request with that id"))?;
        Ok(self.pending.remove(pos))
    }
}
