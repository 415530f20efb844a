use crate::error::CoreError;
use crate::presence::Participant;
use crate::registry::{RoomHandle, RoomStats, generate_room_id, is_valid_room_id};
use crate::room::{Room, RoomPolicy, RoomSetup};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::{ConnectionId, JoinPolicy, RoomId, RoomKind};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const ROOM_COMMAND_BUFFER: usize = 100;
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub rooms: usize,
    pub participants: usize,
}

/// Room that the idle sweep closed, with the connections it turned away.
#[derive(Debug, Clone)]
pub struct ExpiredRoom {
    pub id: RoomId,
    pub evicted: Vec<ConnectionId>,
}

/// Owner of every live room. Each room runs as its own actor; the map only
/// holds their addresses, so unrelated rooms never contend on a lock for
/// longer than a shard lookup.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, RoomHandle>>,
    signaling: Arc<dyn SignalingOutput>,
    room_policy: RoomPolicy,
}

impl RoomRegistry {
    pub fn new(signaling: Arc<dyn SignalingOutput>, room_policy: RoomPolicy) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
            room_policy,
        }
    }

    pub fn room_policy(&self) -> RoomPolicy {
        self.room_policy
    }

    /// Starts a room with `host` seated as its host.
    ///
    /// Without an explicit id a fresh one is generated and regenerated on
    /// collision. An explicit id already in use fails with `DuplicateRoom`.
    pub fn create_room(
        &self,
        kind: RoomKind,
        room_id: Option<RoomId>,
        policy: Option<JoinPolicy>,
        host: Participant,
    ) -> Result<RoomHandle, CoreError> {
        let policy = policy.unwrap_or_else(|| kind.default_policy());

        let Some(explicit) = room_id else {
            for _ in 0..MAX_ID_ATTEMPTS {
                let id = generate_room_id(kind);
                match self.rooms.entry(id.clone()) {
                    Entry::Occupied(_) => debug!("Room id {} collided, regenerating", id),
                    Entry::Vacant(slot) => {
                        let handle = self.spawn(id, kind, policy, host);
                        slot.insert(handle.clone());
                        return Ok(handle);
                    }
                }
            }
            return Err(CoreError::InvalidState("could not allocate a unique room id"));
        };

        if !is_valid_room_id(&explicit) {
            return Err(CoreError::InvalidState(
                "room id must be 1-64 characters of A-Z, 0-9 or '-'",
            ));
        }

        match self.rooms.entry(explicit.clone()) {
            Entry::Occupied(mut occupied) if occupied.get().is_closed() => {
                let handle = self.spawn(explicit, kind, policy, host);
                occupied.insert(handle.clone());
                Ok(handle)
            }
            Entry::Occupied(_) => Err(CoreError::DuplicateRoom(explicit)),
            Entry::Vacant(slot) => {
                let handle = self.spawn(explicit, kind, policy, host);
                slot.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    fn spawn(
        &self,
        id: RoomId,
        kind: RoomKind,
        policy: JoinPolicy,
        host: Participant,
    ) -> RoomHandle {
        info!("Creating new room: {} ({:?}, {:?})", id, kind, policy);

        let (tx, rx) = mpsc::channel(ROOM_COMMAND_BUFFER);
        let stats = Arc::new(RoomStats::default());
        let setup = RoomSetup {
            id: id.clone(),
            kind,
            policy,
            room_policy: self.room_policy,
        };

        let room = Room::new(setup, host, rx, self.signaling.clone(), stats.clone());
        tokio::spawn(room.run());

        RoomHandle::new(id, tx, stats)
    }

    pub fn get_room(&self, id: &RoomId) -> Result<RoomHandle, CoreError> {
        self.rooms
            .get(id)
            .map(|entry| entry.value().clone())
            .filter(|handle| !handle.is_closed())
            .ok_or_else(|| CoreError::RoomNotFound(id.clone()))
    }

    /// Drops the registry entry without touching the actor. Used once the
    /// actor has already closed itself.
    pub(crate) fn forget(&self, handle: &RoomHandle) {
        self.rooms
            .remove_if(handle.id(), |_, current| current.same_room(handle));
    }

    /// Closes and unregisters a room. No-op when absent; returns the
    /// connections it evicted.
    pub async fn remove_room(&self, id: &RoomId) -> Vec<ConnectionId> {
        let Some((_, handle)) = self.rooms.remove(id) else {
            debug!("Room {} already removed", id);
            return Vec::new();
        };

        info!("Removing room {}", id);
        handle.shutdown().await.unwrap_or_default()
    }

    /// Closes every room that has been empty for at least `idle`.
    pub async fn sweep(&self, idle: Duration) -> Vec<ExpiredRoom> {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|e| e.value().clone()).collect();
        let mut expired = Vec::new();

        for handle in handles {
            match handle.expire_if_idle(idle).await {
                Ok(Some(evicted)) => {
                    self.forget(&handle);
                    expired.push(ExpiredRoom {
                        id: handle.id().clone(),
                        evicted,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Room {} stopped answering, dropping it: {}", handle.id(), e);
                    self.forget(&handle);
                }
            }
        }

        if !expired.is_empty() {
            info!("Idle sweep removed {} rooms", expired.len());
        }
        expired
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn stats(&self) -> RegistryStats {
        self.rooms.iter().fold(RegistryStats::default(), |mut acc, e| {
            acc.rooms += 1;
            acc.participants += e.value().participant_count();
            acc
        })
    }
}
