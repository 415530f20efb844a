use crate::error::CoreError;
use crate::presence::Participant;
use crate::room::{HostPolicy, RoomPolicy};
use huddle_core::{ConnectionId, FlagsPatch, MediaFlags, ParticipantView, Role};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostChange {
    Unchanged,
    Promoted(ConnectionId),
    Vacated,
}

#[derive(Debug)]
pub struct Removal {
    pub participant: Participant,
    pub host_change: HostChange,
}

/// Which observable fields an update actually changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlagChanges {
    pub hand_raised: Option<bool>,
    pub media_flags: Option<MediaFlags>,
    pub screen_sharing: Option<bool>,
}

/// Active participants of one room, in join order.
///
/// The only owner of participant records: everything outside the room refers
/// to participants by [`ConnectionId`].
pub struct PresenceTracker {
    participants: Vec<Participant>,
    host: Option<ConnectionId>,
    policy: RoomPolicy,
}

impl PresenceTracker {
    pub fn new(policy: RoomPolicy) -> Self {
        Self {
            participants: Vec::new(),
            host: None,
            policy,
        }
    }

    /// Tracker whose first participant is the room creator, seated as host.
    pub fn with_host(policy: RoomPolicy, mut host: Participant) -> Self {
        host.role = Role::Host;
        Self {
            host: Some(host.connection_id),
            participants: vec![host],
            policy,
        }
    }

    /// Seats `participant` as active. A host-role request is downgraded to
    /// attendee when the seat is taken and co-hosting is off.
    pub fn add(&mut self, mut participant: Participant) -> Result<ParticipantView, CoreError> {
        if self.contains(&participant.connection_id) {
            return Err(CoreError::InvalidState("connection is already in the room"));
        }

        if participant.is_host() {
            if self.host.is_none() {
                self.host = Some(participant.connection_id);
            } else if !self.policy.allow_co_hosts {
                debug!(
                    "Host seat taken, seating {} as attendee",
                    participant.connection_id
                );
                participant.role = Role::Attendee;
            }
        }

        let view = participant.view();
        self.participants.push(participant);
        Ok(view)
    }

    pub fn remove(&mut self, conn: &ConnectionId) -> Option<Removal> {
        let pos = self.position(conn)?;
        let participant = self.participants.remove(pos);

        let host_change = if self.host == Some(*conn) {
            self.reassign_host()
        } else {
            HostChange::Unchanged
        };

        Some(Removal {
            participant,
            host_change,
        })
    }

    fn reassign_host(&mut self) -> HostChange {
        if let Some(co_host) = self.participants.iter().find(|p| p.is_host()) {
            self.host = Some(co_host.connection_id);
            return HostChange::Promoted(co_host.connection_id);
        }

        self.host = None;
        if self.policy.host_reassignment == HostPolicy::Hostless {
            return HostChange::Vacated;
        }

        match self.participants.first_mut() {
            Some(next) => {
                next.role = Role::Host;
                self.host = Some(next.connection_id);
                HostChange::Promoted(next.connection_id)
            }
            None => HostChange::Vacated,
        }
    }

    pub fn update_flags(
        &mut self,
        conn: &ConnectionId,
        patch: FlagsPatch,
    ) -> Result<FlagChanges, CoreError> {
        let participant = self
            .get_mut(conn)
            .ok_or(CoreError::ParticipantNotFound(*conn))?;

        let before = participant.media_flags;
        let flags = &mut participant.media_flags;
        if let Some(audio) = patch.audio_enabled {
            flags.audio_enabled = audio;
        }
        if let Some(video) = patch.video_enabled {
            flags.video_enabled = video;
        }
        if let Some(screen) = patch.screen_sharing {
            flags.screen_sharing = screen;
        }

        let mut changes = FlagChanges::default();
        if before.audio_enabled != flags.audio_enabled
            || before.video_enabled != flags.video_enabled
        {
            changes.media_flags = Some(*flags);
        }
        if before.screen_sharing != flags.screen_sharing {
            changes.screen_sharing = Some(flags.screen_sharing);
        }
        if let Some(raised) = patch.hand_raised {
            if participant.hand_raised != raised {
                participant.hand_raised = raised;
                changes.hand_raised = Some(raised);
            }
        }

        Ok(changes)
    }

    /// Clears a raised hand. Returns whether anything changed.
    pub fn lower_hand(&mut self, conn: &ConnectionId) -> Result<bool, CoreError> {
        let participant = self
            .get_mut(conn)
            .ok_or(CoreError::ParticipantNotFound(*conn))?;
        let was_raised = participant.hand_raised;
        participant.hand_raised = false;
        Ok(was_raised)
    }

    /// Removes everyone, e.g. when the room ends.
    pub fn drain(&mut self) -> Vec<Participant> {
        self.host = None;
        self.participants.drain(..).collect()
    }

    pub fn list(&self) -> Vec<ParticipantView> {
        self.participants.iter().map(Participant::view).collect()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.participants.iter().map(|p| p.connection_id).collect()
    }

    pub fn hosts(&self) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .filter(|p| p.is_host())
            .map(|p| p.connection_id)
            .collect()
    }

    pub fn host(&self) -> Option<ConnectionId> {
        self.host
    }

    pub fn is_host(&self, conn: &ConnectionId) -> bool {
        self.get(conn).is_some_and(Participant::is_host)
    }

    pub fn contains(&self, conn: &ConnectionId) -> bool {
        self.position(conn).is_some()
    }

    pub fn get(&self, conn: &ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.connection_id == conn)
    }

    fn get_mut(&mut self, conn: &ConnectionId) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| &p.connection_id == conn)
    }

    fn position(&self, conn: &ConnectionId) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| &p.connection_id == conn)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
