use huddle_core::{ConnectionId, MediaFlags, ParticipantInfo, ParticipantView, Role};

#[derive(Debug, Clone)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub avatar_glyph: String,
    pub role: Role,
    pub hand_raised: bool,
    pub media_flags: MediaFlags,
}

impl Participant {
    /// A fresh join attempt; not yet seated in any room.
    pub fn new(connection_id: ConnectionId, info: ParticipantInfo) -> Self {
        Self {
            connection_id,
            avatar_glyph: info.glyph(),
            display_name: info.display_name,
            role: info.role,
            hand_raised: false,
            media_flags: info.media_flags,
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            connection_id: self.connection_id,
            display_name: self.display_name.clone(),
            avatar_glyph: self.avatar_glyph.clone(),
            role: self.role,
            hand_raised: self.hand_raised,
            media_flags: self.media_flags,
        }
    }
}
