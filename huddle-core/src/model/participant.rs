use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Host,
    #[default]
    Attendee,
}

/// Advisory media state reported by the client. The server never enforces it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaFlags {
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub screen_sharing: bool,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FlagsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_sharing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_raised: Option<bool>,
}

impl FlagsPatch {
    pub fn is_empty(&self) -> bool {
        self.audio_enabled.is_none()
            && self.video_enabled.is_none()
            && self.screen_sharing.is_none()
            && self.hand_raised.is_none()
    }
}

/// What a client says about itself when it asks to join.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_glyph: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub media_flags: MediaFlags,
}

impl ParticipantInfo {
    pub fn attendee(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            avatar_glyph: None,
            role: Role::Attendee,
            media_flags: MediaFlags::default(),
        }
    }

    pub fn host(display_name: impl Into<String>) -> Self {
        Self {
            role: Role::Host,
            ..Self::attendee(display_name)
        }
    }

    /// Explicit glyph, or the first two letters of the display name upper-cased.
    pub fn glyph(&self) -> String {
        match &self.avatar_glyph {
            Some(glyph) => glyph.clone(),
            None => self
                .display_name
                .chars()
                .take(2)
                .flat_map(char::to_uppercase)
                .collect(),
        }
    }
}

/// Snapshot of a participant as other peers see it.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub avatar_glyph: String,
    pub role: Role,
    pub hand_raised: bool,
    pub media_flags: MediaFlags,
}
