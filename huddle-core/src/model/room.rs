use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Human-shareable room identifier such as `TCH-AB12345CD`.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Builds `<TAG>-<token>` for the given kind.
    pub fn compose(kind: RoomKind, token: &str) -> Self {
        Self(format!("{}-{}", kind.tag(), token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind encoded in the prefix, if the id was produced by [`RoomId::compose`].
    pub fn kind(&self) -> Option<RoomKind> {
        let (tag, _) = self.0.split_once('-')?;
        RoomKind::from_tag(tag)
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RoomKind {
    Teaching,
    Gaming,
    Event,
    Chill,
}

impl RoomKind {
    pub const ALL: [RoomKind; 4] = [Self::Teaching, Self::Gaming, Self::Event, Self::Chill];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Teaching => "TCH",
            Self::Gaming => "GAME",
            Self::Event => "EVENT",
            Self::Chill => "CHILL",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Classrooms are gated by the instructor; every other zone lets people straight in.
    pub fn default_policy(self) -> JoinPolicy {
        match self {
            Self::Teaching => JoinPolicy::Approval,
            Self::Gaming | Self::Event | Self::Chill => JoinPolicy::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoomKindError(pub String);

impl fmt::Display for ParseRoomKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown room kind '{}'", self.0)
    }
}

impl std::error::Error for ParseRoomKindError {}

impl FromStr for RoomKind {
    type Err = ParseRoomKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teaching" => Ok(Self::Teaching),
            "gaming" => Ok(Self::Gaming),
            "event" => Ok(Self::Event),
            "chill" => Ok(Self::Chill),
            other => Err(ParseRoomKindError(other.to_owned())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum JoinPolicy {
    /// Joiners become active immediately.
    Open,
    /// Joiners wait until the host approves them.
    Approval,
}
