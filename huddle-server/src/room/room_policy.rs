use std::fmt;
use std::str::FromStr;

/// What happens to the host seat when the host leaves a non-empty room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostPolicy {
    /// The remaining participant who joined earliest becomes host.
    #[default]
    PromoteLongestTenured,
    /// The seat stays empty until someone joins asking for the host role.
    Hostless,
}

impl FromStr for HostPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "promote" | "promote-longest-tenured" => Ok(Self::PromoteLongestTenured),
            "hostless" => Ok(Self::Hostless),
            other => Err(format!("unknown host policy '{}'", other)),
        }
    }
}

impl fmt::Display for HostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PromoteLongestTenured => f.write_str("promote-longest-tenured"),
            Self::Hostless => f.write_str("hostless"),
        }
    }
}

/// Server-wide rules applied to every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomPolicy {
    pub host_reassignment: HostPolicy,
    /// When false a second host-role join is seated as attendee.
    pub allow_co_hosts: bool,
}

impl RoomPolicy {
    pub fn hostless() -> Self {
        Self {
            host_reassignment: HostPolicy::Hostless,
            ..Self::default()
        }
    }
}
