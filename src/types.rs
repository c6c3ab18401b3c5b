//! Shared primitive IDs and the participant role enumeration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Store-assigned participant identifier.
pub type ParticipantId = u64;
/// Store-assigned event identifier.
pub type EventId = u64;
/// Store-assigned logistics identifier.
pub type LogisticsId = u64;

/// Fixed category of a participant's involvement in an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Runs the event; cost-bearing by default.
    Organizer,
    /// Presents at the event.
    Speaker,
    /// Attends the event.
    #[default]
    Attendee,
    /// Works the event on site.
    Staff,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Organizer, Role::Speaker, Role::Attendee, Role::Staff];

    /// Stable textual form used in storage and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Organizer => "ORGANIZER",
            Role::Speaker => "SPEAKER",
            Role::Attendee => "ATTENDEE",
            Role::Staff => "STAFF",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the [`Role`] forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
