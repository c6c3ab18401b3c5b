//! Runtime event stream payloads.

use crate::types::{EventId, LogisticsId, ParticipantId};

/// Notifications emitted by the service worker after each successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A participant was saved.
    ParticipantAdded {
        /// Saved participant id.
        id: ParticipantId,
    },
    /// An event was saved with its participant links.
    EventSaved {
        /// Saved event id.
        id: EventId,
    },
    /// A logistics item was attached to an event.
    LogisticsAttached {
        /// Saved logistics id.
        id: LogisticsId,
        /// Owning event id.
        event: EventId,
    },
    /// A cost recompute pass finished.
    CostsRecomputed {
        /// Number of events saved by the pass.
        events: usize,
    },
}
