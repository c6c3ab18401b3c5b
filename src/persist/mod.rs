pub mod sqlite;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    entities::{Event, Logistics, Participant},
    types::{ParticipantId, Role},
};

/// Failures raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A save referenced a record that does not exist.
    #[error("{kind} {id} does not exist")]
    Missing {
        /// Kind of the referenced record.
        kind: &'static str,
        /// Referenced identity.
        id: u64,
    },
    /// Every identity of this kind has been handed out.
    #[error("no {kind} identities left")]
    IdSpaceExhausted {
        /// Kind of record being created.
        kind: &'static str,
    },
    /// The backend cannot represent this identity.
    #[error("{kind} id {id} is out of range")]
    IdOutOfRange {
        /// Kind of the record.
        kind: &'static str,
        /// Requested identity.
        id: u64,
    },
    /// Another event already uses this description.
    #[error("event description already in use: {0}")]
    DuplicateDescription(String),
    /// A stored value could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Participant persistence.
pub trait ParticipantStore {
    /// Inserts or replaces a participant, assigning an identity when absent.
    ///
    /// `participant.events` is not written; the returned value carries the
    /// stored event links.
    fn save_participant(&mut self, participant: Participant) -> StoreResult<Participant>;
    /// Looks up one participant by identity.
    fn find_participant(&self, id: ParticipantId) -> StoreResult<Option<Participant>>;
    /// Every participant holding `role`, in creation order.
    fn find_participants_by_role(&self, role: Role) -> StoreResult<Vec<Participant>>;
}

/// Event persistence.
pub trait EventStore {
    /// Inserts or replaces an event and rewrites its participant links.
    ///
    /// `event.logistics` is not written; the returned value carries the
    /// stored items.
    fn save_event(&mut self, event: Event) -> StoreResult<Event>;
    /// Looks up one event by its description.
    fn find_event_by_description(&self, description: &str) -> StoreResult<Option<Event>>;
    /// Events whose start date lies in `[start, end]`, both bounds included.
    fn find_events_by_start_date_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Event>>;
    /// Events linked to a participant with exactly this name and role.
    fn find_events_by_participant(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> StoreResult<Vec<Event>>;
}

/// Logistics persistence.
pub trait LogisticsStore {
    /// Inserts or replaces an item together with its event back-reference.
    fn save_logistics(&mut self, logistics: Logistics) -> StoreResult<Logistics>;
}

/// A backend serving all three record kinds.
pub trait Store: ParticipantStore + EventStore + LogisticsStore {}

impl<T: ParticipantStore + EventStore + LogisticsStore> Store for T {}

