#![allow(dead_code)]

use chrono::NaiveDate;

use eventsproject::{
    core::store::MemoryStore,
    entities::{Event, Logistics, Participant},
    persist::{EventStore, LogisticsStore, ParticipantStore, StoreResult},
    types::{EventId, ParticipantId, Role},
};

/// Wraps any store and records every write the service issues.
#[derive(Debug)]
pub struct RecordingStore<S = MemoryStore> {
    pub inner: S,
    pub participant_saves: Vec<Participant>,
    pub event_saves: Vec<Event>,
    pub logistics_saves: Vec<Logistics>,
}

impl RecordingStore<MemoryStore> {
    pub fn new() -> Self {
        Self::wrap(MemoryStore::new())
    }
}

impl<S> RecordingStore<S> {
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            participant_saves: Vec::new(),
            event_saves: Vec::new(),
            logistics_saves: Vec::new(),
        }
    }

    pub fn reset_counts(&mut self) {
        self.participant_saves.clear();
        self.event_saves.clear();
        self.logistics_saves.clear();
    }
}

impl<S: ParticipantStore> ParticipantStore for RecordingStore<S> {
    fn save_participant(&mut self, participant: Participant) -> StoreResult<Participant> {
        self.participant_saves.push(participant.clone());
        self.inner.save_participant(participant)
    }

    fn find_participant(&self, id: ParticipantId) -> StoreResult<Option<Participant>> {
        self.inner.find_participant(id)
    }

    fn find_participants_by_role(&self, role: Role) -> StoreResult<Vec<Participant>> {
        self.inner.find_participants_by_role(role)
    }
}

impl<S: EventStore> EventStore for RecordingStore<S> {
    fn save_event(&mut self, event: Event) -> StoreResult<Event> {
        self.event_saves.push(event.clone());
        self.inner.save_event(event)
    }

    fn find_event_by_description(&self, description: &str) -> StoreResult<Option<Event>> {
        self.inner.find_event_by_description(description)
    }

    fn find_events_by_start_date_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Event>> {
        self.inner.find_events_by_start_date_between(start, end)
    }

    fn find_events_by_participant(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> StoreResult<Vec<Event>> {
        self.inner
            .find_events_by_participant(last_name, first_name, role)
    }
}

impl<S: LogisticsStore> LogisticsStore for RecordingStore<S> {
    fn save_logistics(&mut self, logistics: Logistics) -> StoreResult<Logistics> {
        self.logistics_saves.push(logistics.clone());
        self.inner.save_logistics(logistics)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn tounsi() -> Participant {
    Participant {
        id: Some(1),
        ..Participant::new("Tounsi", "Ahmed", Role::Organizer)
    }
}

pub fn test_event() -> Event {
    Event::new("Test Event", date(2024, 6, 1), date(2024, 6, 2))
}

pub fn reserved_chairs() -> Logistics {
    Logistics::new("Chairs", 10.0, 5, true)
}

pub fn event_ids(events: &[Event]) -> Vec<EventId> {
    events.iter().filter_map(|e| e.id).collect()
}
