use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use hashbrown::{HashMap, HashSet};

use crate::{
    entities::{Event, Logistics, Participant},
    persist::{EventStore, LogisticsStore, ParticipantStore, StoreError, StoreResult},
    types::{EventId, LogisticsId, ParticipantId, Role},
};

use super::indices::{VecIndex, insert_unique, remove_from};

#[derive(Debug, Clone)]
struct ParticipantRow {
    id: ParticipantId,
    last_name: String,
    first_name: String,
    role: Role,
}

#[derive(Debug, Clone)]
struct EventRow {
    id: EventId,
    description: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cost: f64,
    participants: BTreeSet<ParticipantId>,
}

/// Hash-map backed store with secondary indices for every lookup the service issues.
#[derive(Debug)]
pub struct MemoryStore {
    participants: HashMap<ParticipantId, ParticipantRow>,
    events: HashMap<EventId, EventRow>,
    event_order: Vec<EventId>,
    logistics: HashMap<LogisticsId, Logistics>,
    by_description: HashMap<String, EventId>,
    by_start: BTreeMap<NaiveDate, Vec<EventId>>,
    by_role: VecIndex<Role, ParticipantId>,
    events_by_participant: VecIndex<ParticipantId, EventId>,
    logistics_by_event: VecIndex<EventId, LogisticsId>,
    // `None` once the id space is used up.
    next_participant_id: Option<ParticipantId>,
    next_event_id: Option<EventId>,
    next_logistics_id: Option<LogisticsId>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store whose identities start at 1.
    pub fn new() -> Self {
        Self {
            participants: HashMap::new(),
            events: HashMap::new(),
            event_order: Vec::new(),
            logistics: HashMap::new(),
            by_description: HashMap::new(),
            by_start: BTreeMap::new(),
            by_role: VecIndex::new(),
            events_by_participant: VecIndex::new(),
            logistics_by_event: VecIndex::new(),
            next_participant_id: Some(1),
            next_event_id: Some(1),
            next_logistics_id: Some(1),
        }
    }

    /// Looks up one event by identity.
    pub fn event(&self, id: EventId) -> Option<Event> {
        self.hydrate_event(id)
    }

    /// Every stored event, in creation order.
    pub fn events(&self) -> Vec<Event> {
        self.event_order
            .iter()
            .filter_map(|id| self.hydrate_event(*id))
            .collect()
    }

    /// Number of stored events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn hydrate_participant(&self, id: ParticipantId) -> Option<Participant> {
        let row = self.participants.get(&id)?;
        let events = self
            .events_by_participant
            .get(&id)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        Some(Participant {
            id: Some(row.id),
            last_name: row.last_name.clone(),
            first_name: row.first_name.clone(),
            role: row.role,
            events,
        })
    }

    fn hydrate_event(&self, id: EventId) -> Option<Event> {
        let row = self.events.get(&id)?;
        let logistics = self
            .logistics_by_event
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|item_id| self.logistics.get(item_id).cloned())
            .collect();
        Some(Event {
            id: Some(row.id),
            description: row.description.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            cost: row.cost,
            participants: row.participants.clone(),
            logistics,
        })
    }

    fn hydrate_events_in_order(&self, ids: &HashSet<EventId>) -> Vec<Event> {
        self.event_order
            .iter()
            .filter(|id| ids.contains(*id))
            .filter_map(|id| self.hydrate_event(*id))
            .collect()
    }

    fn remove_event_indices(&mut self, row: &EventRow) {
        self.by_description.remove(&row.description);
        if let Some(ids) = self.by_start.get_mut(&row.start_date) {
            ids.retain(|id| *id != row.id);
            if ids.is_empty() {
                self.by_start.remove(&row.start_date);
            }
        }
        for participant_id in &row.participants {
            remove_from(&mut self.events_by_participant, participant_id, &row.id);
        }
    }

    fn insert_event_indices(&mut self, row: &EventRow) {
        self.by_description.insert(row.description.clone(), row.id);
        self.by_start.entry(row.start_date).or_default().push(row.id);
        for participant_id in &row.participants {
            insert_unique(&mut self.events_by_participant, *participant_id, row.id);
        }
    }
}

impl ParticipantStore for MemoryStore {
    fn save_participant(&mut self, participant: Participant) -> StoreResult<Participant> {
        let id = allocate(&mut self.next_participant_id, participant.id, "participant")?;
        let row = ParticipantRow {
            id,
            last_name: participant.last_name,
            first_name: participant.first_name,
            role: participant.role,
        };

        if let Some(old) = self.participants.insert(id, row.clone()) {
            remove_from(&mut self.by_role, &old.role, &id);
        }
        insert_unique(&mut self.by_role, row.role, id);

        self.hydrate_participant(id)
            .ok_or(StoreError::Missing { kind: "participant", id })
    }

    fn find_participant(&self, id: ParticipantId) -> StoreResult<Option<Participant>> {
        Ok(self.hydrate_participant(id))
    }

    fn find_participants_by_role(&self, role: Role) -> StoreResult<Vec<Participant>> {
        Ok(self
            .by_role
            .get(&role)
            .into_iter()
            .flatten()
            .filter_map(|id| self.hydrate_participant(*id))
            .collect())
    }
}

impl EventStore for MemoryStore {
    fn save_event(&mut self, event: Event) -> StoreResult<Event> {
        if let Some(&owner) = self.by_description.get(&event.description) {
            if Some(owner) != event.id {
                return Err(StoreError::DuplicateDescription(event.description));
            }
        }
        if let Some(missing) = event
            .participants
            .iter()
            .find(|id| !self.participants.contains_key(*id))
        {
            return Err(StoreError::Missing {
                kind: "participant",
                id: *missing,
            });
        }

        let id = allocate(&mut self.next_event_id, event.id, "event")?;
        let row = EventRow {
            id,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            cost: event.cost,
            participants: event.participants,
        };

        match self.events.insert(id, row.clone()) {
            Some(old) => self.remove_event_indices(&old),
            None => self.event_order.push(id),
        }
        self.insert_event_indices(&row);

        self.hydrate_event(id)
            .ok_or(StoreError::Missing { kind: "event", id })
    }

    fn find_event_by_description(&self, description: &str) -> StoreResult<Option<Event>> {
        Ok(self
            .by_description
            .get(description)
            .and_then(|id| self.hydrate_event(*id)))
    }

    fn find_events_by_start_date_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Event>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .by_start
            .range(start..=end)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| self.hydrate_event(*id))
            .collect())
    }

    fn find_events_by_participant(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> StoreResult<Vec<Event>> {
        let matched: HashSet<EventId> = self
            .by_role
            .get(&role)
            .into_iter()
            .flatten()
            .filter(|id| {
                self.participants
                    .get(*id)
                    .is_some_and(|p| p.last_name == last_name && p.first_name == first_name)
            })
            .flat_map(|id| self.events_by_participant.get(id).into_iter().flatten())
            .copied()
            .collect();
        Ok(self.hydrate_events_in_order(&matched))
    }
}

impl LogisticsStore for MemoryStore {
    fn save_logistics(&mut self, mut logistics: Logistics) -> StoreResult<Logistics> {
        if let Some(event_id) = logistics.event {
            if !self.events.contains_key(&event_id) {
                return Err(StoreError::Missing {
                    kind: "event",
                    id: event_id,
                });
            }
        }

        let id = allocate(&mut self.next_logistics_id, logistics.id, "logistics")?;
        logistics.id = Some(id);

        if let Some(old_event) = self.logistics.get(&id).and_then(|old| old.event) {
            remove_from(&mut self.logistics_by_event, &old_event, &id);
        }
        if let Some(event_id) = logistics.event {
            insert_unique(&mut self.logistics_by_event, event_id, id);
        }
        self.logistics.insert(id, logistics.clone());
        Ok(logistics)
    }
}

fn allocate(next: &mut Option<u64>, requested: Option<u64>, kind: &'static str) -> StoreResult<u64> {
    match requested {
        Some(id) => {
            if next.is_some_and(|n| id >= n) {
                *next = id.checked_add(1);
            }
            Ok(id)
        }
        None => {
            let id = next.ok_or(StoreError::IdSpaceExhausted { kind })?;
            *next = id.checked_add(1);
            Ok(id)
        }
    }
}
