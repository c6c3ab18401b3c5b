//! Event/participant/logistics operations over a [`Store`].
//!
//! Only the writes listed on each method are issued. In particular:
//!
//! - [`EventService::assign_participant`] and
//!   [`EventService::assign_event_participants`] save the event, never the
//!   participant. The event row owns the participant links, so the
//!   participant side becomes visible on its next load.
//! - [`EventService::attach_logistics`] saves the logistics item, never the
//!   event. The item owns its event back-reference, so the event side becomes
//!   visible on its next load.

use chrono::NaiveDate;
use hashbrown::HashSet;
use thiserror::Error;

use crate::{
    config::ServiceConfig,
    entities::{Event, Logistics, Participant, associate, link_logistics},
    persist::{Store, StoreError},
    types::{EventId, ParticipantId, Role},
};

/// Failures surfaced by [`EventService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No participant has this identity.
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    /// No event has this description.
    #[error("event {0:?} not found")]
    EventNotFound(String),
    /// The store rejected a read or write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stateless operation set over one store backend.
pub struct EventService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S: Store> EventService<S> {
    /// Wraps `store` with the default [`ServiceConfig`].
    pub fn new(store: S) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    /// Wraps `store` with an explicit config.
    pub fn with_config(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrows the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Returns the active config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Unwraps the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Persists `participant` as-is and returns the stored record.
    ///
    /// `participant.events` is not written; event links belong to events, so the
    /// returned record carries whatever links the store already holds for that id.
    pub fn add_participant(&mut self, participant: Participant) -> ServiceResult<Participant> {
        let saved = self.store.save_participant(participant)?;
        tracing::debug!(participant_id = ?saved.id, role = %saved.role, "participant saved");
        Ok(saved)
    }

    /// Links the participant `participant_id` to `event` and saves the event.
    pub fn assign_participant(
        &mut self,
        mut event: Event,
        participant_id: ParticipantId,
    ) -> ServiceResult<Event> {
        let mut participant = self.require_participant(participant_id)?;
        associate(&mut event, &mut participant);

        let saved = self.store.save_event(event)?;
        tracing::debug!(event_id = ?saved.id, participant_id, "participant assigned to event");
        Ok(saved)
    }

    /// Re-resolves every participant already on `event`, links each, and saves
    /// the event once.
    ///
    /// Fails on the first unknown participant without saving anything.
    pub fn assign_event_participants(&mut self, mut event: Event) -> ServiceResult<Event> {
        let ids: Vec<ParticipantId> = event.participants.iter().copied().collect();
        for participant_id in ids {
            let mut participant = self.require_participant(participant_id)?;
            associate(&mut event, &mut participant);
        }

        let saved = self.store.save_event(event)?;
        tracing::debug!(
            event_id = ?saved.id,
            participants = saved.participants.len(),
            "event participants assigned"
        );
        Ok(saved)
    }

    /// Attaches `logistics` to the event described by `description` and saves the item.
    pub fn attach_logistics(
        &mut self,
        mut logistics: Logistics,
        description: &str,
    ) -> ServiceResult<Logistics> {
        let Some(mut event) = self.store.find_event_by_description(description)? else {
            tracing::warn!(description, "no event with this description");
            return Err(ServiceError::EventNotFound(description.to_string()));
        };
        link_logistics(&mut event, &mut logistics);

        let saved = self.store.save_logistics(logistics)?;
        tracing::debug!(logistics_id = ?saved.id, event_id = ?event.id, "logistics attached");
        Ok(saved)
    }

    /// Flattens the logistics of every event starting in `[start, end]`.
    ///
    /// Returns `None` rather than an empty list when nothing matched.
    pub fn logistics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Option<Vec<Logistics>>> {
        let items: Vec<Logistics> = self
            .store
            .find_events_by_start_date_between(start, end)?
            .into_iter()
            .flat_map(|event| event.logistics)
            .collect();

        if items.is_empty() {
            tracing::debug!(%start, %end, "no logistics in range");
            return Ok(None);
        }
        Ok(Some(items))
    }

    /// Recomputes and saves the cost of every event that has a participant in
    /// one of the configured cost roles.
    ///
    /// Each event is saved at most once. Returns how many events were saved.
    pub fn recompute_costs(&mut self) -> ServiceResult<usize> {
        let mut identities: Vec<(String, String, Role)> = Vec::new();
        for role in &self.config.cost_roles {
            for participant in self.store.find_participants_by_role(*role)? {
                let identity = (participant.last_name, participant.first_name, participant.role);
                if !identities.contains(&identity) {
                    identities.push(identity);
                }
            }
        }

        let mut done: HashSet<EventId> = HashSet::new();
        for (last_name, first_name, role) in &identities {
            for mut event in self
                .store
                .find_events_by_participant(last_name, first_name, *role)?
            {
                let Some(id) = event.id else { continue };
                if !done.insert(id) {
                    continue;
                }
                let cost = event.recompute_cost();
                self.store.save_event(event)?;
                tracing::debug!(event_id = id, cost, "event cost recomputed");
            }
        }

        tracing::info!(
            identities = identities.len(),
            events = done.len(),
            "cost recompute finished"
        );
        Ok(done.len())
    }

    fn require_participant(&self, id: ParticipantId) -> ServiceResult<Participant> {
        match self.store.find_participant(id)? {
            Some(participant) => Ok(participant),
            None => {
                tracing::warn!(participant_id = id, "participant not found");
                Err(ServiceError::ParticipantNotFound(id))
            }
        }
    }
}
