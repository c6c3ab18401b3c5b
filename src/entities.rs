//! Participant, event, and logistics records plus association helpers.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{EventId, LogisticsId, ParticipantId, Role};

/// A person taking part in one or more events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Participant {
    /// Store-assigned identity, `None` until first save.
    pub id: Option<ParticipantId>,
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
    /// Involvement category.
    pub role: Role,
    /// Events this participant is linked to.
    ///
    /// Hydrated by the store from the event side of the link; ignored on save.
    pub events: BTreeSet<EventId>,
}

impl Participant {
    /// Builds an unsaved participant with no event links.
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            role,
            events: BTreeSet::new(),
        }
    }
}

/// A scheduled occurrence with attached participants and logistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identity, `None` until first save.
    pub id: Option<EventId>,
    /// Human-readable description, unique per store.
    pub description: String,
    /// First day of the event.
    pub start_date: NaiveDate,
    /// Last day of the event.
    pub end_date: NaiveDate,
    /// Sum over reserved logistics, as of the last recompute.
    pub cost: f64,
    /// Linked participants. Saved with the event.
    pub participants: BTreeSet<ParticipantId>,
    /// Attached logistics items.
    ///
    /// Hydrated by the store from each item's back-reference; ignored on save.
    pub logistics: Vec<Logistics>,
}

impl Event {
    /// Builds an unsaved event with zero cost and no links.
    pub fn new(description: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            description: description.into(),
            start_date,
            end_date,
            cost: 0.0,
            participants: BTreeSet::new(),
            logistics: Vec::new(),
        }
    }

    /// Recomputes [`Event::cost`] from scratch over reserved logistics and returns it.
    pub fn recompute_cost(&mut self) -> f64 {
        self.cost = self
            .logistics
            .iter()
            .filter(|item| item.reserved)
            .map(Logistics::line_total)
            .sum();
        self.cost
    }
}

/// A priced resource item attached to an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Logistics {
    /// Store-assigned identity, `None` until first save.
    pub id: Option<LogisticsId>,
    /// Item description.
    pub description: String,
    /// Price of one unit.
    pub unit_price: f64,
    /// Number of units.
    pub quantity: u32,
    /// Only reserved items count toward event cost.
    pub reserved: bool,
    /// Owning event. Saved with the item.
    pub event: Option<EventId>,
}

impl Logistics {
    /// Builds an unsaved, unattached item.
    pub fn new(description: impl Into<String>, unit_price: f64, quantity: u32, reserved: bool) -> Self {
        Self {
            id: None,
            description: description.into(),
            unit_price,
            quantity,
            reserved,
            event: None,
        }
    }

    /// `unit_price * quantity`, regardless of reservation.
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Links `participant` and `event` on both in-memory sides.
///
/// The participant side can only record the event once it has an identity;
/// the store rebuilds that side from the event's links on every load.
pub fn associate(event: &mut Event, participant: &mut Participant) {
    if let Some(participant_id) = participant.id {
        event.participants.insert(participant_id);
    }
    if let Some(event_id) = event.id {
        participant.events.insert(event_id);
    }
}

/// Points `logistics` at `event` and adds it to the event's item set.
///
/// An item already present with the same identity is replaced.
pub fn link_logistics(event: &mut Event, logistics: &mut Logistics) {
    logistics.event = event.id;
    if let Some(id) = logistics.id {
        if let Some(existing) = event.logistics.iter_mut().find(|item| item.id == Some(id)) {
            *existing = logistics.clone();
            return;
        }
    }
    event.logistics.push(logistics.clone());
}
