//! Event, participant, and logistics management over pluggable stores.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::MemoryStore`]:
//! ```
//! use chrono::NaiveDate;
//! use eventsproject::{
//!     core::store::MemoryStore,
//!     entities::{Event, Logistics, Participant},
//!     service::EventService,
//!     types::Role,
//! };
//!
//! let mut service = EventService::new(MemoryStore::new());
//! let organizer = service
//!     .add_participant(Participant::new("Tounsi", "Ahmed", Role::Organizer))
//!     .expect("add participant");
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
//! let event = Event::new("Test Event", day, day);
//! let event = service
//!     .assign_participant(event, organizer.id.expect("id"))
//!     .expect("assign");
//!
//! service
//!     .attach_logistics(Logistics::new("Chairs", 10.0, 5, true), "Test Event")
//!     .expect("attach");
//! assert_eq!(service.recompute_costs().expect("recompute"), 1);
//!
//! let stored = service.store().event(event.id.expect("id")).expect("event");
//! assert_eq!(stored.cost, 50.0);
//! ```
//!
//! Serialized async usage with a SQLite store:
//! ```no_run
//! use eventsproject::{
//!     entities::Participant,
//!     persist::sqlite::SqliteStore,
//!     runtime::handle::{spawn_event_service, RuntimeConfig},
//!     service::EventService,
//!     types::Role,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteStore::open("events.db").expect("open sqlite");
//! let handle = spawn_event_service(EventService::new(store), RuntimeConfig::default());
//! let _saved = handle
//!     .add_participant(Participant::new("Tounsi", "Ahmed", Role::Organizer))
//!     .await
//!     .expect("add participant");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Service configuration.
pub mod config;
/// In-memory store and index helpers.
pub mod core;
/// Domain records and association helpers.
pub mod entities;
/// Store traits and SQLite implementation.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Event service operations.
pub mod service;
/// Shared primitive types and enums.
pub mod types;
