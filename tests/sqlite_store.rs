mod common;

use tempfile::TempDir;

use common::{RecordingStore, date, reserved_chairs, test_event, tounsi};
use eventsproject::{
    entities::{Event, Logistics, Participant},
    persist::{EventStore, LogisticsStore, ParticipantStore, StoreError, sqlite::SqliteStore},
    service::{EventService, ServiceError},
    types::Role,
};

#[test]
fn service_state_survives_reopen() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("events.db");

    let event_id = {
        let store = SqliteStore::open(&db_path).expect("open sqlite");
        let mut service = EventService::new(store);
        service.add_participant(tounsi()).expect("add");
        let event = service.assign_participant(test_event(), 1).expect("assign");
        service
            .attach_logistics(reserved_chairs(), "Test Event")
            .expect("attach chairs");
        service
            .attach_logistics(Logistics::new("Stage", 500.0, 1, false), "Test Event")
            .expect("attach stage");
        assert_eq!(service.recompute_costs().expect("recompute"), 1);
        event.id.expect("event id")
    };

    let reopened = SqliteStore::open(&db_path).expect("reopen");
    let event = reopened
        .find_event_by_description("Test Event")
        .expect("find")
        .expect("event");
    assert_eq!(event.id, Some(event_id));
    assert!((event.cost - 50.0).abs() < 1e-9);
    assert_eq!(event.start_date, date(2024, 6, 1));
    assert_eq!(event.participants.iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(event.logistics.len(), 2);

    let participant = reopened
        .find_participant(1)
        .expect("find")
        .expect("participant");
    assert_eq!(participant.role, Role::Organizer);
    assert!(participant.events.contains(&event_id));
}

#[test]
fn upserts_keep_identity_and_rewrite_links() {
    let mut store = SqliteStore::open_in_memory().expect("open sqlite");
    store.save_participant(tounsi()).expect("p1");
    let second = store
        .save_participant(Participant::new("Jaziri", "Leila", Role::Speaker))
        .expect("p2");
    assert_eq!(second.id, Some(2));

    let mut event = test_event();
    event.participants.extend([1, 2]);
    let mut event = store.save_event(event).expect("insert");

    event.participants.remove(&1);
    event.end_date = date(2024, 6, 5);
    let event = store.save_event(event).expect("update");

    assert_eq!(event.participants.iter().copied().collect::<Vec<_>>(), vec![2]);
    assert_eq!(event.end_date, date(2024, 6, 5));
    let dropped = store.find_participant(1).expect("find").expect("p1");
    assert!(dropped.events.is_empty());
}

#[test]
fn participant_query_matches_exact_name_and_role() {
    let mut store = SqliteStore::open_in_memory().expect("open sqlite");
    store.save_participant(tounsi()).expect("organizer");
    store
        .save_participant(Participant {
            id: Some(2),
            ..Participant::new("Tounsi", "Ahmed", Role::Attendee)
        })
        .expect("namesake");

    let mut organized = test_event();
    organized.participants.insert(1);
    let organized = store.save_event(organized).expect("organized");
    let mut attended = Event::new("Other Event", date(2024, 7, 1), date(2024, 7, 1));
    attended.participants.insert(2);
    store.save_event(attended).expect("attended");

    let found = store
        .find_events_by_participant("Tounsi", "Ahmed", Role::Organizer)
        .expect("query");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, organized.id);

    let organizers = store
        .find_participants_by_role(Role::Organizer)
        .expect("by role");
    assert_eq!(organizers.len(), 1);
}

#[test]
fn dangling_references_are_rejected() {
    let mut store = SqliteStore::open_in_memory().expect("open sqlite");

    let mut event = test_event();
    event.participants.insert(9);
    let err = store.save_event(event).expect_err("missing participant");
    assert!(matches!(err, StoreError::Missing { kind: "participant", id: 9 }));

    let mut item = reserved_chairs();
    item.event = Some(3);
    let err = store.save_logistics(item).expect_err("missing event");
    assert!(matches!(err, StoreError::Missing { kind: "event", id: 3 }));
}

#[test]
fn service_errors_surface_through_sqlite() {
    let store = SqliteStore::open_in_memory().expect("open sqlite");
    let mut service = EventService::new(store);
    service.add_participant(tounsi()).expect("add");
    service.assign_participant(test_event(), 1).expect("first");

    let err = service
        .assign_participant(test_event(), 1)
        .expect_err("duplicate description");
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::DuplicateDescription(_))
    ));

    let none = service
        .logistics_between(date(2024, 1, 1), date(2024, 12, 31))
        .expect("query");
    assert_eq!(none, None);
}

#[test]
fn range_query_orders_dates_past_year_9999() {
    let store = SqliteStore::open_in_memory().expect("open sqlite");
    let mut service = EventService::new(store);
    let far = date(10_000, 1, 1);
    service
        .store_mut()
        .save_event(Event::new("Far Future", far, far))
        .expect("save event");
    let saved = service
        .attach_logistics(reserved_chairs(), "Far Future")
        .expect("attach");

    let found = service
        .logistics_between(date(2024, 1, 1), date(10_001, 1, 1))
        .expect("query");
    assert_eq!(found, Some(vec![saved]));

    let reloaded = service
        .store()
        .find_event_by_description("Far Future")
        .expect("find")
        .expect("event");
    assert_eq!(reloaded.start_date, far);
}

#[test]
fn explicit_ids_beyond_sqlite_rowids_are_rejected() {
    let mut store = SqliteStore::open_in_memory().expect("open sqlite");

    let err = store
        .save_participant(Participant {
            id: Some(u64::MAX),
            ..Participant::new("Tounsi", "Ahmed", Role::Organizer)
        })
        .expect_err("id out of range");

    assert!(matches!(
        err,
        StoreError::IdOutOfRange { kind: "participant", id: u64::MAX }
    ));
    assert!(store.find_participant(u64::MAX).expect("find").is_none());
}

#[test]
fn service_writes_once_per_operation_on_sqlite() {
    let inner = SqliteStore::open_in_memory().expect("open sqlite");
    let mut service = EventService::new(RecordingStore::wrap(inner));
    service.add_participant(tounsi()).expect("add 1");
    service
        .add_participant(Participant {
            id: Some(2),
            ..Participant::new("Jaziri", "Leila", Role::Organizer)
        })
        .expect("add 2");
    service.store_mut().reset_counts();

    let mut event = test_event();
    event.participants.extend([1, 2]);
    let event = service.assign_event_participants(event).expect("assign");
    assert_eq!(service.store().event_saves.len(), 1);
    assert!(service.store().participant_saves.is_empty());

    service
        .attach_logistics(reserved_chairs(), "Test Event")
        .expect("attach");
    service.store_mut().reset_counts();

    assert_eq!(service.recompute_costs().expect("recompute"), 1);
    assert_eq!(service.store().event_saves.len(), 1);
    let stored = service
        .store()
        .inner
        .event(event.id.expect("id"))
        .expect("load")
        .expect("event");
    assert!((stored.cost - 50.0).abs() < 1e-9, "cost was {}", stored.cost);
}
