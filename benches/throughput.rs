use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use eventsproject::{
    core::store::MemoryStore,
    entities::{Event, Logistics, Participant},
    persist::{EventStore, LogisticsStore, ParticipantStore},
    service::EventService,
    types::Role,
};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("date")
}

fn seeded(events: u64, items_per_event: u32) -> EventService<MemoryStore> {
    let mut store = MemoryStore::new();
    let organizer = store
        .save_participant(Participant::new("Tounsi", "Ahmed", Role::Organizer))
        .expect("participant");
    for i in 0..events {
        let day = base() + Days::new(i % 365);
        let mut event = Event::new(format!("event {i}"), day, day);
        event.participants.extend(organizer.id);
        let event = store.save_event(event).expect("event");
        for j in 0..items_per_event {
            let mut item = Logistics::new(format!("item {j}"), 10.0, j + 1, j % 2 == 0);
            item.event = event.id;
            store.save_logistics(item).expect("logistics");
        }
    }
    EventService::new(store)
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_costs");
    for events in [100u64, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(events), &events, |b, &events| {
            let mut service = seeded(events, 8);
            b.iter(|| service.recompute_costs().expect("recompute"));
        });
    }
    group.finish();
}

fn bench_logistics_between(c: &mut Criterion) {
    let service = seeded(5_000, 4);
    c.bench_function("logistics_between_one_month", |b| {
        b.iter(|| {
            service
                .logistics_between(base(), base() + Days::new(30))
                .expect("query")
        });
    });
}

criterion_group!(benches, bench_recompute, bench_logistics_between);
criterion_main!(benches);
