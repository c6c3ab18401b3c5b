//! SQLite-backed implementation of the store traits.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use crate::{
    entities::{Event, Logistics, Participant},
    types::{EventId, ParticipantId, Role},
};

use super::{EventStore, LogisticsStore, ParticipantStore, StoreError, StoreResult};

/// SQLite implementation of [`crate::persist::Store`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a SQLite-backed store at `path`.
    ///
    /// Enables WAL mode, foreign keys, and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Looks up one event by identity.
    pub fn event(&self, id: EventId) -> StoreResult<Option<Event>> {
        load_event(&self.conn, id)
    }

    fn events_where<P: Params>(&self, sql: &str, params: P) -> StoreResult<Vec<Event>> {
        let ids = select_ids(&self.conn, sql, params)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(event) = load_event(&self.conn, id)? {
                out.push(event);
            }
        }
        Ok(out)
    }
}

impl ParticipantStore for SqliteStore {
    fn save_participant(&mut self, participant: Participant) -> StoreResult<Participant> {
        let requested = explicit_id("participant", participant.id)?;
        self.conn.execute(
            "INSERT INTO participants(id, last_name, first_name, role) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                last_name = excluded.last_name,
                first_name = excluded.first_name,
                role = excluded.role",
            params![
                requested,
                participant.last_name,
                participant.first_name,
                participant.role.as_str(),
            ],
        )?;
        let id = participant
            .id
            .unwrap_or_else(|| self.conn.last_insert_rowid() as ParticipantId);

        load_participant(&self.conn, id)?.ok_or(StoreError::Missing {
            kind: "participant",
            id,
        })
    }

    fn find_participant(&self, id: ParticipantId) -> StoreResult<Option<Participant>> {
        load_participant(&self.conn, id)
    }

    fn find_participants_by_role(&self, role: Role) -> StoreResult<Vec<Participant>> {
        let ids = select_ids(
            &self.conn,
            "SELECT id FROM participants WHERE role = ?1 ORDER BY id ASC",
            params![role.as_str()],
        )?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(participant) = load_participant(&self.conn, id)? {
                out.push(participant);
            }
        }
        Ok(out)
    }
}

impl EventStore for SqliteStore {
    fn save_event(&mut self, event: Event) -> StoreResult<Event> {
        let requested = explicit_id("event", event.id)?;
        let tx = self.conn.transaction()?;

        let owner: Option<i64> = tx
            .query_row(
                "SELECT id FROM events WHERE description = ?1",
                params![event.description],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(owner) = owner {
            if Some(owner as EventId) != event.id {
                return Err(StoreError::DuplicateDescription(event.description));
            }
        }

        for participant_id in &event.participants {
            if !row_exists(&tx, "participants", *participant_id)? {
                return Err(StoreError::Missing {
                    kind: "participant",
                    id: *participant_id,
                });
            }
        }

        tx.execute(
            "INSERT INTO events(id, description, start_date, end_date, cost) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                cost = excluded.cost",
            params![
                requested,
                event.description,
                day_number(event.start_date),
                day_number(event.end_date),
                event.cost,
            ],
        )?;
        let id = event
            .id
            .unwrap_or_else(|| tx.last_insert_rowid() as EventId);

        tx.execute(
            "DELETE FROM event_participants WHERE event_id = ?1",
            params![id as i64],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_participants(event_id, participant_id) VALUES (?1, ?2)",
            )?;
            for participant_id in &event.participants {
                stmt.execute(params![id as i64, *participant_id as i64])?;
            }
        }
        tx.commit()?;

        load_event(&self.conn, id)?.ok_or(StoreError::Missing { kind: "event", id })
    }

    fn find_event_by_description(&self, description: &str) -> StoreResult<Option<Event>> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM events WHERE description = ?1",
                params![description],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(id) => load_event(&self.conn, id as EventId),
            None => Ok(None),
        }
    }

    fn find_events_by_start_date_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Event>> {
        self.events_where(
            "SELECT id FROM events WHERE start_date BETWEEN ?1 AND ?2 ORDER BY start_date ASC, id ASC",
            params![day_number(start), day_number(end)],
        )
    }

    fn find_events_by_participant(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> StoreResult<Vec<Event>> {
        self.events_where(
            "SELECT DISTINCT e.id FROM events e
             JOIN event_participants ep ON ep.event_id = e.id
             JOIN participants p ON p.id = ep.participant_id
             WHERE p.last_name = ?1 AND p.first_name = ?2 AND p.role = ?3
             ORDER BY e.id ASC",
            params![last_name, first_name, role.as_str()],
        )
    }
}

impl LogisticsStore for SqliteStore {
    fn save_logistics(&mut self, mut logistics: Logistics) -> StoreResult<Logistics> {
        let requested = explicit_id("logistics", logistics.id)?;
        if let Some(event_id) = logistics.event {
            if !row_exists(&self.conn, "events", event_id)? {
                return Err(StoreError::Missing {
                    kind: "event",
                    id: event_id,
                });
            }
        }

        self.conn.execute(
            "INSERT INTO logistics(id, description, unit_price, quantity, reserved, event_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                unit_price = excluded.unit_price,
                quantity = excluded.quantity,
                reserved = excluded.reserved,
                event_id = excluded.event_id",
            params![
                requested,
                logistics.description,
                logistics.unit_price,
                logistics.quantity,
                logistics.reserved,
                logistics.event.map(|v| v as i64),
            ],
        )?;
        if logistics.id.is_none() {
            logistics.id = Some(self.conn.last_insert_rowid() as u64);
        }
        Ok(logistics)
    }
}

fn explicit_id(kind: &'static str, id: Option<u64>) -> StoreResult<Option<i64>> {
    id.map(|id| i64::try_from(id).map_err(|_| StoreError::IdOutOfRange { kind, id }))
        .transpose()
}

// Day numbers keep `BETWEEN` ordered for every year chrono accepts, unlike `%F` text.
fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn date_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let days: i32 = row.get(idx)?;
    NaiveDate::from_num_days_from_ce_opt(days).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("day number {days} is not a valid date").into(),
        )
    })
}

fn row_exists(conn: &Connection, table: &'static str, id: u64) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn select_ids<P: Params>(conn: &Connection, sql: &str, params: P) -> StoreResult<Vec<u64>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row? as u64);
    }
    Ok(out)
}

fn load_participant(conn: &Connection, id: ParticipantId) -> StoreResult<Option<Participant>> {
    let participant = conn
        .query_row(
            "SELECT id, last_name, first_name, role FROM participants WHERE id = ?1",
            params![id as i64],
            |row| {
                let role: String = row.get(3)?;
                let role = role.parse::<Role>().map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(err),
                    )
                })?;
                Ok(Participant {
                    id: Some(row.get::<_, i64>(0)? as ParticipantId),
                    last_name: row.get(1)?,
                    first_name: row.get(2)?,
                    role,
                    events: Default::default(),
                })
            },
        )
        .optional()?;

    let Some(mut participant) = participant else {
        return Ok(None);
    };
    participant.events = select_ids(
        conn,
        "SELECT event_id FROM event_participants WHERE participant_id = ?1 ORDER BY event_id ASC",
        params![id as i64],
    )?
    .into_iter()
    .collect();
    Ok(Some(participant))
}

fn load_event(conn: &Connection, id: EventId) -> StoreResult<Option<Event>> {
    let event = conn
        .query_row(
            "SELECT id, description, start_date, end_date, cost FROM events WHERE id = ?1",
            params![id as i64],
            |row| {
                Ok(Event {
                    id: Some(row.get::<_, i64>(0)? as EventId),
                    description: row.get(1)?,
                    start_date: date_from_row(row, 2)?,
                    end_date: date_from_row(row, 3)?,
                    cost: row.get(4)?,
                    participants: Default::default(),
                    logistics: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut event) = event else {
        return Ok(None);
    };

    event.participants = select_ids(
        conn,
        "SELECT participant_id FROM event_participants WHERE event_id = ?1 ORDER BY participant_id ASC",
        params![id as i64],
    )?
    .into_iter()
    .collect();

    let mut stmt = conn.prepare(
        "SELECT id, description, unit_price, quantity, reserved, event_id
         FROM logistics WHERE event_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![id as i64], logistics_from_row)?;
    for row in rows {
        event.logistics.push(row?);
    }
    Ok(Some(event))
}

fn logistics_from_row(row: &Row<'_>) -> rusqlite::Result<Logistics> {
    Ok(Logistics {
        id: Some(row.get::<_, i64>(0)? as u64),
        description: row.get(1)?,
        unit_price: row.get(2)?,
        quantity: row.get(3)?,
        reserved: row.get(4)?,
        event: row.get::<_, Option<i64>>(5)?.map(|v| v as EventId),
    })
}
