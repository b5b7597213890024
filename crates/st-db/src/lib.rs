//! Storage layer for the swim results tracker.
//!
//! Provides persistence for rosters, results, records, settings, and the
//! audit log using `rusqlite`, plus the audited write orchestration
//! ([`writer`]) and reactive read subscriptions ([`live`]).
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared without external synchronization. Live queries take an
//! `Arc<Mutex<Database>>` for exactly this reason.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Row timestamps are stored as TEXT in RFC 3339 format with millisecond
//! precision (e.g., `2026-02-14T10:30:00.000Z`), so lexicographic ordering
//! matches chronological ordering. Calendar dates (seasons, records) are
//! stored as `YYYY-MM-DD` TEXT.
//!
//! ## JSON Columns
//!
//! Ordered collections that never need indexing - result splits, relay
//! legs, record holders, audit snapshots - are stored as JSON TEXT and
//! round-tripped through the domain types' serde impls.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};
use thiserror::Error;

use st_core::event_def::EventDef;
use st_core::record::TeamRecord;
use st_core::result::{IndividualResult, RelayResult};
use st_core::roster::{Meet, Season, Swimmer};
use st_core::settings::{AppConfig, Setting, SettingKey};
use st_core::types::{EventDefId, MeetId, SeasonId};

pub mod live;
mod writer;

pub use live::{Change, ChangeStream, LiveQueryHandle, Table, spawn_live_query};
pub use writer::{LeadOffOutcome, LeadOffPolicy, RelayWriteOutcome};

use live::ChangeNotifier;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {entity_id}: {timestamp}")]
    TimestampParse {
        entity_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Failed to parse a stored JSON column.
    #[error("invalid JSON payload for {entity_id}")]
    Payload {
        entity_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value failed domain validation.
    #[error("invalid stored value for {entity_id}: {message}")]
    InvalidStored { entity_id: String, message: String },
}

impl DbError {
    fn invalid(entity_id: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InvalidStored {
            entity_id: entity_id.into(),
            message: err.to_string(),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    changes: ChangeNotifier,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn,
            changes: ChangeNotifier::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            changes: ChangeNotifier::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS seasons (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_seasons_active ON seasons(active);

            CREATE TABLE IF NOT EXISTS swimmers (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                grad_year INTEGER,
                grp TEXT,
                active INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_swimmers_last_name ON swimmers(last_name);
            CREATE INDEX IF NOT EXISTS idx_swimmers_active ON swimmers(active);

            CREATE TABLE IF NOT EXISTS meets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                location TEXT,
                course TEXT NOT NULL,
                season_id TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_meets_season ON meets(season_id);
            CREATE INDEX IF NOT EXISTS idx_meets_date ON meets(date);

            CREATE TABLE IF NOT EXISTS event_defs (
                id TEXT PRIMARY KEY,
                distance_yards INTEGER NOT NULL,
                stroke TEXT NOT NULL,
                is_relay INTEGER NOT NULL,
                label TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_event_defs_stroke ON event_defs(stroke);
            CREATE INDEX IF NOT EXISTS idx_event_defs_is_relay ON event_defs(is_relay);

            -- splits_ms: JSON array of millisecond integers
            CREATE TABLE IF NOT EXISTS individual_results (
                id TEXT PRIMARY KEY,
                swimmer_id TEXT NOT NULL,
                meet_id TEXT NOT NULL,
                event_def_id TEXT NOT NULL,
                heat INTEGER,
                lane INTEGER,
                time_ms INTEGER NOT NULL,
                splits_ms TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_swimmer ON individual_results(swimmer_id);
            CREATE INDEX IF NOT EXISTS idx_results_event ON individual_results(event_def_id);
            CREATE INDEX IF NOT EXISTS idx_results_meet ON individual_results(meet_id);
            CREATE INDEX IF NOT EXISTS idx_results_status ON individual_results(status);
            CREATE INDEX IF NOT EXISTS idx_results_time ON individual_results(time_ms);

            -- legs: JSON array of {order, swimmerId, splitMs}
            CREATE TABLE IF NOT EXISTS relay_results (
                id TEXT PRIMARY KEY,
                meet_id TEXT NOT NULL,
                event_def_id TEXT NOT NULL,
                team_label TEXT NOT NULL,
                time_ms INTEGER NOT NULL,
                status TEXT NOT NULL,
                notes TEXT,
                legs TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_relays_event ON relay_results(event_def_id);
            CREATE INDEX IF NOT EXISTS idx_relays_meet ON relay_results(meet_id);
            CREATE INDEX IF NOT EXISTS idx_relays_team ON relay_results(team_label);
            CREATE INDEX IF NOT EXISTS idx_relays_time ON relay_results(time_ms);

            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                event_def_id TEXT NOT NULL,
                is_relay INTEGER NOT NULL,
                holder_swimmer_ids TEXT NOT NULL DEFAULT '[]',
                time_ms INTEGER NOT NULL,
                meet_id TEXT,
                date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_event ON records(event_def_id);
            CREATE INDEX IF NOT EXISTS idx_records_is_relay ON records(is_relay);

            -- One row per known setting key; value is JSON
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Append-only; payload is a full JSON snapshot of the entity
            CREATE TABLE IF NOT EXISTS audit_log (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                action TEXT NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_entity_type ON audit_log(entity_type);
            CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_log(entity_id);
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            ",
        )?;
        Ok(())
    }

    /// Subscribes to change notifications for committed writes.
    ///
    /// Dropping the returned stream unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> ChangeStream {
        self.changes.subscribe()
    }

    pub(crate) const fn notifier(&self) -> &ChangeNotifier {
        &self.changes
    }

    // ----- seasons -----

    /// Inserts or replaces a season.
    pub fn put_season(&mut self, season: &Season) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO seasons (id, name, start_date, end_date, active)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                active = excluded.active
            ",
            params![
                season.id.as_str(),
                season.name,
                season.start_date.to_string(),
                season.end_date.to_string(),
                season.active,
            ],
        )?;
        self.changes.publish(Table::Seasons);
        Ok(())
    }

    /// Lists seasons ordered by start date, newest first.
    pub fn list_seasons(&self) -> Result<Vec<Season>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, start_date, end_date, active FROM seasons ORDER BY start_date DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
            ))
        })?;
        let mut seasons = Vec::new();
        for row in rows {
            let (id, name, start_date, end_date, active) = row?;
            seasons.push(Season {
                id: SeasonId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
                name,
                start_date: parse_date(&start_date, &id)?,
                end_date: parse_date(&end_date, &id)?,
                active,
            });
        }
        Ok(seasons)
    }

    // ----- swimmers -----

    /// Inserts or replaces a swimmer.
    pub fn put_swimmer(&mut self, swimmer: &Swimmer) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO swimmers (id, first_name, last_name, grad_year, grp, active)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                grad_year = excluded.grad_year,
                grp = excluded.grp,
                active = excluded.active
            ",
            params![
                swimmer.id.as_str(),
                swimmer.first_name,
                swimmer.last_name,
                swimmer.grad_year,
                swimmer.group,
                swimmer.active,
            ],
        )?;
        self.changes.publish(Table::Swimmers);
        Ok(())
    }

    /// Lists swimmers ordered by last name then first name.
    pub fn list_swimmers(&self) -> Result<Vec<Swimmer>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, first_name, last_name, grad_year, grp, active
            FROM swimmers
            ORDER BY last_name ASC, first_name ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<u16>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })?;
        let mut swimmers = Vec::new();
        for row in rows {
            let (id, first_name, last_name, grad_year, group, active) = row?;
            swimmers.push(Swimmer {
                id: st_core::types::SwimmerId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
                first_name,
                last_name,
                grad_year,
                group,
                active,
            });
        }
        Ok(swimmers)
    }

    // ----- meets -----

    /// Inserts or replaces a meet.
    pub fn put_meet(&mut self, meet: &Meet) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO meets (id, name, date, location, course, season_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                date = excluded.date,
                location = excluded.location,
                course = excluded.course,
                season_id = excluded.season_id
            ",
            params![
                meet.id.as_str(),
                meet.name,
                format_timestamp(meet.date),
                meet.location,
                meet.course.as_str(),
                meet.season_id.as_str(),
            ],
        )?;
        self.changes.publish(Table::Meets);
        Ok(())
    }

    /// Lists meets ordered by date, newest first.
    pub fn list_meets(&self) -> Result<Vec<Meet>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, date, location, course, season_id
            FROM meets
            ORDER BY date DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut meets = Vec::new();
        for row in rows {
            let (id, name, date, location, course, season_id) = row?;
            meets.push(Meet {
                id: MeetId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
                name,
                date: parse_timestamp(&date, &id)?,
                location,
                course: st_core::types::Course::from_str(&course)
                    .map_err(|e| DbError::invalid(&id, e))?,
                season_id: SeasonId::new(season_id).map_err(|e| DbError::invalid(&id, e))?,
            });
        }
        Ok(meets)
    }

    /// Builds the meet→season lookup used by season-best queries.
    pub fn meet_season_lookup(&self) -> Result<HashMap<MeetId, SeasonId>, DbError> {
        let mut stmt = self.conn.prepare("SELECT id, season_id FROM meets")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut lookup = HashMap::new();
        for row in rows {
            let (meet_id, season_id) = row?;
            lookup.insert(
                MeetId::new(&meet_id).map_err(|e| DbError::invalid(&meet_id, e))?,
                SeasonId::new(&season_id).map_err(|e| DbError::invalid(&meet_id, e))?,
            );
        }
        Ok(lookup)
    }

    // ----- event definitions -----

    /// Inserts or replaces an event definition.
    ///
    /// Definitions referenced by results are treated as immutable by
    /// convention; replacement is for catalog setup only.
    pub fn put_event_def(&mut self, event: &EventDef) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO event_defs (id, distance_yards, stroke, is_relay, label)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                distance_yards = excluded.distance_yards,
                stroke = excluded.stroke,
                is_relay = excluded.is_relay,
                label = excluded.label
            ",
            params![
                event.id.as_str(),
                event.distance_yards,
                event.stroke.as_str(),
                event.is_relay,
                event.label,
            ],
        )?;
        self.changes.publish(Table::EventDefs);
        Ok(())
    }

    /// Lists all event definitions ordered by ID.
    pub fn list_event_defs(&self) -> Result<Vec<EventDef>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, distance_yards, stroke, is_relay, label FROM event_defs ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], map_event_def_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(convert_event_def(row?)?);
        }
        Ok(events)
    }

    /// Fetches one event definition by ID.
    pub fn get_event_def(&self, id: &EventDefId) -> Result<Option<EventDef>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, distance_yards, stroke, is_relay, label FROM event_defs WHERE id = ?",
        )?;
        let mut rows = stmt.query_map([id.as_str()], map_event_def_row)?;
        rows.next().transpose()?.map(convert_event_def).transpose()
    }

    // ----- results (reads; writes live in `writer`) -----

    /// Lists all individual results ordered by creation time then ID.
    pub fn list_individual_results(&self) -> Result<Vec<IndividualResult>, DbError> {
        self.query_individual_results(
            "
            SELECT id, swimmer_id, meet_id, event_def_id, heat, lane,
                   time_ms, splits_ms, status, notes, created_at, updated_at
            FROM individual_results
            ORDER BY created_at ASC, id ASC
            ",
            params![],
        )
    }

    /// Lists one swimmer's individual results.
    pub fn list_results_for_swimmer(
        &self,
        swimmer_id: &st_core::types::SwimmerId,
    ) -> Result<Vec<IndividualResult>, DbError> {
        self.query_individual_results(
            "
            SELECT id, swimmer_id, meet_id, event_def_id, heat, lane,
                   time_ms, splits_ms, status, notes, created_at, updated_at
            FROM individual_results
            WHERE swimmer_id = ?
            ORDER BY created_at ASC, id ASC
            ",
            params![swimmer_id.as_str()],
        )
    }

    fn query_individual_results(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<IndividualResult>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_result_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(convert_result(row?)?);
        }
        Ok(results)
    }

    /// Lists all relay results ordered by creation time then ID.
    pub fn list_relay_results(&self) -> Result<Vec<RelayResult>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, meet_id, event_def_id, team_label, time_ms, status,
                   notes, legs, created_at, updated_at
            FROM relay_results
            ORDER BY created_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], map_relay_row)?;
        let mut relays = Vec::new();
        for row in rows {
            relays.push(convert_relay(row?)?);
        }
        Ok(relays)
    }

    // ----- records -----

    /// Inserts or replaces a team record.
    ///
    /// Records change only through explicit user action; the writer never
    /// touches them.
    pub fn put_record(&mut self, record: &TeamRecord) -> Result<(), DbError> {
        let holders = serde_json::to_string(&record.holder_swimmer_ids)
            .map_err(|source| DbError::Payload {
                entity_id: record.id.to_string(),
                source,
            })?;
        self.conn.execute(
            "
            INSERT INTO records (id, event_def_id, is_relay, holder_swimmer_ids, time_ms, meet_id, date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                event_def_id = excluded.event_def_id,
                is_relay = excluded.is_relay,
                holder_swimmer_ids = excluded.holder_swimmer_ids,
                time_ms = excluded.time_ms,
                meet_id = excluded.meet_id,
                date = excluded.date
            ",
            params![
                record.id.as_str(),
                record.event_def_id.as_str(),
                record.is_relay,
                holders,
                record.time_ms.millis(),
                record.meet_id.as_ref().map(st_core::types::MeetId::as_str),
                record.date.to_string(),
            ],
        )?;
        self.changes.publish(Table::Records);
        Ok(())
    }

    /// Lists team records ordered by event.
    pub fn list_records(&self) -> Result<Vec<TeamRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, event_def_id, is_relay, holder_swimmer_ids, time_ms, meet_id, date
            FROM records
            ORDER BY event_def_id ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, event_def_id, is_relay, holders, time_ms, meet_id, date) = row?;
            records.push(TeamRecord {
                id: st_core::types::RecordId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
                event_def_id: EventDefId::new(event_def_id)
                    .map_err(|e| DbError::invalid(&id, e))?,
                is_relay,
                holder_swimmer_ids: serde_json::from_str(&holders).map_err(|source| {
                    DbError::Payload {
                        entity_id: id.clone(),
                        source,
                    }
                })?,
                time_ms: st_core::types::TimeMs::new(time_ms)
                    .map_err(|e| DbError::invalid(&id, e))?,
                meet_id: meet_id
                    .map(MeetId::new)
                    .transpose()
                    .map_err(|e| DbError::invalid(&id, e))?,
                date: parse_date(&date, &id)?,
            });
        }
        Ok(records)
    }

    // ----- settings -----

    /// Stores one setting, replacing any previous value for its key.
    pub fn put_setting(&mut self, setting: &Setting) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![setting.key().as_str(), setting.to_stored().to_string()],
        )?;
        self.changes.publish(Table::Settings);
        Ok(())
    }

    /// Lists all stored settings.
    ///
    /// Rows with unknown keys or mismatched value types fail the read;
    /// the settings table only ever holds the closed key set.
    pub fn list_settings(&self) -> Result<Vec<Setting>, DbError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings ORDER BY key ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut settings = Vec::new();
        for row in rows {
            let (key, value) = row?;
            let parsed_key =
                SettingKey::from_str(&key).map_err(|e| DbError::invalid(&key, e))?;
            let json: serde_json::Value =
                serde_json::from_str(&value).map_err(|source| DbError::Payload {
                    entity_id: key.clone(),
                    source,
                })?;
            settings.push(
                Setting::from_stored(parsed_key, &json).map_err(|source| DbError::Payload {
                    entity_id: key.clone(),
                    source,
                })?,
            );
        }
        Ok(settings)
    }

    /// Resolves the current settings into a configuration snapshot.
    pub fn app_config(&self) -> Result<AppConfig, DbError> {
        Ok(AppConfig::from_settings(&self.list_settings()?))
    }

    // ----- audit log (reads; writes live in `writer`) -----

    /// Lists audit entries for one entity, oldest first.
    pub fn list_audit_entries_for(
        &self,
        entity_id: &str,
    ) -> Result<Vec<st_core::audit::AuditEntry>, DbError> {
        self.query_audit_entries(
            "
            SELECT id, entity_type, entity_id, timestamp, action, payload
            FROM audit_log
            WHERE entity_id = ?
            ORDER BY rowid ASC
            ",
            params![entity_id],
        )
    }

    /// Lists the full audit log, oldest first.
    pub fn list_audit_entries(&self) -> Result<Vec<st_core::audit::AuditEntry>, DbError> {
        self.query_audit_entries(
            "
            SELECT id, entity_type, entity_id, timestamp, action, payload
            FROM audit_log
            ORDER BY rowid ASC
            ",
            params![],
        )
    }

    fn query_audit_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<st_core::audit::AuditEntry>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (id, entity_type, entity_id, timestamp, action, payload) = row?;
            entries.push(st_core::audit::AuditEntry {
                id: st_core::types::AuditId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
                entity_type: entity_type
                    .parse()
                    .map_err(|e| DbError::invalid(&id, e))?,
                entity_id,
                timestamp: parse_timestamp(&timestamp, &id)?,
                action: match action.as_str() {
                    "create" => st_core::audit::AuditAction::Create,
                    "update" => st_core::audit::AuditAction::Update,
                    other => return Err(DbError::invalid(&id, format!("bad action {other}"))),
                },
                payload: serde_json::from_str(&payload).map_err(|source| DbError::Payload {
                    entity_id: id.clone(),
                    source,
                })?,
            });
        }
        Ok(entries)
    }
}

// ----- row mapping helpers -----

type EventDefRow = (String, u32, String, bool, String);

fn map_event_def_row(row: &Row<'_>) -> rusqlite::Result<EventDefRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn convert_event_def(row: EventDefRow) -> Result<EventDef, DbError> {
    let (id, distance_yards, stroke, is_relay, label) = row;
    Ok(EventDef {
        id: EventDefId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
        distance_yards,
        stroke: stroke.parse().map_err(|e| DbError::invalid(&id, e))?,
        is_relay,
        label,
    })
}

struct ResultRow {
    id: String,
    swimmer_id: String,
    meet_id: String,
    event_def_id: String,
    heat: Option<u32>,
    lane: Option<u32>,
    time_ms: i64,
    splits_ms: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

fn map_result_row(row: &Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok(ResultRow {
        id: row.get(0)?,
        swimmer_id: row.get(1)?,
        meet_id: row.get(2)?,
        event_def_id: row.get(3)?,
        heat: row.get(4)?,
        lane: row.get(5)?,
        time_ms: row.get(6)?,
        splits_ms: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn convert_result(row: ResultRow) -> Result<IndividualResult, DbError> {
    let id = row.id;
    Ok(IndividualResult {
        id: st_core::types::ResultId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
        swimmer_id: st_core::types::SwimmerId::new(row.swimmer_id)
            .map_err(|e| DbError::invalid(&id, e))?,
        meet_id: MeetId::new(row.meet_id).map_err(|e| DbError::invalid(&id, e))?,
        event_def_id: EventDefId::new(row.event_def_id).map_err(|e| DbError::invalid(&id, e))?,
        heat: row.heat,
        lane: row.lane,
        time_ms: st_core::types::TimeMs::new(row.time_ms).map_err(|e| DbError::invalid(&id, e))?,
        splits_ms: serde_json::from_str(&row.splits_ms).map_err(|source| DbError::Payload {
            entity_id: id.clone(),
            source,
        })?,
        status: row.status.parse().map_err(|e| DbError::invalid(&id, e))?,
        notes: row.notes,
        created_at: parse_timestamp(&row.created_at, &id)?,
        updated_at: parse_timestamp(&row.updated_at, &id)?,
    })
}

struct RelayRow {
    id: String,
    meet_id: String,
    event_def_id: String,
    team_label: String,
    time_ms: i64,
    status: String,
    notes: Option<String>,
    legs: String,
    created_at: String,
    updated_at: String,
}

fn map_relay_row(row: &Row<'_>) -> rusqlite::Result<RelayRow> {
    Ok(RelayRow {
        id: row.get(0)?,
        meet_id: row.get(1)?,
        event_def_id: row.get(2)?,
        team_label: row.get(3)?,
        time_ms: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        legs: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn convert_relay(row: RelayRow) -> Result<RelayResult, DbError> {
    let id = row.id;
    Ok(RelayResult {
        id: st_core::types::RelayId::new(&id).map_err(|e| DbError::invalid(&id, e))?,
        meet_id: MeetId::new(row.meet_id).map_err(|e| DbError::invalid(&id, e))?,
        event_def_id: EventDefId::new(row.event_def_id).map_err(|e| DbError::invalid(&id, e))?,
        team_label: row.team_label,
        time_ms: st_core::types::TimeMs::new(row.time_ms).map_err(|e| DbError::invalid(&id, e))?,
        status: row.status.parse().map_err(|e| DbError::invalid(&id, e))?,
        notes: row.notes,
        legs: serde_json::from_str(&row.legs).map_err(|source| DbError::Payload {
            entity_id: id.clone(),
            source,
        })?,
        created_at: parse_timestamp(&row.created_at, &id)?,
        updated_at: parse_timestamp(&row.updated_at, &id)?,
    })
}

fn parse_timestamp(timestamp: &str, entity_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entity_id: entity_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_date(date: &str, entity_id: &str) -> Result<NaiveDate, DbError> {
    date.parse().map_err(|source| DbError::TimestampParse {
        entity_id: entity_id.to_string(),
        timestamp: date.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
