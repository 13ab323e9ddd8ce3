//! Storage layer for TimeFlow.
//!
//! Persists the session queue, the archived history and the presets using
//! `rusqlite`. The engines in `tf-core` never see this layer; they receive
//! the loaded values.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Move it between threads freely, but share it only behind a `Mutex`.
//!
//! # Schema
//!
//! - `tasks`: the queue; `position` is the execution order.
//! - `history`: archived sessions; insertion order (`rowid`) is archive order.
//! - `presets`: session templates, seeded with the defaults on first open.
//!
//! Instants are stored as TEXT in RFC 3339 with milliseconds
//! (e.g. `2024-01-15T10:30:00.000Z`). History dates and times are stored
//! verbatim, exactly as the record carries them.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use thiserror::Error;

use tf_core::{HistoryId, HistoryItem, Minutes, Preset, PresetId, Task, TaskId, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored task anchor.
    #[error("invalid timestamp for task {task_id}: {timestamp}")]
    TimestampParse {
        task_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates a domain invariant.
    #[error("invalid stored {table} row {id}")]
    InvalidRow {
        table: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },
    /// No history record with this ID.
    #[error("history record not found: {0}")]
    HistoryNotFound(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Raw `tasks` row before validation.
struct TaskRow {
    id: String,
    name: String,
    duration: u32,
    color: String,
    accent: Option<String>,
    icon: Option<String>,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, DbError> {
        let invalid = |id: &str, source| DbError::InvalidRow {
            table: "tasks",
            id: id.to_string(),
            source,
        };
        let id = TaskId::new(self.id.clone()).map_err(|e| invalid(&self.id, e))?;
        let duration = Minutes::new(self.duration).map_err(|e| invalid(&self.id, e))?;
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        Ok(Task {
            id,
            name: self.name,
            duration,
            color: self.color,
            accent: self.accent,
            icon: self.icon,
            created_at,
        })
    }
}

/// Raw `history` row before validation.
struct HistoryRow {
    id: String,
    date: String,
    start_time: String,
    end_time: String,
    name: String,
    note: String,
    color: String,
    accent: Option<String>,
}

impl HistoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            name: row.get(4)?,
            note: row.get(5)?,
            color: row.get(6)?,
            accent: row.get(7)?,
        })
    }

    fn into_item(self) -> Result<HistoryItem, DbError> {
        let id = HistoryId::new(self.id.clone()).map_err(|source| DbError::InvalidRow {
            table: "history",
            id: self.id,
            source,
        })?;
        Ok(HistoryItem {
            id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            name: self.name,
            note: self.note,
            color: self.color,
            accent: self.accent,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema and seeds default presets.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                duration INTEGER NOT NULL,
                color TEXT NOT NULL DEFAULT '',
                accent TEXT,
                icon TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position);

            -- date: calendar key as written (e.g. '2024-01-15' or '2024/1/15')
            -- start_time/end_time: 'HH:mm'
            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                name TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                color TEXT NOT NULL DEFAULT '',
                accent TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_history_date ON history(date);

            CREATE TABLE IF NOT EXISTS presets (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                duration INTEGER NOT NULL,
                color TEXT NOT NULL,
                accent TEXT NOT NULL,
                icon TEXT NOT NULL,
                is_essential INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;

        let preset_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM presets", [], |row| row.get(0))?;
        if preset_count == 0 {
            let tx = self.conn.transaction()?;
            for (position, preset) in tf_core::default_presets().iter().enumerate() {
                insert_preset(&tx, position, preset)?;
            }
            tx.commit()?;
            tracing::debug!("seeded default presets");
        }
        Ok(())
    }

    /// Loads the queue in execution order.
    pub fn load_queue(&self) -> Result<Vec<Task>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, duration, color, accent, icon, created_at
            FROM tasks
            ORDER BY position ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TaskRow {
                id: row.get(0)?,
                name: row.get(1)?,
                duration: row.get(2)?,
                color: row.get(3)?,
                accent: row.get(4)?,
                icon: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    /// Replaces the stored queue with `tasks`.
    pub fn save_queue(&mut self, tasks: &[Task]) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        replace_queue(&tx, tasks)?;
        tx.commit()?;
        Ok(())
    }

    /// Stores the queue left after an archive together with the new record.
    ///
    /// Both writes happen in one transaction.
    pub fn archive(&mut self, remaining: &[Task], record: &HistoryItem) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        replace_queue(&tx, remaining)?;
        insert_history(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// Lists history, most recently archived first.
    pub fn list_history(&self) -> Result<Vec<HistoryItem>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, start_time, end_time, name, note, color, accent
            FROM history
            ORDER BY rowid DESC
            ",
        )?;
        let rows = stmt.query_map([], HistoryRow::from_row)?;
        let mut history = Vec::new();
        for row in rows {
            history.push(row?.into_item()?);
        }
        Ok(history)
    }

    /// Fetches one history record.
    pub fn get_history(&self, id: &HistoryId) -> Result<Option<HistoryItem>, DbError> {
        self.conn
            .query_row(
                "
                SELECT id, date, start_time, end_time, name, note, color, accent
                FROM history
                WHERE id = ?
                ",
                [id.as_str()],
                HistoryRow::from_row,
            )
            .optional()?
            .map(HistoryRow::into_item)
            .transpose()
    }

    /// Inserts a history record.
    pub fn insert_history(&mut self, record: &HistoryItem) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        insert_history(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// Saves a user edit of a record's times and note.
    pub fn update_history(&mut self, record: &HistoryItem) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "
            UPDATE history
            SET start_time = ?, end_time = ?, note = ?
            WHERE id = ?
            ",
            params![
                record.start_time,
                record.end_time,
                record.note,
                record.id.as_str()
            ],
        )?;
        if updated == 0 {
            return Err(DbError::HistoryNotFound(record.id.to_string()));
        }
        Ok(())
    }

    /// Lists presets in display order.
    pub fn list_presets(&self) -> Result<Vec<Preset>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, duration, color, accent, icon, is_essential
            FROM presets
            ORDER BY position ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, bool>(6)?,
            ))
        })?;
        let mut presets = Vec::new();
        for row in rows {
            let (id, name, duration, color, accent, icon, is_essential) = row?;
            let invalid = |source| DbError::InvalidRow {
                table: "presets",
                id: id.clone(),
                source,
            };
            presets.push(Preset {
                id: PresetId::new(id.clone()).map_err(invalid)?,
                name,
                duration: Minutes::new(duration).map_err(invalid)?,
                color,
                accent,
                icon,
                is_essential,
            });
        }
        Ok(presets)
    }
}

fn replace_queue(tx: &Transaction<'_>, tasks: &[Task]) -> Result<(), DbError> {
    tx.execute("DELETE FROM tasks", [])?;
    let mut stmt = tx.prepare(
        "
        INSERT INTO tasks (id, position, name, duration, color, accent, icon, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )?;
    for (position, task) in tasks.iter().enumerate() {
        stmt.execute(params![
            task.id.as_str(),
            position_value(position),
            task.name,
            task.duration.get(),
            task.color,
            task.accent,
            task.icon,
            format_timestamp(task.created_at),
        ])?;
    }
    Ok(())
}

fn insert_history(tx: &Transaction<'_>, record: &HistoryItem) -> Result<(), DbError> {
    tx.execute(
        "
        INSERT INTO history (id, date, start_time, end_time, name, note, color, accent)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            record.id.as_str(),
            record.date,
            record.start_time,
            record.end_time,
            record.name,
            record.note,
            record.color,
            record.accent,
        ],
    )?;
    Ok(())
}

fn insert_preset(tx: &Transaction<'_>, position: usize, preset: &Preset) -> Result<(), DbError> {
    tx.execute(
        "
        INSERT INTO presets (id, position, name, duration, color, accent, icon, is_essential)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            preset.id.as_str(),
            position_value(position),
            preset.name,
            preset.duration.get(),
            preset.color,
            preset.accent,
            preset.icon,
            preset.is_essential,
        ],
    )?;
    Ok(())
}

fn position_value(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

fn parse_timestamp(timestamp: &str, task_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            task_id: task_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
