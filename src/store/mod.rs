//! Check-in history store
//!
//! SQLite-backed append-only log of check-ins. Entries are partitioned by
//! scope and read back ordered by time; there is no update or delete path.

pub mod models;

pub use models::{CheckEntry, NewCheckEntry, TimelineOrder, DEFAULT_SCOPE};

use std::path::Path;

use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::CheckinError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS checkins (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        scope TEXT NOT NULL,
        timestamp_ms INTEGER NOT NULL,
        user_text TEXT NOT NULL,
        sentiment_score REAL NOT NULL,
        intensity REAL NOT NULL,
        anomaly_flag INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_checkins_scope_time
        ON checkins (scope, timestamp_ms, seq);
";

const ENTRY_COLUMNS: &str =
    "id, scope, timestamp_ms, user_text, sentiment_score, intensity, anomaly_flag";

/// History store backed by a single SQLite connection
pub struct CheckinStore {
    db: Connection,
}

impl CheckinStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, CheckinError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(path)?;

        // Enable WAL mode for concurrent read access
        db.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::init(db)?;
        info!(path = %path.display(), "Check-in store initialized");
        Ok(store)
    }

    /// Volatile store, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self, CheckinError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self, CheckinError> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db })
    }

    /// Append a new entry, assigning its id and timestamp.
    pub fn append(&self, new: NewCheckEntry<'_>) -> Result<CheckEntry, CheckinError> {
        let id = uuid::Uuid::new_v4().to_string();
        let timestamp_ms = Utc::now().timestamp_millis();
        let timestamp = Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .ok_or_else(|| CheckinError::Internal(format!("invalid timestamp {}", timestamp_ms)))?;

        self.db.execute(
            "INSERT INTO checkins
                (id, scope, timestamp_ms, user_text, sentiment_score, intensity, anomaly_flag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                new.scope,
                timestamp_ms,
                new.user_text,
                new.sentiment_score,
                new.intensity,
                new.anomaly_flag
            ],
        )?;

        debug!(id = %id, scope = new.scope, "Appended check-in");

        Ok(CheckEntry {
            id,
            scope: new.scope.to_string(),
            timestamp,
            user_text: new.user_text.to_string(),
            sentiment_score: new.sentiment_score,
            intensity: new.intensity,
            anomaly_flag: new.anomaly_flag,
        })
    }

    /// Scores of the `window` most recent entries in `scope`.
    pub fn recent_scores(&self, scope: &str, window: usize) -> Result<Vec<f64>, CheckinError> {
        let mut stmt = self.db.prepare_cached(
            "SELECT sentiment_score FROM checkins
             WHERE scope = ?1
             ORDER BY timestamp_ms DESC, seq DESC
             LIMIT ?2",
        )?;

        let scores = stmt
            .query_map(params![scope, window as i64], |row| row.get::<_, f64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(scores)
    }

    /// Entries in `scope` ordered by time. `limit` applies after ordering.
    pub fn timeline(
        &self,
        scope: &str,
        order: TimelineOrder,
        limit: Option<usize>,
    ) -> Result<Vec<CheckEntry>, CheckinError> {
        let direction = match order {
            TimelineOrder::Asc => "ASC",
            TimelineOrder::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {columns} FROM checkins
             WHERE scope = ?1
             ORDER BY timestamp_ms {direction}, seq {direction}
             LIMIT ?2",
            columns = ENTRY_COLUMNS,
            direction = direction,
        );

        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = self.db.prepare_cached(&sql)?;
        let entries = stmt
            .query_map(params![scope, limit], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CheckEntry> {
    let timestamp_ms: i64 = row.get(2)?;
    let timestamp = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, timestamp_ms))?;

    Ok(CheckEntry {
        id: row.get(0)?,
        scope: row.get(1)?,
        timestamp,
        user_text: row.get(3)?,
        sentiment_score: row.get(4)?,
        intensity: row.get(5)?,
        anomaly_flag: row.get(6)?,
    })
}
