use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use log::debug;
use rusqlite::{params, Connection};
use crate::manager_history::{Clock, HistoryStore};
use crate::manager_history::errors::HistoryError;
use crate::manager_history::models::{HistoryCandidate, HistoryEntry};

/// History persisted in a SQLite database
pub struct SqliteHistory {
    db_conn: Connection,
    max_entries: Option<usize>,
    clock: Clock,
}

impl SqliteHistory {

    /// Creates a new instance of SqliteHistory
    ///
    /// # Arguments
    ///
    /// * 'db_path' - full path to db file, or `:memory:`
    /// * 'max_entries' - if given, the oldest entries are evicted to stay within this count
    pub fn new(db_path: &str, max_entries: Option<usize>) -> Result<Self, HistoryError> {
        Self::with_clock(db_path, max_entries, Box::new(Utc::now))
    }

    /// Creates a new instance of SqliteHistory that takes timestamps from the given clock
    ///
    /// # Arguments
    ///
    /// * 'db_path' - full path to db file, or `:memory:`
    /// * 'max_entries' - if given, the oldest entries are evicted to stay within this count
    /// * 'clock' - source of `searched_at` for new entries
    pub fn with_clock(db_path: &str, max_entries: Option<usize>, clock: Clock) -> Result<Self, HistoryError> {
        let db_conn = Connection::open(db_path)?;

        // autoincrement keeps ids from being handed out again after deletes
        db_conn.execute(
            "CREATE TABLE IF NOT EXISTS search_history (
                id integer primary key autoincrement,
                city_name text not null,
                country text null,
                lat text not null,
                lon text not null,
                temperature integer null,
                weather_condition text null,
                searched_at integer not null
            )",
            [],
        )?;

        Ok(SqliteHistory { db_conn, max_entries, clock })
    }
}

/// Deletes the oldest rows until at most `max` remain
///
/// # Arguments
///
/// * 'db_conn' - connection or open transaction to delete through
/// * 'max' - number of rows to keep
fn truncate_table(db_conn: &Connection, max: usize) -> Result<(), HistoryError> {
    let count: i64 = db_conn.query_row(
        "SELECT count(*) FROM search_history;",
        [],
        |row| row.get(0),
    )?;

    let excess = count - i64::try_from(max).unwrap_or(i64::MAX);
    if excess > 0 {
        debug!("evicting {} history rows", excess);
        db_conn.execute(
            "DELETE FROM search_history
                WHERE id IN (
                    SELECT id FROM search_history
                    ORDER BY searched_at ASC, id ASC
                    LIMIT ?1
                );",
            params![excess],
        )?;
    }

    Ok(())
}

impl HistoryStore for SqliteHistory {
    fn add(&mut self, candidate: HistoryCandidate) -> Result<HistoryEntry, HistoryError> {
        let new_entry = candidate.validate()?;

        // Stored with millisecond precision, so the returned entry has to match
        let searched_at = (self.clock)()
            .duration_trunc(TimeDelta::milliseconds(1))
            .map_err(|e| HistoryError::Storage(e.to_string()))?;

        // Insert and eviction commit together or not at all
        let tx = self.db_conn.transaction()?;
        tx.execute(
            "INSERT INTO search_history (city_name, country, lat, lon, temperature, weather_condition, searched_at)
                values (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new_entry.city_name,
                new_entry.country,
                new_entry.lat,
                new_entry.lon,
                new_entry.temperature,
                new_entry.weather_condition,
                searched_at.timestamp_millis(),
            ],
        )?;
        let id = tx.last_insert_rowid() as u64;

        if let Some(max) = self.max_entries {
            truncate_table(&tx, max)?;
        }
        tx.commit()?;

        Ok(new_entry.into_entry(id, searched_at))
    }

    fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut result: Vec<HistoryEntry> = Vec::new();

        let mut stmt = self.db_conn.prepare(
            "SELECT id, city_name, country, lat, lon, temperature, weather_condition, searched_at
                FROM search_history
                ORDER BY searched_at DESC, id DESC
                LIMIT ?1;",
        )?;
        let mut rows = stmt.query(params![i64::try_from(limit).unwrap_or(i64::MAX)])?;

        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let millis: i64 = row.get(7)?;
            let searched_at = DateTime::from_timestamp_millis(millis)
                .ok_or(rusqlite::Error::IntegralValueOutOfRange(7, millis))?;

            result.push(HistoryEntry {
                id: id as u64,
                city_name: row.get(1)?,
                country: row.get(2)?,
                lat: row.get(3)?,
                lon: row.get(4)?,
                temperature: row.get(5)?,
                weather_condition: row.get(6)?,
                searched_at,
            });
        }

        Ok(result)
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.db_conn.execute("DELETE FROM search_history;", [])?;
        Ok(())
    }
}
