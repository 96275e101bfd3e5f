pub mod errors;
pub mod models;
pub mod sqlite;

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use log::debug;
use crate::manager_history::errors::HistoryError;
use crate::manager_history::models::{HistoryCandidate, HistoryEntry};

/// Number of entries returned by a history listing unless configured otherwise
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Source of the `searched_at` timestamp given to new entries
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Recency ordered record of location lookups.
///
/// Implementations hand out strictly increasing ids that are never reused, not even
/// after `clear`, and stamp each entry with the current time themselves.
pub trait HistoryStore: Send {
    /// Validates and stores a lookup, returning the stored entry
    ///
    /// # Arguments
    ///
    /// * 'candidate' - the lookup to record
    fn add(&mut self, candidate: HistoryCandidate) -> Result<HistoryEntry, HistoryError>;

    /// Returns at most `limit` entries, most recent `searched_at` first and the
    /// highest id first among equal timestamps
    ///
    /// # Arguments
    ///
    /// * 'limit' - maximum number of entries to return
    fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Removes all entries
    fn clear(&mut self) -> Result<(), HistoryError>;
}

/// History kept in process memory only, gone when the process exits
pub struct MemoryHistory {
    entries: BTreeMap<u64, HistoryEntry>,
    next_id: u64,
    max_entries: Option<usize>,
    clock: Clock,
}

impl MemoryHistory {
    /// Creates an empty in-memory history
    ///
    /// # Arguments
    ///
    /// * 'max_entries' - if given, the oldest entries are evicted to stay within this count
    pub fn new(max_entries: Option<usize>) -> Self {
        Self::with_clock(max_entries, Box::new(Utc::now))
    }

    /// Creates an empty in-memory history that takes timestamps from the given clock
    ///
    /// # Arguments
    ///
    /// * 'max_entries' - if given, the oldest entries are evicted to stay within this count
    /// * 'clock' - source of `searched_at` for new entries
    pub fn with_clock(max_entries: Option<usize>, clock: Clock) -> Self {
        MemoryHistory {
            entries: BTreeMap::new(),
            next_id: 1,
            max_entries,
            clock,
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self.entries
            .values()
            .min_by(|a, b| a.searched_at.cmp(&b.searched_at).then(a.id.cmp(&b.id)))
            .map(|e| e.id);

        if let Some(id) = oldest {
            debug!("evicting history entry {}", id);
            self.entries.remove(&id);
        }
    }
}

impl HistoryStore for MemoryHistory {
    fn add(&mut self, candidate: HistoryCandidate) -> Result<HistoryEntry, HistoryError> {
        let new_entry = candidate.validate()?;

        let id = self.next_id;
        self.next_id += 1;

        let entry = new_entry.into_entry(id, (self.clock)());
        self.entries.insert(id, entry.clone());

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                self.evict_oldest();
            }
        }

        Ok(entry)
    }

    fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries: Vec<HistoryEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.searched_at.cmp(&a.searched_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit);

        Ok(entries)
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        Ok(())
    }
}
