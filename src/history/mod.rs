//! Download history journal
//!
//! A small JSON array of [`DownloadRecord`]s on disk, oldest first, capped at
//! [`HISTORY_CAPACITY`] entries. Every operation is a full read followed by a full
//! rewrite. The store assumes a single writer; concurrent writers from several
//! processes can lose updates.

use crate::config::HISTORY_CAPACITY;
use crate::error::Result;
use crate::types::DownloadRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Persistent, capped history of download attempts
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl HistoryStore {
    /// Create a store backed by the journal at `path`, holding up to 50 records
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, HISTORY_CAPACITY)
    }

    /// Create a store with a custom record limit
    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
        }
    }

    /// Journal location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum number of records kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read all records in insertion order
    ///
    /// A missing or unreadable journal yields an empty list. Entries that do not
    /// parse into a record are skipped, as are repeats of an id already seen.
    pub fn load(&self) -> Vec<DownloadRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Cannot read history journal"
                );
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "History journal is not a JSON array"
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::with_capacity(entries.len());
        let mut records = Vec::with_capacity(entries.len());
        let mut skipped = 0usize;
        for entry in entries {
            match serde_json::from_value::<DownloadRecord>(entry) {
                Ok(record) if seen.insert(record.id.clone()) => records.push(record),
                Ok(record) => {
                    tracing::debug!(id = %record.id, "Skipping duplicate history id");
                    skipped += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed history entry");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            tracing::info!(skipped, kept = records.len(), "Loaded history with skipped entries");
        }

        records
    }

    /// Persist the newest records, swallowing write failures
    ///
    /// Failures are logged but never reported; use [`HistoryStore::try_save`] when
    /// the caller needs to know.
    pub fn save(&self, records: &[DownloadRecord]) {
        if let Err(e) = self.try_save(records) {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to write history journal"
            );
        }
    }

    /// Persist the newest records, reporting write failures
    ///
    /// Only the last `capacity` records are written. The journal is replaced via a
    /// sibling temp file so a crash mid-write leaves the previous journal intact.
    pub fn try_save(&self, records: &[DownloadRecord]) -> Result<()> {
        let start = records.len().saturating_sub(self.capacity);
        let json = serde_json::to_string_pretty(&records[start..])?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Append a record, evicting the oldest beyond capacity
    ///
    /// A stored record with the same id is replaced so ids stay unique.
    pub fn add(&self, record: DownloadRecord) {
        if let Err(e) = self.try_add(record) {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to write history journal"
            );
        }
    }

    /// Append a record like [`HistoryStore::add`], reporting write failures
    pub fn try_add(&self, record: DownloadRecord) -> Result<()> {
        let mut records = self.load();
        records.retain(|r| r.id != record.id);
        tracing::debug!(id = %record.id, title = %record.title, "Adding history record");
        records.push(record);
        self.try_save(&records)
    }

    /// Remove the record with `id`
    ///
    /// Returns whether a record was removed; an unknown id leaves the journal untouched.
    pub fn delete(&self, id: &str) -> bool {
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            tracing::debug!(id, "History record not found, nothing to delete");
            return false;
        }
        self.save(&records);
        true
    }

    /// Look up a single record
    pub fn find(&self, id: &str) -> Option<DownloadRecord> {
        self.load().into_iter().find(|r| r.id == id)
    }
}
