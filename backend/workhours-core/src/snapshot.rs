// src/snapshot.rs
//! CSV snapshots of the time entry store.
//!
//! Layout: `id,user_id,date,login_time,logout_time,total_hours,status`, one
//! row per entry. Missing timestamps are empty cells.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::info;

use crate::store::{InMemoryTimeEntryStore, StoreError};
use crate::time_entry::{EntryId, EntryStatus, TimeEntry, UnknownStatus};

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    id: EntryId,
    user_id: String,
    date: NaiveDate,
    login_time: Option<NaiveDateTime>,
    logout_time: Option<NaiveDateTime>,
    #[serde(with = "rust_decimal::serde::str")]
    total_hours: Decimal,
    status: String,
}

impl From<&TimeEntry> for EntryRecord {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id.clone(),
            date: entry.date,
            login_time: entry.login_time,
            logout_time: entry.logout_time,
            total_hours: entry.total_hours,
            status: entry.status().as_str().to_string(),
        }
    }
}

impl EntryRecord {
    fn into_entry(self, row: u64) -> Result<TimeEntry, StoreError> {
        let status: EntryStatus = self
            .status
            .parse()
            .map_err(|e: UnknownStatus| StoreError::InvalidRecord {
                row,
                reason: e.to_string(),
            })?;
        let mut entry = TimeEntry::new(self.id, &self.user_id, self.date, self.total_hours);
        entry.login_time = self.login_time;
        entry.logout_time = self.logout_time;
        Ok(entry.restore(status))
    }
}

pub fn read_entries<R: io::Read>(reader: R) -> Result<Vec<TimeEntry>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();
    for (index, record) in csv_reader.deserialize::<EntryRecord>().enumerate() {
        entries.push(record?.into_entry(index as u64 + 1)?);
    }
    Ok(entries)
}

pub fn write_entries<W: io::Write>(writer: W, entries: &[TimeEntry]) -> Result<(), StoreError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(EntryRecord::from(entry))?;
    }
    csv_writer.flush().map_err(|source| StoreError::Io {
        source,
        context: "flushing CSV snapshot".to_string(),
    })?;
    Ok(())
}

pub fn load_store(path: &Path) -> Result<InMemoryTimeEntryStore, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        source,
        context: format!("opening {}", path.display()),
    })?;
    let entries = read_entries(file)?;
    info!("Loaded {} time entries from {}", entries.len(), path.display());
    InMemoryTimeEntryStore::from_entries(entries)
}

/// Writes the whole store to `path`, going through a sibling temp file so a
/// crash never leaves a half-written snapshot behind.
pub async fn save_store(store: &InMemoryTimeEntryStore, path: &Path) -> Result<(), StoreError> {
    let entries = store.snapshot().await;
    let tmp_path = path.with_extension("csv.tmp");
    let file = File::create(&tmp_path).map_err(|source| StoreError::Io {
        source,
        context: format!("creating {}", tmp_path.display()),
    })?;
    write_entries(file, &entries)?;
    fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
        source,
        context: format!("replacing {}", path.display()),
    })?;
    info!("Saved {} time entries to {}", entries.len(), path.display());
    Ok(())
}
