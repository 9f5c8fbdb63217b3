// src/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::approval::ApprovalScope;
use crate::time_entry::{EntryId, EntryStatus, TimeEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Time entry {0} already exists")]
    DuplicateEntry(EntryId),
    #[error("Time entry store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error ({context}): {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid time entry record at row {row}: {reason}")]
    InvalidRecord { row: u64, reason: String },
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Entry point to the persisted time entries. All reads and writes go
/// through a transaction so that an approve-then-sum sequence sees one
/// consistent state.
#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    async fn begin<'a>(&'a self) -> Result<Box<dyn EntryTransaction + 'a>, StoreError>;
}

/// A unit of work over the store. Writes are visible to the transaction's own
/// reads immediately and to everyone else after `commit`. Dropping the
/// transaction without committing discards them.
pub trait EntryTransaction: Send {
    /// Pending entries inside the scope, in any state of completeness.
    fn pending_entries(&self, scope: &ApprovalScope) -> Result<Vec<TimeEntry>, StoreError>;

    /// Moves the listed entries from pending to approved. Ids that are
    /// unknown or no longer pending are skipped. Returns the number of rows
    /// actually changed.
    fn mark_approved(&mut self, ids: &[EntryId]) -> Result<usize, StoreError>;

    fn entries_with_status(
        &self,
        user_id: &str,
        status: EntryStatus,
        range: DateRange,
    ) -> Result<Vec<TimeEntry>, StoreError>;

    fn has_entries_with_status(&self, user_id: &str, status: EntryStatus)
        -> Result<bool, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

type EntryMap = BTreeMap<EntryId, TimeEntry>;

#[derive(Clone, Default)]
pub struct InMemoryTimeEntryStore {
    entries: Arc<Mutex<EntryMap>>,
}

impl InMemoryTimeEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TimeEntry>) -> Result<Self, StoreError> {
        let mut map = EntryMap::new();
        for entry in entries {
            if map.contains_key(&entry.id) {
                return Err(StoreError::DuplicateEntry(entry.id));
            }
            map.insert(entry.id, entry);
        }
        Ok(Self {
            entries: Arc::new(Mutex::new(map)),
        })
    }

    /// Adds an entry delivered by the time-tracking pipeline.
    pub async fn insert(&self, entry: TimeEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&entry.id) {
            return Err(StoreError::DuplicateEntry(entry.id));
        }
        debug!(
            "Inserting time entry {} for user {} on {}",
            entry.id, entry.user_id, entry.date
        );
        entries.insert(entry.id, entry);
        Ok(())
    }

    pub async fn get(&self, id: EntryId) -> Option<TimeEntry> {
        self.entries.lock().await.get(&id).cloned()
    }

    pub async fn entries_for_user(&self, user_id: &str) -> Vec<TimeEntry> {
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// All entries ordered by id.
    pub async fn snapshot(&self) -> Vec<TimeEntry> {
        self.entries.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl TimeEntryStore for InMemoryTimeEntryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn EntryTransaction + 'a>, StoreError> {
        let guard = self.entries.lock().await;
        Ok(Box::new(InMemoryTransaction {
            entries: guard,
            staged_approvals: BTreeSet::new(),
        }))
    }
}

/// Holds the store lock for its whole lifetime, so transactions on the same
/// store run one after another.
struct InMemoryTransaction<'a> {
    entries: MutexGuard<'a, EntryMap>,
    staged_approvals: BTreeSet<EntryId>,
}

impl InMemoryTransaction<'_> {
    fn effective_status(&self, entry: &TimeEntry) -> EntryStatus {
        if self.staged_approvals.contains(&entry.id) {
            EntryStatus::Approved
        } else {
            entry.status()
        }
    }

    fn effective(&self, entry: &TimeEntry) -> TimeEntry {
        let status = self.effective_status(entry);
        entry.clone().restore(status)
    }
}

impl EntryTransaction for InMemoryTransaction<'_> {
    fn pending_entries(&self, scope: &ApprovalScope) -> Result<Vec<TimeEntry>, StoreError> {
        Ok(self
            .entries
            .values()
            .filter(|e| scope.includes(&e.user_id))
            .filter(|e| self.effective_status(e) == EntryStatus::Pending)
            .cloned()
            .collect())
    }

    fn mark_approved(&mut self, ids: &[EntryId]) -> Result<usize, StoreError> {
        let mut changed = 0;
        for id in ids {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            if self.effective_status(entry) == EntryStatus::Pending
                && self.staged_approvals.insert(*id)
            {
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn entries_with_status(
        &self,
        user_id: &str,
        status: EntryStatus,
        range: DateRange,
    ) -> Result<Vec<TimeEntry>, StoreError> {
        Ok(self
            .entries
            .values()
            .filter(|e| e.user_id == user_id && range.contains(e.date))
            .filter(|e| self.effective_status(e) == status)
            .map(|e| self.effective(e))
            .collect())
    }

    fn has_entries_with_status(
        &self,
        user_id: &str,
        status: EntryStatus,
    ) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .values()
            .any(|e| e.user_id == user_id && self.effective_status(e) == status))
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction {
            mut entries,
            staged_approvals,
        } = *self;
        for id in &staged_approvals {
            if let Some(entry) = entries.get_mut(id) {
                entry.approve();
            }
        }
        if !staged_approvals.is_empty() {
            debug!("Committed {} staged approvals", staged_approvals.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn wide_range() -> DateRange {
        DateRange::new(d("2000-01-01"), d("2100-01-01"))
    }

    async fn store_with_pending() -> InMemoryTimeEntryStore {
        let store = InMemoryTimeEntryStore::new();
        store
            .insert(TimeEntry::new(1, "alice", d("2025-06-10"), dec!(8.0)))
            .await
            .unwrap();
        store
            .insert(TimeEntry::new(2, "bob", d("2025-06-10"), dec!(6.0)))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = store_with_pending().await;
        let result = store
            .insert(TimeEntry::new(1, "carol", d("2025-06-11"), dec!(1.0)))
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateEntry(1))));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn staged_approvals_are_visible_inside_the_transaction() {
        let store = store_with_pending().await;
        let mut tx = store.begin().await.unwrap();

        assert_eq!(tx.mark_approved(&[1]).unwrap(), 1);
        let approved = tx
            .entries_with_status("alice", EntryStatus::Approved, wide_range())
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].status(), EntryStatus::Approved);
        assert!(!tx.has_entries_with_status("alice", EntryStatus::Pending).unwrap());

        tx.commit().unwrap();
        assert_eq!(store.get(1).await.unwrap().status(), EntryStatus::Approved);
        assert_eq!(store.get(2).await.unwrap().status(), EntryStatus::Pending);
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_store_untouched() {
        let store = store_with_pending().await;
        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(tx.mark_approved(&[1, 2]).unwrap(), 2);
        }

        assert!(store.snapshot().await.iter().all(|e| e.is_pending()));
    }

    #[tokio::test]
    async fn mark_approved_skips_unknown_and_already_approved() {
        let store = store_with_pending().await;
        let mut tx = store.begin().await.unwrap();

        assert_eq!(tx.mark_approved(&[1, 1, 99]).unwrap(), 1);
        assert_eq!(tx.mark_approved(&[1]).unwrap(), 0);
    }

    #[tokio::test]
    async fn pending_entries_respects_scope() {
        let store = store_with_pending().await;
        let tx = store.begin().await.unwrap();

        let alice = tx
            .pending_entries(&ApprovalScope::User("alice".to_string()))
            .unwrap();
        let everyone = tx.pending_entries(&ApprovalScope::Global).unwrap();

        assert_eq!(alice.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(everyone.len(), 2);
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(d("2025-06-09"), d("2025-06-15"));
        assert!(range.contains(d("2025-06-09")));
        assert!(range.contains(d("2025-06-15")));
        assert!(!range.contains(d("2025-06-16")));
        assert!(DateRange::single(d("2025-06-09")).contains(d("2025-06-09")));
    }
}
