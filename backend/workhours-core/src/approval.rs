// src/approval.rs
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::store::{EntryTransaction, StoreError};
use crate::time_entry::{EntryId, UserId};

/// Which entries an auto-approval pass looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalScope {
    /// One user's entries (dashboard summary request).
    User(UserId),
    /// Every user's entries (scheduled job).
    Global,
}

impl ApprovalScope {
    pub fn includes(&self, user_id: &str) -> bool {
        match self {
            ApprovalScope::User(id) => id == user_id,
            ApprovalScope::Global => true,
        }
    }
}

/// The single auto-approval rule shared by the dashboard request and the
/// scheduled job.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprover;

impl AutoApprover {
    /// Approves every pending, complete entry in `scope` dated on or before
    /// `today`. Writes go into `tx`; the caller decides when to commit.
    pub fn run(
        &self,
        tx: &mut (dyn EntryTransaction + '_),
        scope: &ApprovalScope,
        today: NaiveDate,
    ) -> Result<usize, StoreError> {
        let eligible: Vec<EntryId> = tx
            .pending_entries(scope)?
            .into_iter()
            .filter(|entry| entry.is_eligible_for_auto_approval(today))
            .map(|entry| entry.id)
            .collect();

        if eligible.is_empty() {
            debug!("No entries eligible for auto-approval ({:?})", scope);
            return Ok(0);
        }

        let updated = tx.mark_approved(&eligible)?;
        if updated > 0 {
            match scope {
                ApprovalScope::User(user_id) => info!(
                    "Auto-approved {} work hours entries for user {}",
                    updated, user_id
                ),
                // The scheduled job reports its own completion line.
                ApprovalScope::Global => debug!("Auto-approved {} work hours entries", updated),
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTimeEntryStore, TimeEntryStore};
    use crate::time_entry::{EntryStatus, TimeEntry};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn at(date_str: &str, hour: u32) -> NaiveDateTime {
        d(date_str).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn complete(id: EntryId, user: &str, date: &str) -> TimeEntry {
        TimeEntry::new(id, user, d(date), dec!(8.0))
            .login(at(date, 8))
            .logout(at(date, 16))
    }

    async fn approve_and_commit(
        store: &InMemoryTimeEntryStore,
        scope: ApprovalScope,
        today: NaiveDate,
    ) -> usize {
        let mut tx = store.begin().await.unwrap();
        let updated = AutoApprover.run(tx.as_mut(), &scope, today).unwrap();
        tx.commit().unwrap();
        updated
    }

    #[tokio::test]
    async fn approves_only_eligible_entries() {
        let today = d("2025-06-11");
        let store = InMemoryTimeEntryStore::from_entries(vec![
            complete(1, "alice", "2025-06-10"),
            complete(2, "alice", "2025-06-11"),
            complete(3, "alice", "2025-06-12"),
            TimeEntry::new(4, "alice", today, dec!(0)).login(at("2025-06-11", 8)),
            TimeEntry::new(5, "alice", today, dec!(0)).logout(at("2025-06-11", 16)),
            TimeEntry::new(6, "alice", today, dec!(0)),
        ])
        .unwrap();

        let updated = approve_and_commit(&store, ApprovalScope::User("alice".into()), today).await;

        assert_eq!(updated, 2);
        let statuses: Vec<(EntryId, EntryStatus)> = store
            .snapshot()
            .await
            .iter()
            .map(|e| (e.id, e.status()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (1, EntryStatus::Approved),
                (2, EntryStatus::Approved),
                (3, EntryStatus::Pending),
                (4, EntryStatus::Pending),
                (5, EntryStatus::Pending),
                (6, EntryStatus::Pending),
            ]
        );
    }

    #[tokio::test]
    async fn user_scope_leaves_other_users_alone() {
        let today = d("2025-06-11");
        let store = InMemoryTimeEntryStore::from_entries(vec![
            complete(1, "alice", "2025-06-10"),
            complete(2, "bob", "2025-06-10"),
        ])
        .unwrap();

        approve_and_commit(&store, ApprovalScope::User("alice".into()), today).await;

        assert_eq!(store.get(1).await.unwrap().status(), EntryStatus::Approved);
        assert_eq!(store.get(2).await.unwrap().status(), EntryStatus::Pending);
    }

    #[tokio::test]
    async fn global_scope_covers_every_user() {
        let today = d("2025-06-11");
        let store = InMemoryTimeEntryStore::from_entries(vec![
            complete(1, "alice", "2025-06-10"),
            complete(2, "bob", "2025-06-09"),
            complete(3, "carol", "2025-06-30"),
        ])
        .unwrap();

        let updated = approve_and_commit(&store, ApprovalScope::Global, today).await;

        assert_eq!(updated, 2);
        assert_eq!(store.get(3).await.unwrap().status(), EntryStatus::Pending);
    }

    #[tokio::test]
    async fn second_run_changes_nothing() {
        let today = d("2025-06-11");
        let store = InMemoryTimeEntryStore::from_entries(vec![
            complete(1, "alice", "2025-06-10"),
            complete(2, "alice", "2025-06-13"),
        ])
        .unwrap();

        let first = approve_and_commit(&store, ApprovalScope::Global, today).await;
        let after_first = store.snapshot().await;
        let second = approve_and_commit(&store, ApprovalScope::Global, today).await;

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(store.snapshot().await, after_first);
    }

    #[tokio::test]
    async fn no_matches_is_not_an_error() {
        let store = InMemoryTimeEntryStore::new();
        let updated = approve_and_commit(&store, ApprovalScope::Global, d("2025-06-11")).await;
        assert_eq!(updated, 0);
    }
}
