// src/scheduler.rs
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::approval::ApprovalScope;
use crate::dashboard::{DashboardError, DashboardService};
use crate::snapshot;
use crate::store::InMemoryTimeEntryStore;

/// Where approvals made by the job get written back to.
#[derive(Clone)]
pub struct SnapshotTarget {
    pub store: InMemoryTimeEntryStore,
    pub path: PathBuf,
}

/// Global auto-approval pass, the periodic counterpart of the approval that
/// runs inside every dashboard request.
#[derive(Clone)]
pub struct AutoApproveJob {
    dashboard: DashboardService,
    snapshot: Option<SnapshotTarget>,
}

impl AutoApproveJob {
    pub fn new(dashboard: DashboardService, snapshot: Option<SnapshotTarget>) -> Self {
        Self {
            dashboard,
            snapshot,
        }
    }

    /// Approves across all users and saves the snapshot if anything changed.
    pub async fn run_once(&self) -> Result<usize, DashboardError> {
        let updated = self.dashboard.auto_approve(ApprovalScope::Global).await?;
        if updated > 0 {
            if let Some(target) = &self.snapshot {
                snapshot::save_store(&target.store, &target.path).await?;
            }
        }
        info!("Auto-approved {} work hours entries", updated);
        Ok(updated)
    }

    /// Runs forever, once per `period`, starting immediately.
    pub async fn run_every(self, period: Duration) {
        info!(
            "Starting scheduled auto-approval every {} seconds",
            period.as_secs()
        );
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                error!("Scheduled auto-approval failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::counters::PlaceholderCounters;
    use crate::time_entry::{EntryStatus, TimeEntry};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn complete(id: u64, user: &str, date: &str) -> TimeEntry {
        TimeEntry::new(id, user, d(date), dec!(8.0))
            .login(d(date).and_hms_opt(8, 0, 0).unwrap())
            .logout(d(date).and_hms_opt(16, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn run_once_approves_every_users_eligible_entries() {
        let store = InMemoryTimeEntryStore::from_entries(vec![
            complete(1, "alice", "2025-06-10"),
            complete(2, "bob", "2025-06-11"),
            complete(3, "bob", "2025-06-12"),
        ])
        .unwrap();
        let clock = TestClock::new("2025-06-11 03:00:00");
        let dashboard = DashboardService::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            Arc::new(PlaceholderCounters),
        );
        let job = AutoApproveJob::new(dashboard, None);

        assert_eq!(job.run_once().await.unwrap(), 2);
        assert_eq!(store.get(3).await.unwrap().status(), EntryStatus::Pending);

        // The future entry becomes eligible once its day arrives.
        clock.advance(chrono::Duration::days(1));
        assert_eq!(job.run_once().await.unwrap(), 1);
        assert_eq!(store.get(3).await.unwrap().status(), EntryStatus::Approved);
    }
}
