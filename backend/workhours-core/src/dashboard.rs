// src/dashboard.rs
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::approval::{ApprovalScope, AutoApprover};
use crate::clock::Clock;
use crate::counters::ActivityCounters;
use crate::store::{StoreError, TimeEntryStore};
use crate::summary::{HoursSummary, SummaryCalculator};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("could not load activity counters: {0}")]
    Counters(#[source] StoreError),
}

/// Payload of `GET /api/dashboard/summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub hours_today: rust_decimal::Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub hours_this_week: rust_decimal::Decimal,
    pub events_this_week: u32,
    pub leave_this_week: u32,
    pub has_pending_hours: bool,
}

impl DashboardSummary {
    fn new(hours: HoursSummary, events_this_week: u32, leave_this_week: u32) -> Self {
        Self {
            hours_today: hours.hours_today,
            hours_this_week: hours.hours_this_week,
            events_this_week,
            leave_this_week,
            has_pending_hours: hours.has_pending_hours,
        }
    }
}

/// Runs auto-approval and the hour totals against one store.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn TimeEntryStore>,
    clock: Arc<dyn Clock>,
    counters: Arc<dyn ActivityCounters>,
    approver: AutoApprover,
    calculator: SummaryCalculator,
}

impl DashboardService {
    pub fn new(
        store: Arc<dyn TimeEntryStore>,
        clock: Arc<dyn Clock>,
        counters: Arc<dyn ActivityCounters>,
    ) -> Self {
        Self {
            store,
            clock,
            counters,
            approver: AutoApprover,
            calculator: SummaryCalculator,
        }
    }

    /// Approves the user's eligible entries, then totals approved hours, in
    /// one transaction. The totals always observe the approvals made here.
    pub async fn summary_for(&self, user_id: &str) -> Result<DashboardSummary, DashboardError> {
        // Counters come from outside the store; fetch them first so a failure
        // there leaves no approvals behind.
        let events = self
            .counters
            .count_events_this_week(user_id)
            .await
            .map_err(DashboardError::Counters)?;
        let leave = self
            .counters
            .count_leave_this_week(user_id)
            .await
            .map_err(DashboardError::Counters)?;

        let today = self.clock.today();
        let mut tx = self.store.begin().await?;
        let approved = self.approver.run(
            tx.as_mut(),
            &ApprovalScope::User(user_id.to_string()),
            today,
        )?;
        let hours = self.calculator.summarize(tx.as_ref(), user_id, today)?;
        tx.commit()?;

        debug!(
            "Dashboard summary for user {} on {}: approved={}, today={}, week={}, pending={}",
            user_id, today, approved, hours.hours_today, hours.hours_this_week, hours.has_pending_hours
        );
        Ok(DashboardSummary::new(hours, events, leave))
    }

    /// One auto-approval pass over `scope`, committed on success.
    pub async fn auto_approve(&self, scope: ApprovalScope) -> Result<usize, DashboardError> {
        let today = self.clock.today();
        let mut tx = self.store.begin().await?;
        let updated = self.approver.run(tx.as_mut(), &scope, today)?;
        tx.commit()?;
        Ok(updated)
    }
}
