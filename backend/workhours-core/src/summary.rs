// src/summary.rs
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::store::{DateRange, EntryTransaction, StoreError};
use crate::time_entry::EntryStatus;

/// Approved-only hour totals for one user, already rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoursSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub hours_today: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub hours_this_week: Decimal,
    pub has_pending_hours: bool,
}

/// The Monday to Sunday week containing `day`.
pub fn week_containing(day: NaiveDate) -> DateRange {
    let from_monday = u64::from(day.weekday().num_days_from_monday());
    // Saturating at the calendar edges keeps the range well-formed.
    let monday = day.checked_sub_days(Days::new(from_monday)).unwrap_or(day);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    DateRange::new(monday, sunday)
}

/// One decimal place, halves rounded away from zero.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryCalculator;

impl SummaryCalculator {
    pub fn summarize(
        &self,
        tx: &(dyn EntryTransaction + '_),
        user_id: &str,
        today: NaiveDate,
    ) -> Result<HoursSummary, StoreError> {
        let hours_today = self.approved_hours(tx, user_id, DateRange::single(today))?;
        let hours_this_week = self.approved_hours(tx, user_id, week_containing(today))?;
        let has_pending_hours = tx.has_entries_with_status(user_id, EntryStatus::Pending)?;

        Ok(HoursSummary {
            hours_today: round_hours(hours_today),
            hours_this_week: round_hours(hours_this_week),
            has_pending_hours,
        })
    }

    /// Unrounded sum of `total_hours` over approved entries in `range`.
    pub fn approved_hours(
        &self,
        tx: &(dyn EntryTransaction + '_),
        user_id: &str,
        range: DateRange,
    ) -> Result<Decimal, StoreError> {
        Ok(tx
            .entries_with_status(user_id, EntryStatus::Approved, range)?
            .iter()
            .map(|entry| entry.total_hours)
            .sum())
    }
}
