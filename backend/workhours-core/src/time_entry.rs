// src/time_entry.rs
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type EntryId = u64;
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entry status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for EntryStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "approved" => Ok(EntryStatus::Approved),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One user's time record for one calendar date.
///
/// The status is only readable from outside the crate. New entries always
/// start out pending; the auto-approval rule is the only thing that moves
/// them to approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub login_time: Option<NaiveDateTime>,
    pub logout_time: Option<NaiveDateTime>,
    /// Credited duration as delivered by the entry pipeline. Not recomputed
    /// from the login/logout pair.
    pub total_hours: Decimal,
    status: EntryStatus,
}

impl TimeEntry {
    pub fn new(id: EntryId, user_id: &str, date: NaiveDate, total_hours: Decimal) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            date,
            login_time: None,
            logout_time: None,
            total_hours,
            status: EntryStatus::Pending,
        }
    }

    pub fn login(mut self, at: NaiveDateTime) -> Self {
        self.login_time = Some(at);
        self
    }

    pub fn logout(mut self, at: NaiveDateTime) -> Self {
        self.logout_time = Some(at);
        self
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    pub fn is_complete(&self) -> bool {
        self.login_time.is_some() && self.logout_time.is_some()
    }

    /// Pending, both timestamps present, and not dated in the future.
    pub fn is_eligible_for_auto_approval(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.is_complete() && self.date <= today
    }

    /// Returns `true` if the entry moved from pending to approved.
    pub(crate) fn approve(&mut self) -> bool {
        if self.is_pending() {
            self.status = EntryStatus::Approved;
            true
        } else {
            false
        }
    }

    /// Rebuilds a stored row, status included. Only persistence code and
    /// tests get to state an approved status directly.
    pub(crate) fn restore(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }
}
