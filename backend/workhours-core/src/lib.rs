// src/lib.rs
pub mod api;
pub mod approval;
pub mod auth;
pub mod clock;
pub mod config;
pub mod counters;
pub mod dashboard;
pub mod error;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod time_entry;


pub use approval::{ApprovalScope, AutoApprover};
pub use clock::{Clock, SystemClock, TestClock};
pub use dashboard::{DashboardError, DashboardService, DashboardSummary};
pub use store::{EntryTransaction, InMemoryTimeEntryStore, StoreError, TimeEntryStore};
pub use time_entry::{EntryId, EntryStatus, TimeEntry, UserId};
