// src/counters.rs
use async_trait::async_trait;

use crate::store::StoreError;

/// Informational weekly counts owned by other systems (calendar, leave
/// registry). They are shown next to the hour totals but never feed into them.
#[async_trait]
pub trait ActivityCounters: Send + Sync {
    async fn count_events_this_week(&self, user_id: &str) -> Result<u32, StoreError>;
    async fn count_leave_this_week(&self, user_id: &str) -> Result<u32, StoreError>;
}

/// Reports zero for both counters until the owning systems are wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCounters;

#[async_trait]
impl ActivityCounters for PlaceholderCounters {
    async fn count_events_this_week(&self, _user_id: &str) -> Result<u32, StoreError> {
        Ok(0)
    }

    async fn count_leave_this_week(&self, _user_id: &str) -> Result<u32, StoreError> {
        Ok(0)
    }
}
