use async_trait::async_trait;
use chrono::NaiveDate;
use epg_core::normalize::atlas::AtlasChannel;

/// Per-day listing files, one per feed identifier.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Decoded payload for one feed and day.
    async fn fetch_day(&self, feed_id: &str, date: NaiveDate) -> anyhow::Result<Vec<u8>>;
}

/// Parameters of one schedule window request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub channel_id: String,
    pub from: NaiveDate,
    /// Exclusive.
    pub to: NaiveDate,
    pub publisher: &'static str,
}

/// Channel-group and schedule-window API.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn channel_group(&self, group_id: &str) -> anyhow::Result<Vec<AtlasChannel>>;

    /// Raw schedule response body for one channel and window.
    async fn schedule(&self, request: &ScheduleRequest) -> anyhow::Result<Vec<u8>>;
}
