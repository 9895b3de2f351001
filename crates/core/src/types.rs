use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A channel as known to one provider, paired with the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Feed identifier (`nrk1.nrk.no`) or the provider's internal channel id.
    pub provider_id: String,
    /// Value written to the `channel` column; rows are replaced by this key.
    pub display_name: String,
}

impl ChannelDescriptor {
    pub fn new(provider_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Identifies one unit of raw payload retrieval within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Day {
        channel: String,
        date: NaiveDate,
    },
    /// `to` is exclusive.
    Window {
        channel: String,
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl FetchKey {
    pub fn day(channel: impl Into<String>, date: NaiveDate) -> Self {
        FetchKey::Day {
            channel: channel.into(),
            date,
        }
    }

    pub fn window(channel: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        FetchKey::Window {
            channel: channel.into(),
            from,
            to,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            FetchKey::Day { channel, .. } | FetchKey::Window { channel, .. } => channel,
        }
    }
}

/// Provider-agnostic schedule entry, the unit persisted to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Programme {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub channel: String,
}

impl Programme {
    /// Builds a record with trimmed title and description.
    pub fn new(
        channel: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        title: &str,
        description: &str,
    ) -> Self {
        Self {
            start,
            stop,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            channel: channel.to_string(),
        }
    }

    pub fn is_well_ordered(&self) -> bool {
        self.start < self.stop
    }
}

/// The calendar days of a run, starting today.
pub fn fetch_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    today.iter_days().take(days as usize).collect()
}
