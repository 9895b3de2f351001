//! Atlas (metabroadcast) channel group and schedule responses.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::retain_well_ordered;
use crate::error::NormalizeError;
use crate::types::{ChannelDescriptor, Programme};

/// Publishers whose schedules are trusted, most preferred first.
pub const PREFERRED_PUBLISHERS: &[&str] = &["bbc.co.uk", "pressassociation.com"];

pub const DEFAULT_PUBLISHER: &str = "bbc.co.uk";

const TRANSMISSION_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelGroupsResponse {
    #[serde(default)]
    pub channel_groups: Vec<ChannelGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelGroup {
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

/// Group members wrap their channel in a `channel` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntry {
    pub channel: AtlasChannel,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AtlasChannel {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub available_from: Vec<Availability>,
}

impl AtlasChannel {
    pub fn descriptor(&self) -> ChannelDescriptor {
        ChannelDescriptor::new(&self.id, &self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Availability {
    pub key: String,
}

impl ChannelGroupsResponse {
    /// Channels of the first group, in response order.
    pub fn into_channels(self) -> Vec<AtlasChannel> {
        self.channel_groups
            .into_iter()
            .next()
            .map(|group| group.channels.into_iter().map(|entry| entry.channel).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub schedule: Vec<ChannelSchedule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSchedule {
    #[serde(default)]
    pub items: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub container: Option<Container>,
    #[serde(default)]
    pub broadcasts: Vec<Broadcast>,
}

/// Series or brand an item belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Broadcast {
    pub transmission_time: String,
    pub transmission_end_time: String,
}

impl ScheduleItem {
    /// The container title when it has one, otherwise the item's own title.
    pub fn resolved_title(&self) -> Option<&str> {
        self.container
            .as_ref()
            .and_then(|c| c.title.as_deref())
            .filter(|t| !t.trim().is_empty())
            .or(self.title.as_deref())
    }
}

/// Parses a schedule response body. `None` when the body holds no schedule.
pub fn parse_schedule(payload: &[u8]) -> Result<Option<ChannelSchedule>, NormalizeError> {
    let response: ScheduleResponse = serde_json::from_slice(payload)?;
    Ok(response.schedule.into_iter().next())
}

/// One record per broadcast of every item.
pub fn normalize_schedule(
    schedule: &ChannelSchedule,
    channel: &str,
) -> Result<Vec<Programme>, NormalizeError> {
    let mut programmes = Vec::new();
    for item in &schedule.items {
        let title = item
            .resolved_title()
            .ok_or(NormalizeError::MissingField("title"))?;
        let description = item.description.as_deref().unwrap_or_default();

        for broadcast in &item.broadcasts {
            programmes.push(Programme::new(
                channel,
                parse_transmission_time(&broadcast.transmission_time)?,
                parse_transmission_time(&broadcast.transmission_end_time)?,
                title,
                description,
            ));
        }
    }

    Ok(retain_well_ordered(programmes))
}

/// Parses `2014-12-11T23:35:00Z` as UTC.
pub fn parse_transmission_time(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    NaiveDateTime::parse_from_str(raw, TRANSMISSION_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|_| NormalizeError::Timestamp(raw.to_string()))
}

/// First preferred publisher the channel is available from.
pub fn find_publisher(available_from: &[Availability]) -> Option<&'static str> {
    PREFERRED_PUBLISHERS
        .iter()
        .copied()
        .find(|publisher| available_from.iter().any(|a| a.key == *publisher))
}

/// Like [`find_publisher`], falling back to [`DEFAULT_PUBLISHER`] with a warning.
pub fn select_publisher(channel: &AtlasChannel) -> &'static str {
    find_publisher(&channel.available_from).unwrap_or_else(|| {
        warn!(
            channel = %channel.title,
            default = DEFAULT_PUBLISHER,
            "no recognized publisher for channel, using default"
        );
        DEFAULT_PUBLISHER
    })
}
