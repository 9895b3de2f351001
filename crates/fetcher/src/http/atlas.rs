use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use epg_core::normalize::atlas::{AtlasChannel, ChannelGroupsResponse};
use reqwest::Url;
use tracing::debug;

use super::build_client;
use crate::source::{ScheduleRequest, ScheduleSource};

pub const BASE_URL: &str = "http://atlas.metabroadcast.com/3.0";
pub const SCHEDULE_ANNOTATIONS: &str = "description,broadcasts,brand_summary";

/// Midnight at the start of `date`, in the form the schedule endpoint expects.
pub fn window_boundary(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

pub struct AtlasClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AtlasClient {
    pub fn new(api_key: &str) -> anyhow::Result<Self> {
        Ok(Self::with_base_url(
            build_client().context("failed to build HTTP client")?,
            BASE_URL,
            api_key,
        ))
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn channel_group_url(&self, group_id: &str) -> anyhow::Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/channel_groups/{}.json", self.base_url, group_id),
            &[("annotations", "channels"), ("apiKey", self.api_key.as_str())],
        )?;
        Ok(url)
    }

    pub fn schedule_url(&self, request: &ScheduleRequest) -> anyhow::Result<Url> {
        let from = window_boundary(request.from);
        let to = window_boundary(request.to);
        let url = Url::parse_with_params(
            &format!("{}/schedule.json", self.base_url),
            &[
                ("channel_id", request.channel_id.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("annotations", SCHEDULE_ANNOTATIONS),
                ("apiKey", self.api_key.as_str()),
                ("publisher", request.publisher),
            ],
        )?;
        Ok(url)
    }

    /// The query carries the API key, so only the path is logged and
    /// transport errors have their URL stripped.
    async fn get_bytes(&self, url: Url) -> anyhow::Result<Vec<u8>> {
        let path = url.path().to_string();
        debug!(%path, "atlas request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed to fetch {}", path))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("fetching {} failed: HTTP {}", path, status);
        }

        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed to read body of {}", path))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ScheduleSource for AtlasClient {
    async fn channel_group(&self, group_id: &str) -> anyhow::Result<Vec<AtlasChannel>> {
        let body = self.get_bytes(self.channel_group_url(group_id)?).await?;
        let response: ChannelGroupsResponse =
            serde_json::from_slice(&body).context("invalid channel group response")?;
        Ok(response.into_channels())
    }

    async fn schedule(&self, request: &ScheduleRequest) -> anyhow::Result<Vec<u8>> {
        self.get_bytes(self.schedule_url(request)?).await
    }
}
