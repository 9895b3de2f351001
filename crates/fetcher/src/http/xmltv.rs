use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use epg_core::config::FeedFormat;
use tracing::debug;

use super::{build_client, decode_payload};
use crate::source::FeedSource;

pub const XML_BASE_URL: &str = "http://xmltv.xmltv.se";
pub const JSON_BASE_URL: &str = "http://json.xmltv.se";

pub fn base_url(format: FeedFormat) -> &'static str {
    match format {
        FeedFormat::Xmltv => XML_BASE_URL,
        FeedFormat::JsonTv => JSON_BASE_URL,
    }
}

/// `{base}/{feedId}_{YYYY-MM-DD}.{extension}`
pub fn feed_url(base: &str, feed_id: &str, date: NaiveDate, format: FeedFormat) -> String {
    format!(
        "{}/{}_{}.{}",
        base.trim_end_matches('/'),
        feed_id,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// xmltv.se listing files over HTTP.
pub struct XmltvClient {
    client: reqwest::Client,
    base_url: String,
    format: FeedFormat,
}

impl XmltvClient {
    pub fn new(format: FeedFormat) -> anyhow::Result<Self> {
        Ok(Self::with_base_url(
            build_client().context("failed to build HTTP client")?,
            base_url(format),
            format,
        ))
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str, format: FeedFormat) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            format,
        }
    }
}

#[async_trait]
impl FeedSource for XmltvClient {
    async fn fetch_day(&self, feed_id: &str, date: NaiveDate) -> anyhow::Result<Vec<u8>> {
        let url = feed_url(&self.base_url, feed_id, date, self.format);
        debug!(%url, "fetching feed");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("fetching {} failed: HTTP {}", url, status);
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;
        Ok(decode_payload(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_xml_feed_url() {
        let url = feed_url(base_url(FeedFormat::Xmltv), "nrk1.nrk.no", date(), FeedFormat::Xmltv);
        assert_eq!(url, "http://xmltv.xmltv.se/nrk1.nrk.no_2024-03-01.xml.gz");
    }

    #[test]
    fn test_json_feed_url() {
        let url = feed_url(base_url(FeedFormat::JsonTv), "tv2.no", date(), FeedFormat::JsonTv);
        assert_eq!(url, "http://json.xmltv.se/tv2.no_2024-03-01.js.gz");
    }

    #[test]
    fn test_feed_url_tolerates_trailing_slash() {
        let url = feed_url("http://localhost:8080/", "max.no", date(), FeedFormat::Xmltv);
        assert_eq!(url, "http://localhost:8080/max.no_2024-03-01.xml.gz");
    }

    #[test]
    fn test_client_uses_format_base_url() {
        let client = XmltvClient::new(FeedFormat::JsonTv).unwrap();
        assert_eq!(client.base_url, JSON_BASE_URL);
        assert_eq!(client.format, FeedFormat::JsonTv);
    }
}
