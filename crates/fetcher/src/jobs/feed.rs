//! xmltv.se pipeline: per-day listing files for a static channel catalog.

use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use db::ProgrammeStore;
use epg_core::cache::ResponseCache;
use epg_core::catalog::Catalog;
use epg_core::config::{FeedFormat, Settings};
use epg_core::normalize::normalize_feed;
use epg_core::types::fetch_dates;
use epg_core::{ChannelDescriptor, ConfigError, FetchKey, Programme};
use tracing::info;

use super::{pause, store_channel, RunSummary};
use crate::source::FeedSource;

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub format: FeedFormat,
    pub dates: Vec<NaiveDate>,
    pub language: String,
    pub date_delay: Duration,
}

impl FeedOptions {
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Result<Self, ConfigError> {
        Ok(Self {
            format: settings.feed_format()?,
            dates: fetch_dates(today, settings.fetch_days),
            language: settings.language.clone(),
            date_delay: settings.date_delay,
        })
    }
}

/// Fetches every catalog channel for every date and replaces its stored
/// listings. Consecutive fetches are spaced by `date_delay`, across channel
/// boundaries too. The first fetch or parse failure aborts the run.
pub async fn run<S, W>(
    source: &S,
    store: &W,
    catalog: &Catalog,
    options: &FeedOptions,
) -> anyhow::Result<RunSummary>
where
    S: FeedSource + ?Sized,
    W: ProgrammeStore + ?Sized,
{
    let mut cache = ResponseCache::new();
    let mut summary = RunSummary::default();

    for (index, channel) in catalog.iter().enumerate() {
        if index > 0 {
            pause(options.date_delay).await;
        }
        info!(channel = %channel.display_name, days = options.dates.len(), "getting events");
        let programmes = collect_channel(source, &mut cache, channel, options).await?;
        store_channel(store, &channel.display_name, &programmes, &mut summary).await?;
    }

    info!(
        channels = summary.channels,
        programmes = summary.programmes,
        fetched = cache.len(),
        "feed run finished"
    );
    Ok(summary)
}

async fn collect_channel<S>(
    source: &S,
    cache: &mut ResponseCache<Vec<u8>>,
    channel: &ChannelDescriptor,
    options: &FeedOptions,
) -> anyhow::Result<Vec<Programme>>
where
    S: FeedSource + ?Sized,
{
    let mut programmes = Vec::new();

    for (index, &date) in options.dates.iter().enumerate() {
        if index > 0 {
            pause(options.date_delay).await;
        }

        let key = FetchKey::day(&channel.provider_id, date);
        let payload = cache
            .get_or_fetch(key, || source.fetch_day(&channel.provider_id, date))
            .await
            .with_context(|| format!("failed to fetch {} for {}", channel.provider_id, date))?;

        let parsed = normalize_feed(
            options.format,
            &payload,
            &channel.display_name,
            &options.language,
        )
        .with_context(|| format!("failed to parse {} for {}", channel.provider_id, date))?;
        programmes.extend(parsed);
    }

    Ok(programmes)
}
