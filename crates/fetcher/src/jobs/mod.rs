use std::time::Duration;

use anyhow::Context;
use db::ProgrammeStore;
use epg_core::Programme;
use tracing::info;

pub mod feed;
pub mod schedule;

/// Totals of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Channels whose stored listings were replaced, including emptied ones.
    pub channels: usize,
    pub programmes: usize,
    /// Channels replaced with zero listings.
    pub empty_channels: usize,
    /// Channels left untouched because the provider had no schedule.
    pub skipped_channels: usize,
    /// The run stopped early on a missing schedule.
    pub halted: bool,
}

/// Replaces the stored listings of `channel` and logs the outcome.
pub(crate) async fn store_channel<W>(
    store: &W,
    channel: &str,
    programmes: &[Programme],
    summary: &mut RunSummary,
) -> anyhow::Result<()>
where
    W: ProgrammeStore + ?Sized,
{
    let outcome = store
        .replace_channel(channel, programmes)
        .await
        .with_context(|| format!("failed to store listings for {}", channel))?;

    summary.channels += 1;
    if programmes.is_empty() {
        summary.empty_channels += 1;
        info!(%channel, deleted = outcome.deleted, "no events, channel cleared");
    } else {
        summary.programmes += programmes.len();
        info!(%channel, inserted = outcome.inserted, deleted = outcome.deleted, "inserted events");
    }
    Ok(())
}

/// Politeness delay between upstream requests.
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
