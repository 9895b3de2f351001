//! Atlas pipeline: one schedule window per allowed channel of a channel group.

use std::time::Duration;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use db::ProgrammeStore;
use epg_core::cache::ResponseCache;
use epg_core::catalog::{AllowList, FREEVIEW_GROUP};
use epg_core::config::{MissingSchedulePolicy, Settings};
use epg_core::normalize::atlas::{normalize_schedule, parse_schedule, select_publisher, AtlasChannel};
use epg_core::{ConfigError, FetchKey};
use tracing::{error, info, warn};

use super::{pause, store_channel, RunSummary};
use crate::source::{ScheduleRequest, ScheduleSource};

#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub group_id: String,
    pub allow: AllowList,
    pub from: NaiveDate,
    /// Exclusive.
    pub to: NaiveDate,
    pub policy: MissingSchedulePolicy,
    pub channel_delay: Duration,
}

impl ScheduleOptions {
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Result<Self, ConfigError> {
        let to = today
            .checked_add_days(Days::new(settings.fetch_days.into()))
            .ok_or_else(|| ConfigError::Invalid {
                key: "fetchDays",
                value: settings.fetch_days.to_string(),
            })?;

        Ok(Self {
            group_id: FREEVIEW_GROUP.to_string(),
            allow: AllowList::uk(),
            from: today,
            to,
            policy: settings.missing_schedule,
            channel_delay: settings.channel_delay,
        })
    }
}

/// Enumerates the channel group and replaces the stored listings of every
/// allowed channel with its schedule for the whole window.
pub async fn run<S, W>(source: &S, store: &W, options: &ScheduleOptions) -> anyhow::Result<RunSummary>
where
    S: ScheduleSource + ?Sized,
    W: ProgrammeStore + ?Sized,
{
    let group = source
        .channel_group(&options.group_id)
        .await
        .with_context(|| format!("failed to list channel group {}", options.group_id))?;

    let channels: Vec<AtlasChannel> = group
        .into_iter()
        .filter(|channel| options.allow.allows(&channel.title))
        .collect();
    info!(group = %options.group_id, channels = channels.len(), "channel group listed");

    let mut cache = ResponseCache::new();
    let mut summary = RunSummary::default();

    for (index, channel) in channels.iter().enumerate() {
        if index > 0 {
            pause(options.channel_delay).await;
        }

        let request = ScheduleRequest {
            channel_id: channel.id.clone(),
            from: options.from,
            to: options.to,
            publisher: select_publisher(channel),
        };
        info!(
            channel = %channel.title,
            id = %channel.id,
            publisher = request.publisher,
            "getting events"
        );

        let key = FetchKey::window(&channel.id, options.from, options.to);
        let payload = cache
            .get_or_fetch(key, || source.schedule(&request))
            .await
            .with_context(|| format!("failed to fetch schedule for {}", channel.title))?;

        let schedule = parse_schedule(&payload)
            .with_context(|| format!("failed to parse schedule for {}", channel.title))?;

        let Some(schedule) = schedule else {
            match options.policy {
                MissingSchedulePolicy::Halt => {
                    error!(channel = %channel.title, id = %channel.id, "no schedule returned, stopping");
                    summary.halted = true;
                    break;
                }
                MissingSchedulePolicy::Skip => {
                    warn!(channel = %channel.title, id = %channel.id, "no schedule returned, skipping");
                    summary.skipped_channels += 1;
                    continue;
                }
            }
        };

        let programmes = normalize_schedule(&schedule, &channel.title)
            .with_context(|| format!("failed to normalize schedule for {}", channel.title))?;
        store_channel(store, &channel.title, &programmes, &mut summary).await?;
    }

    info!(
        channels = summary.channels,
        programmes = summary.programmes,
        skipped = summary.skipped_channels,
        halted = summary.halted,
        "schedule run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::RecordingStore;
    use async_trait::async_trait;
    use epg_core::normalize::atlas::Availability;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeAtlas {
        group: Vec<AtlasChannel>,
        schedules: HashMap<String, String>,
        requests: Mutex<Vec<ScheduleRequest>>,
    }

    impl FakeAtlas {
        fn with_channel(mut self, id: &str, title: &str, publishers: &[&str]) -> Self {
            self.group.push(AtlasChannel {
                id: id.to_string(),
                title: title.to_string(),
                available_from: publishers
                    .iter()
                    .map(|key| Availability { key: key.to_string() })
                    .collect(),
            });
            self
        }

        fn with_schedule(mut self, id: &str, body: &str) -> Self {
            self.schedules.insert(id.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<ScheduleRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScheduleSource for FakeAtlas {
        async fn channel_group(&self, group_id: &str) -> anyhow::Result<Vec<AtlasChannel>> {
            assert_eq!(group_id, FREEVIEW_GROUP);
            Ok(self.group.clone())
        }

        async fn schedule(&self, request: &ScheduleRequest) -> anyhow::Result<Vec<u8>> {
            self.requests.lock().unwrap().push(request.clone());
            self.schedules
                .get(&request.channel_id)
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("HTTP 500 Internal Server Error"))
        }
    }

    const NEWS: &str = r#"{"schedule": [{"items": [{
        "title": "News at Ten: Part 2", "description": "The latest news.",
        "container": {"title": "News at Ten"},
        "broadcasts": [{"transmission_time": "2014-12-11T22:00:00Z",
                        "transmission_end_time": "2014-12-11T22:30:00Z"}]
    }]}]}"#;

    const EMPTY_ITEMS: &str = r#"{"schedule": [{"items": []}]}"#;
    const NO_SCHEDULE: &str = r#"{"schedule": []}"#;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 12, n).unwrap()
    }

    fn options(policy: MissingSchedulePolicy) -> ScheduleOptions {
        ScheduleOptions {
            group_id: FREEVIEW_GROUP.to_string(),
            allow: AllowList::new(["BBC One London", "Dave", "ITV2"]),
            from: day(11),
            to: day(14),
            policy,
            channel_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_only_allowed_channels_are_fetched() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["bbc.co.uk"])
            .with_channel("cbbG", "QVC", &["pressassociation.com"])
            .with_channel("cbdx", "Dave", &["pressassociation.com"])
            .with_schedule("cbbh", NEWS)
            .with_schedule("cbdx", EMPTY_ITEMS);
        let store = RecordingStore::default();

        let summary = run(&source, &store, &options(MissingSchedulePolicy::Halt))
            .await
            .unwrap();

        let requested: Vec<_> = source.requests().into_iter().map(|r| r.channel_id).collect();
        assert_eq!(requested, vec!["cbbh", "cbdx"]);
        assert_eq!(store.channels(), vec!["BBC One London", "Dave"]);
        assert_eq!(summary.channels, 2);
        assert_eq!(summary.empty_channels, 1);
        assert!(!summary.halted);
    }

    #[tokio::test]
    async fn test_request_covers_window_with_selected_publisher() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["pressassociation.com", "bbc.co.uk"])
            .with_channel("hkvs", "ITV2", &["itv.com"])
            .with_schedule("cbbh", EMPTY_ITEMS)
            .with_schedule("hkvs", EMPTY_ITEMS);
        let store = RecordingStore::default();

        run(&source, &store, &options(MissingSchedulePolicy::Halt))
            .await
            .unwrap();

        let requests = source.requests();
        assert_eq!(
            requests[0],
            ScheduleRequest {
                channel_id: "cbbh".to_string(),
                from: day(11),
                to: day(14),
                publisher: "bbc.co.uk",
            }
        );
        assert_eq!(requests[1].publisher, "bbc.co.uk");
    }

    #[tokio::test]
    async fn test_schedule_is_stored_under_display_name() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["bbc.co.uk"])
            .with_schedule("cbbh", NEWS);
        let store = RecordingStore::default();

        run(&source, &store, &options(MissingSchedulePolicy::Halt))
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        let programme = &calls[0].1[0];
        assert_eq!(programme.channel, "BBC One London");
        assert_eq!(programme.title, "News at Ten");
        assert_eq!(programme.description, "The latest news.");
    }

    #[tokio::test]
    async fn test_missing_schedule_halts_run() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["bbc.co.uk"])
            .with_channel("cbdx", "Dave", &["pressassociation.com"])
            .with_channel("hkvs", "ITV2", &["pressassociation.com"])
            .with_schedule("cbbh", NEWS)
            .with_schedule("cbdx", NO_SCHEDULE)
            .with_schedule("hkvs", NEWS);
        let store = RecordingStore::default();

        let summary = run(&source, &store, &options(MissingSchedulePolicy::Halt))
            .await
            .unwrap();

        assert!(summary.halted);
        assert_eq!(store.channels(), vec!["BBC One London"]);
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_schedule_skips_channel() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["bbc.co.uk"])
            .with_channel("cbdx", "Dave", &["pressassociation.com"])
            .with_channel("hkvs", "ITV2", &["pressassociation.com"])
            .with_schedule("cbbh", NEWS)
            .with_schedule("cbdx", NO_SCHEDULE)
            .with_schedule("hkvs", NEWS);
        let store = RecordingStore::default();

        let summary = run(&source, &store, &options(MissingSchedulePolicy::Skip))
            .await
            .unwrap();

        assert!(!summary.halted);
        assert_eq!(summary.skipped_channels, 1);
        assert_eq!(store.channels(), vec!["BBC One London", "ITV2"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let source = FakeAtlas::default()
            .with_channel("cbbh", "BBC One London", &["bbc.co.uk"])
            .with_channel("cbdx", "Dave", &["pressassociation.com"]);
        let store = RecordingStore::default();

        let err = run(&source, &store, &options(MissingSchedulePolicy::Skip))
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("HTTP 500"));
        assert!(store.calls().is_empty());
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_group_stores_nothing() {
        let source = FakeAtlas::default();
        let store = RecordingStore::default();

        let summary = run(&source, &store, &options(MissingSchedulePolicy::Halt))
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_options_window_ends_after_last_day() {
        let settings = Settings::parse(
            "dbName=epg\ndbUser=u\ndbPass=p\ndbTable=epg\nfetchDays=3\napiKey=k\nmissingSchedule=skip\n",
        )
        .unwrap();
        let options = ScheduleOptions::from_settings(&settings, day(11)).unwrap();

        assert_eq!(options.from, day(11));
        assert_eq!(options.to, day(14));
        assert_eq!(options.group_id, "cbhh");
        assert_eq!(options.policy, MissingSchedulePolicy::Skip);
        assert!(options.allow.allows("BBC One London"));
        assert!(!options.allow.allows("QVC"));
    }
}
