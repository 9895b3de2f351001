//! Conversion of provider payloads into [`Programme`] records.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::config::FeedFormat;
use crate::error::NormalizeError;
use crate::types::Programme;

pub mod atlas;
pub mod jsontv;
pub mod xmltv;

/// Fallback language when the local one is missing or empty.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Language-keyed text as published by the feeds. Values may be `null`.
pub type LocalizedText = HashMap<String, Option<String>>;

/// Normalizes one xmltv.se payload in the given format.
pub fn normalize_feed(
    format: FeedFormat,
    payload: &[u8],
    channel: &str,
    language: &str,
) -> Result<Vec<Programme>, NormalizeError> {
    match format {
        FeedFormat::Xmltv => xmltv::parse(std::str::from_utf8(payload)?, channel, language),
        FeedFormat::JsonTv => jsontv::parse(payload, channel, language),
    }
}

/// Picks the local-language value when present and non-empty, else English,
/// else an empty string. The result is trimmed.
pub fn resolve_localized(values: &LocalizedText, language: &str) -> String {
    let lookup = |lang: &str| {
        values
            .get(lang)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    lookup(language)
        .or_else(|| lookup(FALLBACK_LANGUAGE))
        .unwrap_or_default()
        .to_string()
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y%m%d%H%M%S %z",
    "%Y%m%d%H%M%S%z",
    "%Y%m%d%H%M %z",
    "%Y%m%d%H%M%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y%m%d%H%M%S",
    "%Y%m%d%H%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses the date-time shapes seen in XMLTV attributes. Times without an
/// offset are taken as UTC.
pub fn parse_flexible_datetime(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }

    Err(NormalizeError::Timestamp(value.to_string()))
}

/// Drops records whose stop is not after their start.
pub(crate) fn retain_well_ordered(programmes: Vec<Programme>) -> Vec<Programme> {
    programmes
        .into_iter()
        .filter(|p| {
            let ok = p.is_well_ordered();
            if !ok {
                warn!(
                    channel = %p.channel,
                    title = %p.title,
                    start = %p.start,
                    stop = %p.stop,
                    "dropping programme that does not end after it starts"
                );
            }
            ok
        })
        .collect()
}
