use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{resolve_localized, retain_well_ordered, LocalizedText};
use crate::error::NormalizeError;
use crate::types::Programme;

#[derive(Debug, Deserialize)]
struct Envelope {
    jsontv: JsonTv,
}

#[derive(Debug, Deserialize)]
struct JsonTv {
    #[serde(default)]
    programme: Vec<JsonProgramme>,
}

#[derive(Debug, Deserialize)]
struct JsonProgramme {
    start: EpochSeconds,
    stop: EpochSeconds,
    #[serde(default)]
    title: LocalizedText,
    #[serde(default)]
    desc: LocalizedText,
}

/// Unix seconds, published either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Number(i64),
    Text(String),
}

impl EpochSeconds {
    fn to_utc(&self) -> Result<DateTime<Utc>, NormalizeError> {
        let seconds = match self {
            EpochSeconds::Number(n) => *n,
            EpochSeconds::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| NormalizeError::Timestamp(s.clone()))?,
        };
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| NormalizeError::Timestamp(seconds.to_string()))
    }
}

/// Parses a JSON-TV document (`{"jsontv": {"programme": [...]}}`). A missing
/// `programme` array yields no records.
pub fn parse(payload: &[u8], channel: &str, language: &str) -> Result<Vec<Programme>, NormalizeError> {
    let envelope: Envelope = serde_json::from_slice(payload)?;

    let mut programmes = Vec::with_capacity(envelope.jsontv.programme.len());
    for entry in &envelope.jsontv.programme {
        let title = resolve_localized(&entry.title, language);
        let description = resolve_localized(&entry.desc, language);
        programmes.push(Programme::new(
            channel,
            entry.start.to_utc()?,
            entry.stop.to_utc()?,
            &title,
            &description,
        ));
    }

    Ok(retain_well_ordered(programmes))
}
