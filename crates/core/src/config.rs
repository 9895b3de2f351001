use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Raw payload flavour published by the xmltv.se feeds, named after the file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Xmltv,
    JsonTv,
}

impl FeedFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FeedFormat::Xmltv => "xml.gz",
            FeedFormat::JsonTv => "js.gz",
        }
    }
}

impl FromStr for FeedFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "xml.gz" => Ok(FeedFormat::Xmltv),
            "js.gz" => Ok(FeedFormat::JsonTv),
            _ => Err(()),
        }
    }
}

/// What the schedule pipeline does when the provider returns no schedule for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingSchedulePolicy {
    /// Stop processing the remaining channels.
    #[default]
    Halt,
    /// Leave the channel untouched and continue with the next one.
    Skip,
}

impl FromStr for MissingSchedulePolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "halt" => Ok(MissingSchedulePolicy::Halt),
            "skip" => Ok(MissingSchedulePolicy::Skip),
            _ => Err(()),
        }
    }
}

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_LANGUAGE: &str = "no";
pub const DEFAULT_DATE_DELAY_MS: u64 = 50;
pub const DEFAULT_CHANNEL_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_pass: String,
    pub db_table: String,
    pub fetch_days: u32,
    /// Only required by the xmltv.se pipeline.
    pub fetch_modus: Option<FeedFormat>,
    /// Only required by the Atlas pipeline.
    pub api_key: Option<String>,
    pub language: String,
    pub missing_schedule: MissingSchedulePolicy,
    pub date_delay: Duration,
    pub channel_delay: Duration,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses `key=value` lines. Blank lines and `#` comments are ignored and
    /// only the first `=` separates key from value.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::MalformedLine {
                line: index + 1,
                content: line.to_string(),
            })?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        let fetch_days: u32 = parse_required(&values, "fetchDays")?;
        if fetch_days == 0 {
            return Err(ConfigError::Invalid {
                key: "fetchDays",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            db_host: optional(&values, "dbHost").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            db_name: required(&values, "dbName")?,
            db_user: required(&values, "dbUser")?,
            db_pass: required(&values, "dbPass")?,
            db_table: required(&values, "dbTable")?,
            fetch_days,
            fetch_modus: parse_optional(&values, "fetchModus")?,
            api_key: optional(&values, "apiKey"),
            language: optional(&values, "language").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            missing_schedule: parse_optional(&values, "missingSchedule")?.unwrap_or_default(),
            date_delay: Duration::from_millis(
                parse_optional(&values, "dateDelayMs")?.unwrap_or(DEFAULT_DATE_DELAY_MS),
            ),
            channel_delay: Duration::from_millis(
                parse_optional(&values, "channelDelayMs")?.unwrap_or(DEFAULT_CHANNEL_DELAY_MS),
            ),
        })
    }

    pub fn feed_format(&self) -> Result<FeedFormat, ConfigError> {
        self.fetch_modus.ok_or(ConfigError::Missing("fetchModus"))
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("apiKey"))
    }
}

fn optional(values: &HashMap<String, String>, key: &str) -> Option<String> {
    values.get(key).filter(|v| !v.is_empty()).cloned()
}

fn required(values: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    optional(values, key).ok_or(ConfigError::Missing(key))
}

fn parse_optional<T: FromStr>(
    values: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    optional(values, key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}

fn parse_required<T: FromStr>(
    values: &HashMap<String, String>,
    key: &'static str,
) -> Result<T, ConfigError> {
    parse_optional(values, key)?.ok_or(ConfigError::Missing(key))
}
