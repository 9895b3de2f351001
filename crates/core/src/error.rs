use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },
    #[error("missing config key `{0}`")]
    Missing(&'static str),
    #[error("invalid value {value:?} for config key `{key}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid XML payload: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("programme is missing `{0}`")]
    MissingField(&'static str),
    #[error("unparseable timestamp {0:?}")]
    Timestamp(String),
}
