use std::fmt;

use async_trait::async_trait;
use epg_core::Programme;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::queries::programmes::ReplacePlan;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid table name {0:?}")]
    InvalidTable(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A table name safe to interpolate into SQL: one or two dot-separated
/// identifiers of ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let valid = parts.len() <= 2 && parts.iter().all(|part| is_identifier(part));
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StoreError::InvalidTable(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: u64,
    pub inserted: u64,
}

/// Destination of normalized listings.
#[async_trait]
pub trait ProgrammeStore: Send + Sync {
    /// Replaces every stored row of `channel` with `programmes`. An empty
    /// slice still clears the channel.
    async fn replace_channel(
        &self,
        channel: &str,
        programmes: &[Programme],
    ) -> Result<ReplaceOutcome, StoreError>;
}

pub struct PgProgrammeStore {
    pool: PgPool,
    table: TableName,
}

impl PgProgrammeStore {
    pub fn new(pool: PgPool, table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            pool,
            table: TableName::parse(table)?,
        })
    }
}

#[async_trait]
impl ProgrammeStore for PgProgrammeStore {
    async fn replace_channel(
        &self,
        channel: &str,
        programmes: &[Programme],
    ) -> Result<ReplaceOutcome, StoreError> {
        let plan = ReplacePlan::new(&self.table, channel, programmes);

        let mut tx = self.pool.begin().await?;
        let outcome = plan.execute(&mut *tx).await?;
        tx.commit().await?;

        debug!(
            %channel,
            table = %self.table,
            deleted = outcome.deleted,
            inserted = outcome.inserted,
            "channel replaced"
        );
        Ok(outcome)
    }
}
