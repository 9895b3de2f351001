use epg_core::config::Settings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

pub mod queries;
pub mod store;

pub use store::{PgProgrammeStore, ProgrammeStore, ReplaceOutcome, StoreError, TableName};

/// Opens the single connection a run uses for all channels.
pub async fn connect(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::new()
        .host(&settings.db_host)
        .username(&settings.db_user)
        .password(&settings.db_pass)
        .database(&settings.db_name);

    PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}
