use anyhow::Context;
use chrono::Local;
use clap::Parser;
use db::PgProgrammeStore;
use fetcher::cli::{init_tracing, load_settings, Args};
use fetcher::http::atlas::AtlasClient;
use fetcher::jobs::schedule::{self, ScheduleOptions};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let options = ScheduleOptions::from_settings(&settings, Local::now().date_naive())?;
    let client = AtlasClient::new(settings.api_key()?)?;

    let pool = db::connect(&settings)
        .await
        .context("failed to connect to database")?;
    let store = PgProgrammeStore::new(pool, &settings.db_table)?;

    info!(
        group = %options.group_id,
        from = %options.from,
        to = %options.to,
        "starting schedule run"
    );

    let summary = schedule::run(&client, &store, &options).await?;
    if summary.halted {
        info!(?summary, "stopped early on a missing schedule");
    } else {
        info!(?summary, "done");
    }
    Ok(())
}
