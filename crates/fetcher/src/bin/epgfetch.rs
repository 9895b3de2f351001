use anyhow::Context;
use chrono::Local;
use clap::Parser;
use db::PgProgrammeStore;
use epg_core::catalog::Catalog;
use fetcher::cli::{init_tracing, load_settings, Args};
use fetcher::http::xmltv::XmltvClient;
use fetcher::jobs::feed::{self, FeedOptions};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let options = FeedOptions::from_settings(&settings, Local::now().date_naive())?;

    let pool = db::connect(&settings)
        .await
        .context("failed to connect to database")?;
    let store = PgProgrammeStore::new(pool, &settings.db_table)?;
    let client = XmltvClient::new(options.format)?;
    let catalog = Catalog::scandinavian();

    info!(
        channels = catalog.len(),
        days = options.dates.len(),
        format = options.format.extension(),
        "starting feed run"
    );

    let summary = feed::run(&client, &store, &catalog, &options).await?;
    info!(?summary, "done");
    Ok(())
}
