use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use epg_core::config::Settings;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG_PATH: &str = "app.conf";

/// Command line shared by both fetcher binaries.
#[derive(Debug, Parser)]
#[command(version, about = "Fetch TV listings and store them in Postgres")]
pub struct Args {
    /// Path to the key=value configuration file.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

pub fn init_tracing() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}

pub fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    Settings::from_file(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))
}
