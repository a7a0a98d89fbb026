#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config;
mod db;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use services::{AppServices, Clock};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::db::{normalize_sqlite_url, prepare_sqlite_file};

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(&cli.config)?;
    let db_url = normalize_sqlite_url(&cli.db_url)?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(
        &db_url,
        Clock::system(),
        config.interview_settings(),
        cli.seed,
    )
    .await?;
    tracing::debug!(db = %db_url, seed = ?cli.seed, "services ready");

    commands::execute(&services, cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
