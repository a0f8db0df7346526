//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration from the environment
//! - connects to FRED and PostgreSQL
//! - runs the incremental ETL pipeline
//! - prints the end-of-run summary

use clap::Parser;

use crate::cli::Cli;
use crate::config::Config;
use crate::data::fred::FredClient;
use crate::data::registry;
use crate::error::EtlError;
use crate::store::Store;

pub mod pipeline;

/// Entry point for the `fred-ingest` binary.
pub fn run() -> Result<(), EtlError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let selected = registry::select(&cli.series)?;

    let source = FredClient::new(&config.fred_api_key);
    let mut sink = Store::connect(&config.db.params())?;

    let summary = pipeline::run_etl(&selected, &source, &mut sink, cli.full);
    println!("{}", crate::report::format_run_summary(&summary));

    let failed = summary.failed();
    if failed > 0 {
        return Err(EtlError::RunIncomplete { failed, attempted: summary.outcomes.len() });
    }
    Ok(())
}
