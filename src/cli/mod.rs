//! Command-line parsing for the FRED ETL loader.
//!
//! Argument parsing stays separate from pipeline code. There are no
//! subcommands: the process boundary is a single command that runs the full
//! orchestration to completion and exits. Credentials never appear here;
//! they come from the environment (see `config`).

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fred-ingest", version, about = "FRED economic time series ETL loader")]
pub struct Cli {
    /// Restrict the run to these series IDs (repeatable).
    /// Default: every series in the built-in registry.
    #[arg(long, value_name = "ID")]
    pub series: Vec<String>,

    /// Ignore stored watermarks and re-fetch full history for every series.
    #[arg(long)]
    pub full: bool,
}
