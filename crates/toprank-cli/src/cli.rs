//! CLI argument definitions for toprank.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `-d`, `--date` | today | Trading date to rank, `YYYY-MM-DD` |
//! | `--destination` | `local` | Where artifacts are written |
//! | `--output-dir` | `data` | Directory for local artifacts |
//! | `--concurrency` | `2` | Report workers |
//! | `--remote-endpoint` | none | Pre-authorized `PUT` endpoint, required for `remote` |
//! | `--bucket` | `stock-data-demo` | Object store bucket |
//! | `--pretty` | `false` | Pretty-print the run summary |
//! | `-v`, `--verbose` | `false` | Debug logging |
//!
//! # Examples
//!
//! ```bash
//! # Rank today's movers into ./data
//! toprank
//!
//! # A specific day, uploaded through an authorizing gateway
//! toprank --date 2022-06-14 --destination remote --remote-endpoint https://uploads.example.com
//! ```

use std::path::PathBuf;

use clap::Parser;
use time::macros::format_description;
use time::Date;
use toprank_core::Destination;

/// Parse and save listed stocks information and the daily top 3 stocks of each industry.
#[derive(Debug, Parser)]
#[command(name = "toprank", author, version, about)]
pub struct Cli {
    /// Increase output verbosity.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Trading date to rank (YYYY-MM-DD); today when omitted.
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<Date>,

    /// Where listings and rankings are persisted: `local` or `remote` (alias `cloud`).
    #[arg(long, default_value_t = Destination::Local)]
    pub destination: Destination,

    /// Directory for local artifacts.
    #[arg(long, default_value = "data")]
    pub output_dir: PathBuf,

    /// Number of concurrent report workers.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Pre-authorized `PUT` endpoint; required with `--destination remote`.
    #[arg(long)]
    pub remote_endpoint: Option<String>,

    /// Object store bucket used with `--destination remote`.
    #[arg(long)]
    pub bucket: Option<String>,

    /// Pretty-print the JSON run summary.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}
