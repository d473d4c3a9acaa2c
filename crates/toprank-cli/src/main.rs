mod cli;
mod error;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use time::OffsetDateTime;
use toprank_core::{Pipeline, PipelineConfig, StoreConfig};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let as_of = cli.date.unwrap_or_else(|| {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    });
    let destination = cli.destination;

    let config = PipelineConfig::default()
        .with_store(store_config(&cli))
        .with_concurrency(usize::from(cli.concurrency));

    info!(%as_of, %destination, workers = config.concurrency, "starting run");
    let summary = Pipeline::twse(config).run(as_of, destination).await?;
    info!(
        listings = summary.listings,
        categories = summary.categories,
        "run complete"
    );

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;

    Ok(ExitCode::SUCCESS)
}

fn store_config(cli: &Cli) -> StoreConfig {
    let mut store = StoreConfig {
        local_dir: cli.output_dir.clone(),
        remote_endpoint: cli.remote_endpoint.clone(),
        ..StoreConfig::default()
    };
    if let Some(bucket) = &cli.bucket {
        store.bucket = bucket.clone();
    }
    store
}

/// Logs go to stderr so stdout carries only the run summary.
fn init_logging(verbose: bool) -> Result<(), CliError> {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}
