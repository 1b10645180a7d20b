//! radius_zips - add nearby postal codes to a CSV of postal codes
//!
//! Reads a CSV with a `total_zips` column, looks up every postal code within
//! the requested radius (cached per radius on disk) and writes the table back
//! out with a `radius_zips` column.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use radius_zips::app;
use radius_zips::cli::{Cli, RunConfig};

/// Sets up logging on stderr: 0 = warn, 1 = info, 2+ = debug
///
/// `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "radius_zips=warn",
        1 => "radius_zips=info",
        _ => "radius_zips=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match RunConfig::from_cli(&cli) {
        Ok(config) => {
            debug!("Run configuration: {:?}", config);
            app::run(&config).await.map(|_| ())
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
