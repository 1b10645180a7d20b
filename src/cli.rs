//! Command-line interface parsing for radius_zips
//!
//! This module handles parsing of CLI arguments using clap and resolves them
//! into a `RunConfig`, filling in the default output path.

use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::credentials::DEFAULT_SECRETS_FILE;
use crate::lookup::DEFAULT_ENDPOINT;

/// Default search radius in miles
pub const DEFAULT_RADIUS: u32 = 10;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The input path has no file name to derive an output name from
    #[error("Cannot derive an output file name from '{0}'")]
    NoFileStem(String),
}

/// Read a CSV describing different cities, and return all zip codes within a radius
#[derive(Parser, Debug)]
#[command(name = "radius_zips")]
#[command(about = "Read a CSV describing different cities, and return all zip codes within a radius")]
#[command(version)]
pub struct Cli {
    /// Input CSV file with a `total_zips` column
    pub input_file: PathBuf,

    /// Output CSV. Defaults to the input name with the extension ".out.csv"
    pub output_file: Option<PathBuf>,

    /// Radius in miles within which to search for zip codes
    #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
    pub radius: u32,

    /// JSON file with the HTTP headers (API key) sent to the radius service
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SECRETS_FILE)]
    pub secrets: PathBuf,

    /// Directory holding the per-radius cache files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cache_dir: PathBuf,

    /// Radius lookup endpoint
    #[arg(long, value_name = "URL", env = "RADIUS_ZIPS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Configuration derived from CLI arguments for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub radius: u32,
    pub secrets: PathBuf,
    pub cache_dir: PathBuf,
    pub endpoint: String,
}

/// Default output path for an input file: `<stem>.out.csv` in the working directory
///
/// # Returns
/// * `Ok(PathBuf)` with the derived file name
/// * `Err(CliError::NoFileStem)` if the input path has no file name
pub fn default_output_path(input: &Path) -> Result<PathBuf, CliError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| CliError::NoFileStem(input.display().to_string()))?;
    Ok(PathBuf::from(format!("{}.out.csv", stem.to_string_lossy())))
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let output_file = match &cli.output_file {
            Some(path) => path.clone(),
            None => default_output_path(&cli.input_file)?,
        };

        Ok(RunConfig {
            input_file: cli.input_file.clone(),
            output_file,
            radius: cli.radius,
            secrets: cli.secrets.clone(),
            cache_dir: cli.cache_dir.clone(),
            endpoint: cli.endpoint.clone(),
        })
    }
}
