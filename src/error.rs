//! Top-level error type for a radius_zips run

use thiserror::Error;

use crate::cache::CacheError;
use crate::cli::CliError;
use crate::credentials::CredentialsError;
use crate::enrich::EnrichError;
use crate::lookup::ClientError;
use crate::table::TableError;

/// Any error that aborts a run
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<EnrichError> for AppError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::Table(e) => AppError::Table(e),
            EnrichError::Cache(e) => AppError::Cache(e),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
