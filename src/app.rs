//! Wiring of a complete run: credentials, input, cache, enrichment, output

use tracing::info;

use crate::cache::{FileCache, ZipCache};
use crate::cli::RunConfig;
use crate::credentials::Headers;
use crate::enrich::{enrich_table, EnrichSummary, INPUT_COLUMN};
use crate::error::AppResult;
use crate::lookup::RadiusClient;
use crate::table::Table;

/// Runs one enrichment from input file to output file
///
/// Order matters: credentials are loaded first so a missing secrets file
/// fails at startup, and the input column is checked before the cache is
/// touched or any request is made.
pub async fn run(config: &RunConfig) -> AppResult<EnrichSummary> {
    let headers = Headers::load(&config.secrets)?;
    info!(
        "Loaded {} headers from {}",
        headers.len(),
        config.secrets.display()
    );
    let client = RadiusClient::with_endpoint(&headers, config.endpoint.as_str())?;

    let mut table = Table::read(&config.input_file)?;
    table.require_column(INPUT_COLUMN)?;
    info!(
        "Read {} rows from {}",
        table.len(),
        config.input_file.display()
    );

    let mut cache = FileCache::open(&config.cache_dir, config.radius)?;
    info!(
        "Using cache {} with {} entries",
        cache.path().display(),
        cache.len()
    );

    let summary = enrich_table(&mut table, &client, &mut cache, config.radius).await?;

    table.write(&config.output_file)?;
    info!("Wrote {}", config.output_file.display());

    Ok(summary)
}
