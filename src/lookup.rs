//! Client for the zip code radius web service
//!
//! Issues one GET per postal code and turns the JSON response into the
//! comma-separated list of postal codes that is stored in the cache.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::credentials::{CredentialsError, Headers};

/// Default endpoint of the radius lookup service
pub const DEFAULT_ENDPOINT: &str =
    "https://zip-code-distance-radius.p.rapidapi.com/api/zipCodesWithinRadius";

/// Separator between postal codes returned for a single lookup
const RESULT_SEPARATOR: &str = ", ";

/// Errors that can occur when looking up a postal code
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Errors that can occur while constructing a [`RadiusClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The credential headers cannot be used
    #[error(transparent)]
    Headers(#[from] CredentialsError),

    /// The HTTP client could not be initialised
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// One entry of the service response
#[derive(Debug, Deserialize)]
struct RadiusEntry {
    #[serde(rename = "zipCode")]
    zip_code: Option<String>,
}

/// Something that can resolve the postal codes within a radius of another
///
/// Implemented by [`RadiusClient`] for the real service; tests provide fakes.
#[allow(async_fn_in_trait)]
pub trait RadiusLookup {
    /// Looks up every postal code within `radius` miles of `zip_code`
    ///
    /// # Returns
    /// * `Ok(String)` - The postal codes joined with `", "`, possibly empty
    /// * `Err(LookupError)` - If the request or response parsing failed
    async fn lookup(&self, zip_code: &str, radius: u32) -> Result<String, LookupError>;
}

/// Client for the radius lookup HTTP service
#[derive(Debug, Clone)]
pub struct RadiusClient {
    client: Client,
    endpoint: String,
}

impl RadiusClient {
    /// Creates a client that sends `headers` with every request
    pub fn new(headers: &Headers) -> Result<Self, ClientError> {
        Self::with_endpoint(headers, DEFAULT_ENDPOINT)
    }

    /// Creates a client pointed at a custom endpoint
    pub fn with_endpoint(
        headers: &Headers,
        endpoint: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .default_headers(headers.to_header_map()?)
            .build()?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Creates a client from an already configured HTTP client
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RadiusLookup for RadiusClient {
    async fn lookup(&self, zip_code: &str, radius: u32) -> Result<String, LookupError> {
        debug!("Requesting zip codes within {} of {}", radius, zip_code);

        let radius = radius.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("zipCode", zip_code), ("radius", radius.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::UnexpectedStatus(status));
        }

        let text = response.text().await?;
        parse_radius_response(&text)
    }
}

/// Parses a service response body into the joined list of postal codes
///
/// Entries without a `zipCode` field are skipped.
pub fn parse_radius_response(body: &str) -> Result<String, LookupError> {
    let entries: Vec<RadiusEntry> = serde_json::from_str(body)?;

    let zips: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| entry.zip_code)
        .collect();

    Ok(zips.join(RESULT_SEPARATOR))
}

/// Resolves one postal code, collapsing any failure to an empty string
///
/// Failures are logged with the offending postal code and never propagate;
/// the returned flag is `false` when the lookup failed.
pub async fn resolve_one<L: RadiusLookup>(
    lookup: &L,
    zip_code: &str,
    radius: u32,
) -> (String, bool) {
    match lookup.lookup(zip_code, radius).await {
        Ok(zips) => (zips, true),
        Err(e) => {
            warn!("Error fetching data for zip code {}: {}", zip_code, e);
            (String::new(), false)
        }
    }
}
