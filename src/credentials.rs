//! Loading of the static HTTP headers sent to the radius service
//!
//! The credentials file is a flat JSON object of header name to header value,
//! for example:
//!
//! ```json
//! {
//!     "x-rapidapi-key": "...",
//!     "x-rapidapi-host": "zip-code-distance-radius.p.rapidapi.com"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

/// Default credentials file name, looked up in the working directory
pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

/// Errors that can occur while loading credentials
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credentials file does not exist
    #[error("Credentials file not found: {0}")]
    NotFound(String),

    /// The credentials file could not be read
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The credentials file is not a JSON object of strings
    #[error("Failed to parse credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A header name or value cannot be sent over HTTP
    #[error("Invalid header '{0}' in credentials file")]
    InvalidHeader(String),
}

/// Header mapping forwarded unchanged with every lookup request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Reads headers from a JSON credentials file
    ///
    /// # Returns
    /// * `Ok(Headers)` with every header in the file
    /// * `Err(CredentialsError::NotFound)` if the file is missing
    /// * `Err(CredentialsError)` if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => CredentialsError::NotFound(display.clone()),
            _ => CredentialsError::Io {
                path: display.clone(),
                source,
            },
        })?;

        let map: BTreeMap<String, String> = serde_json::from_str(&content)
            .map_err(|source| CredentialsError::Parse {
                path: display,
                source,
            })?;

        Ok(Self(map))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts into a reqwest header map, validating every name and value
    pub fn to_header_map(&self) -> Result<HeaderMap, CredentialsError> {
        let mut map = HeaderMap::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| CredentialsError::InvalidHeader(name.clone()))?;
            let mut header_value = HeaderValue::from_str(value)
                .map_err(|_| CredentialsError::InvalidHeader(name.clone()))?;
            header_value.set_sensitive(true);
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
