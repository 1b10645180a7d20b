//! radius_zips library
//!
//! Enriches a CSV of postal codes with every postal code inside a search
//! radius. Modules are exposed for use in integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod table;
