//! Row-by-row radius enrichment of a postal code table
//!
//! For every row the comma-separated `total_zips` cell is expanded into the
//! postal codes within the configured radius. Results come from the cache
//! when present, otherwise from one sequential lookup per postal code, and
//! the cache is flushed after each row that added entries.

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheError, ZipCache};
use crate::lookup::{resolve_one, RadiusLookup};
use crate::table::{Table, TableError};

/// Column holding the comma-separated input postal codes
pub const INPUT_COLUMN: &str = "total_zips";

/// Column written with the resolved radius postal codes
pub const OUTPUT_COLUMN: &str = "radius_zips";

/// Errors that abort an enrichment run
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Counters describing a finished enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Rows processed
    pub rows: usize,
    /// Postal codes sent to the lookup service
    pub lookups: usize,
    /// Lookups that failed and were cached as empty
    pub failures: usize,
    /// Postal codes answered from the cache
    pub cache_hits: usize,
}

/// Splits a `total_zips` cell into trimmed postal codes
///
/// Empty tokens (blank cells, doubled or trailing commas) are dropped.
pub fn split_zip_codes(cell: &str) -> Vec<&str> {
    cell.split(',')
        .map(str::trim)
        // Empty tokens are never queried or cached
        .filter(|zip| !zip.is_empty())
        .collect()
}

/// Formats the progress line printed after each row
pub fn progress_line(done: usize, total: usize) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        (done as f64 * 100.0) / total as f64
    };
    format!("Completed: {:.2}%", percent)
}

/// Adds the `radius_zips` column to `table`
///
/// Fails before any lookup if the table has no `total_zips` column. Lookup
/// failures never abort the run: the postal code is cached as an empty
/// string and will not be queried again.
///
/// # Arguments
/// * `table` - Table to enrich in place
/// * `lookup` - Radius lookup used for postal codes missing from the cache
/// * `cache` - Cache for this radius; grows and is flushed as rows complete
/// * `radius` - Search radius in miles
///
/// # Returns
/// * `Ok(EnrichSummary)` once every row has been processed
/// * `Err(EnrichError)` if the input column is missing or the cache cannot be flushed
pub async fn enrich_table<L, C>(
    table: &mut Table,
    lookup: &L,
    cache: &mut C,
    radius: u32,
) -> Result<EnrichSummary, EnrichError>
where
    L: RadiusLookup,
    C: ZipCache,
{
    let input = table.require_column(INPUT_COLUMN)?;
    let total = table.len();
    let mut summary = EnrichSummary::default();
    let mut radius_zips = Vec::with_capacity(total);

    for row in 0..total {
        let zip_codes = split_zip_codes(table.cell(row, input));
        let mut changed_cache = false;

        for zip_code in &zip_codes {
            if cache.get(zip_code).is_some() {
                summary.cache_hits += 1;
                continue;
            }

            let (resolved, ok) = resolve_one(lookup, zip_code, radius).await;
            summary.lookups += 1;
            if !ok {
                summary.failures += 1;
            }
            changed_cache |= cache.put(zip_code, resolved);
        }

        let joined = zip_codes
            .iter()
            .map(|zip_code| cache.get(zip_code).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        debug!("Row {}: {} -> {}", row, zip_codes.join(","), joined);
        radius_zips.push(joined);

        if changed_cache {
            cache.flush()?;
        }

        summary.rows += 1;
        println!("{}", progress_line(row + 1, total));
    }

    table.set_column(OUTPUT_COLUMN, radius_zips)?;

    info!(
        "Enriched {} rows: {} lookups ({} failed), {} cache hits",
        summary.rows, summary.lookups, summary.failures, summary.cache_hits
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::lookup::LookupError;
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Lookup that answers from a fixed table and records every call
    #[derive(Default)]
    struct FakeLookup {
        answers: HashMap<String, String>,
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl FakeLookup {
        fn new(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl RadiusLookup for FakeLookup {
        async fn lookup(&self, zip_code: &str, radius: u32) -> Result<String, LookupError> {
            self.calls.borrow_mut().push((zip_code.to_string(), radius));
            self.answers
                .get(zip_code)
                .cloned()
                .ok_or(LookupError::UnexpectedStatus(StatusCode::NOT_FOUND))
        }
    }

    fn table(csv: &str) -> Table {
        Table::parse(csv).expect("Test CSV should parse")
    }

    #[test]
    fn test_split_zip_codes_trims_and_drops_empty() {
        assert_eq!(split_zip_codes("11111, 22222"), vec!["11111", "22222"]);
        assert_eq!(split_zip_codes(" 11111 ,,22222, "), vec!["11111", "22222"]);
        assert_eq!(split_zip_codes("11111,"), vec!["11111"]);
        assert!(split_zip_codes("").is_empty());
    }

    #[test]
    fn test_progress_line_format() {
        assert_eq!(progress_line(1, 3), "Completed: 33.33%");
        assert_eq!(progress_line(3, 3), "Completed: 100.00%");
        assert_eq!(progress_line(0, 0), "Completed: 100.00%");
    }

    #[tokio::test]
    async fn test_prepopulated_cache_joins_in_row_order() {
        let mut table = table("city,total_zips\nSpringfield,\"11111, 22222\"\n");
        let lookup = FakeLookup::default();
        let mut cache = MemoryCache::with_entries([("11111", "11112,11113"), ("22222", "22223")]);

        let summary = enrich_table(&mut table, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(
            table.column(OUTPUT_COLUMN).unwrap(),
            vec!["11112,11113,22223"]
        );
        assert_eq!(lookup.call_count(), 0);
        assert_eq!(cache.flush_count, 0);
        assert_eq!(summary.cache_hits, 2);
    }

    #[tokio::test]
    async fn test_resolved_zip_is_cached_and_not_requeried() {
        let mut table = table("total_zips\n11111\n\"11111, 22222\"\n22222\n");
        let lookup = FakeLookup::new(&[("11111", "11112"), ("22222", "22223, 22224")]);
        let mut cache = MemoryCache::new();

        let summary = enrich_table(&mut table, &lookup, &mut cache, 25)
            .await
            .unwrap();

        assert_eq!(
            *lookup.calls.borrow(),
            vec![("11111".to_string(), 25), ("22222".to_string(), 25)]
        );
        assert_eq!(cache.get("11111"), Some("11112"));
        assert_eq!(cache.get("22222"), Some("22223, 22224"));
        assert_eq!(
            table.column(OUTPUT_COLUMN).unwrap(),
            vec!["11112", "11112,22223, 22224", "22223, 22224"]
        );
        assert_eq!(summary.lookups, 2);
        assert_eq!(summary.cache_hits, 2);
    }

    #[tokio::test]
    async fn test_flush_only_after_rows_adding_entries() {
        let mut table = table("total_zips\n11111\n11111\n22222\n");
        let lookup = FakeLookup::new(&[("11111", "a"), ("22222", "b")]);
        let mut cache = MemoryCache::new();

        enrich_table(&mut table, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(cache.flush_count, 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_caches_empty_and_continues() {
        let mut table = table("total_zips\n\"11111, 99999, 22222\"\n33333\n");
        let lookup = FakeLookup::new(&[
            ("11111", "11112"),
            ("22222", "22223"),
            ("33333", "33334"),
        ]);
        let mut cache = MemoryCache::new();

        let summary = enrich_table(&mut table, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(cache.get("99999"), Some(""));
        assert_eq!(
            table.column(OUTPUT_COLUMN).unwrap(),
            vec!["11112,,22223", "33334"]
        );
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.rows, 2);
    }

    #[tokio::test]
    async fn test_failed_entry_is_not_retried() {
        let lookup = FakeLookup::default();
        let mut cache = MemoryCache::new();

        let mut first = table("total_zips\n99999\n");
        enrich_table(&mut first, &lookup, &mut cache, 10)
            .await
            .unwrap();
        let mut second = table("total_zips\n99999\n");
        enrich_table(&mut second, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(lookup.call_count(), 1);
        assert_eq!(second.column(OUTPUT_COLUMN).unwrap(), vec![""]);
    }

    #[tokio::test]
    async fn test_second_run_is_identical_and_offline() {
        let input = "city,total_zips\nA,\"11111, 22222\"\nB,33333\n";
        let lookup = FakeLookup::new(&[("11111", "1"), ("22222", "2"), ("33333", "3")]);
        let mut cache = MemoryCache::new();

        let mut first = table(input);
        enrich_table(&mut first, &lookup, &mut cache, 10)
            .await
            .unwrap();
        let calls_after_first = lookup.call_count();

        let mut second = table(input);
        let summary = enrich_table(&mut second, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(lookup.call_count(), calls_after_first);
        assert_eq!(summary.lookups, 0);
    }

    #[tokio::test]
    async fn test_missing_column_aborts_before_lookup() {
        let mut table = table("city,zip\nSpringfield,11111\n");
        let lookup = FakeLookup::new(&[("11111", "11112")]);
        let mut cache = MemoryCache::new();

        let result = enrich_table(&mut table, &lookup, &mut cache, 10).await;

        assert!(matches!(
            result,
            Err(EnrichError::Table(TableError::MissingColumn(_)))
        ));
        assert_eq!(lookup.call_count(), 0);
        assert!(table.column(OUTPUT_COLUMN).is_none());
        assert_eq!(cache.flush_count, 0);
    }

    #[tokio::test]
    async fn test_cache_holds_union_of_old_and_new_keys() {
        let mut table = table("total_zips\n\"11111, 22222\"\n\"22222, 33333\"\n");
        let lookup = FakeLookup::new(&[("22222", "b"), ("33333", "c")]);
        let mut cache = MemoryCache::with_entries([("11111", "a"), ("44444", "d")]);

        enrich_table(&mut table, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(
            cache.keys().collect::<Vec<_>>(),
            vec!["11111", "22222", "33333", "44444"]
        );
    }

    #[tokio::test]
    async fn test_empty_cell_yields_empty_radius_zips() {
        let mut table = table("city,total_zips\nNowhere,\n");
        let lookup = FakeLookup::default();
        let mut cache = MemoryCache::new();

        enrich_table(&mut table, &lookup, &mut cache, 10)
            .await
            .unwrap();

        assert_eq!(table.column(OUTPUT_COLUMN).unwrap(), vec![""]);
        assert_eq!(lookup.call_count(), 0);
    }
}
