//! Game metadata catalogs
//!
//! A catalog is a small comma-separated document listing game identifiers
//! with an optional release year and tag list. Catalogs are fetched once per
//! source id, parsed leniently, and memoised for the life of the process.

mod fetcher;
mod loader;
mod parser;
mod record;

pub use fetcher::{CatalogFetcher, FileFetcher, HttpFetcher, StaticFetcher};
pub use loader::{CatalogCache, CatalogLoader};
pub use parser::{normalize_tag, parse_catalog};
pub use record::MetaRecord;
