//! # imgdesk Core
//!
//! Core library for imgdesk - the search engine behind an image library console.
//!
//! This library turns a single free-text search box into a structured filter
//! (tag facets plus a case-insensitive pattern), applies it to an in-memory
//! image collection, sorts the result, and keeps a debounced view of it in sync
//! with rapidly changing input.

// Core modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod search;

// Re-export commonly used types
pub use catalog::ImageCatalog;
pub use config::{SearchSettings, SortDirection, SortField, SortSpec};
pub use error::{ConfigError, Error, PatternError, Result};
pub use model::{ActionType, ImageHistory, ImageRecord};
pub use search::{
    extract_query, filter_items, matches, normalize_name, normalize_path, sort_images,
    DebouncedSearch, Promotion, Resolution, SearchDriver, SearchState, Searchable, Sortable,
    StructuredQuery, TagFacetSet,
};

/// Current version of the imgdesk-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
