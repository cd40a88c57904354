//! Image search engine
//!
//! This module provides the search pipeline behind the image list:
//! - Name/tag normalization over an ASCII + Vietnamese alphabet
//! - `[tag1,tag2]pattern` query extraction
//! - Facet and pattern matching
//! - Debounced evaluation with generation tokens
//! - Stable, direction-aware sorting

pub mod driver;
pub mod facets;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod sorter;
pub mod tags;

// Export the main interfaces
pub use driver::SearchDriver;
pub use facets::TagFacetSet;
pub use matcher::{filter_items, matches, try_matches, Searchable};
pub use normalize::{normalize_name, normalize_path};
pub use pipeline::{DebouncedSearch, PipelinePhase, Promotion, Resolution, SearchState};
pub use query::{extract_query, extract_query_with, StructuredQuery};
pub use sorter::{
    compare_at, compare_fullname, compare_numeric, sort_by_spec, sort_images, Sortable,
};
pub use tags::{collect_tags, TagCatalog};

use crate::config::{SearchSettings, SortSpec};

/// One-shot search: extract, filter and sort without debouncing
///
/// Tags from a bracket expression apply alongside `facets` for this call only.
pub fn search<T>(
    items: &[T],
    text: &str,
    facets: &TagFacetSet,
    sort: &SortSpec,
    settings: &SearchSettings,
) -> SearchOutcome<T>
where
    T: Searchable + Sortable + Clone,
{
    let query = extract_query_with(text, &settings.pattern);
    let filtered = filter_items(items, &query, facets);
    let items = sort_by_spec(filtered, sort);

    SearchOutcome {
        items,
        facet_tags: query.facet_tags.into_iter().collect(),
        error: query.error,
    }
}

/// Result of [`search`]
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    /// Matching items in sort order
    pub items: Vec<T>,
    /// Tags the query text added on top of the caller's facets
    pub facet_tags: Vec<String>,
    /// Pattern compile failure, if the search fell back to facets only
    pub error: Option<crate::error::PatternError>,
}
