//! Matching items against a structured query and the active tag facets

use super::facets::TagFacetSet;
use super::normalize::normalize_name;
use super::query::StructuredQuery;
use crate::error::PatternError;
use crate::model::{ImageHistory, ImageRecord};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Minimal shape the search engine works on
pub trait Searchable {
    /// Name matched by the free-text pattern; may contain `/`
    fn name(&self) -> &str;

    /// Tags of the item; `None` means untagged
    fn tags(&self) -> Option<&[String]>;
}

impl Searchable for ImageRecord {
    fn name(&self) -> &str {
        &self.fullname
    }

    fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

impl Searchable for ImageHistory {
    fn name(&self) -> &str {
        &self.fullname
    }

    fn tags(&self) -> Option<&[String]> {
        None
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn tags(&self) -> Option<&[String]> {
        (**self).tags()
    }
}

impl<T: Searchable + ?Sized> Searchable for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn tags(&self) -> Option<&[String]> {
        (**self).tags()
    }
}

/// Union of the caller's facets and the tags parsed from the query
pub fn effective_facets<'a>(
    query: &'a StructuredQuery,
    external: &'a TagFacetSet,
) -> BTreeSet<&'a str> {
    external
        .iter()
        .chain(query.facet_tags.iter().map(String::as_str))
        .collect()
}

/// Check that an item carries every facet tag
///
/// Counts the item's tags that fall in the facet set, so duplicate tags on the
/// item never cause a false negative. An empty facet set passes everything.
pub fn has_facets<T: Searchable + ?Sized>(item: &T, facets: &BTreeSet<&str>) -> bool {
    if facets.is_empty() {
        return true;
    }

    let Some(tags) = item.tags() else {
        return false;
    };

    let hits = tags
        .iter()
        .filter(|tag| facets.contains(normalize_name(tag).as_str()))
        .count();
    hits >= facets.len()
}

/// Decide inclusion, surfacing a per-candidate pattern failure
pub fn try_matches<T: Searchable + ?Sized>(
    item: &T,
    query: &StructuredQuery,
    external: &TagFacetSet,
) -> Result<bool, PatternError> {
    if !has_facets(item, &effective_facets(query, external)) {
        return Ok(false);
    }
    query.test_name(item.name())
}

/// Decide inclusion; a candidate whose pattern match fails is excluded
pub fn matches<T: Searchable + ?Sized>(
    item: &T,
    query: &StructuredQuery,
    external: &TagFacetSet,
) -> bool {
    match try_matches(item, query, external) {
        Ok(matched) => matched,
        Err(err) => {
            debug!("Excluding '{}': {}", item.name(), err);
            false
        }
    }
}

/// Filter a collection, cloning the items that match
///
/// Facets are merged once for the whole pass. Clone is cheap for `Arc<T>` and
/// `&T` items, which keep identity with the caller's collection.
pub fn filter_items<T: Searchable + Clone>(
    items: &[T],
    query: &StructuredQuery,
    external: &TagFacetSet,
) -> Vec<T> {
    let facets = effective_facets(query, external);

    items
        .iter()
        .filter(|item| {
            if !has_facets(*item, &facets) {
                return false;
            }
            match query.test_name(item.name()) {
                Ok(matched) => matched,
                Err(err) => {
                    debug!("Excluding '{}': {}", item.name(), err);
                    false
                }
            }
        })
        .cloned()
        .collect()
}
