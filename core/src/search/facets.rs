//! Tag facet set maintained by the caller across a session

use super::normalize::normalize_name;
use std::collections::BTreeSet;

/// Set of normalized tags an item must all carry to stay in the result
///
/// Every insertion path normalizes, so the set never holds a raw tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFacetSet {
    tags: BTreeSet<String>,
}

impl TagFacetSet {
    /// Create an empty facet set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns false if it was already present or normalizes to nothing
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = normalize_name(tag);
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag)
    }

    /// Remove a tag; returns whether it was present
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(&normalize_name(tag))
    }

    /// Select a tag if absent, deselect it if present
    ///
    /// Returns whether the tag is selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = normalize_name(tag);
        if tag.is_empty() {
            return false;
        }
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag);
            true
        }
    }

    /// Replace the selection with a single tag
    pub fn select_only(&mut self, tag: &str) {
        self.tags.clear();
        self.insert(tag);
    }

    /// Merge tags into the set; returns how many were new
    pub fn merge<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter(|tag| self.insert(tag.as_ref()))
            .count()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Check membership of an already normalized tag
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Borrow the underlying set
    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagFacetSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for TagFacetSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.merge(iter);
    }
}
