//! Tag catalog: every tag in use across a collection

use super::matcher::Searchable;
use super::normalize::normalize_name;
use std::collections::BTreeMap;

/// Normalized tags with the number of items carrying each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCatalog {
    counts: BTreeMap<String, usize>,
}

impl TagCatalog {
    /// Number of items carrying a normalized tag
    pub fn count(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.counts.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Tags and counts in tag order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(tag, count)| (tag.as_str(), *count))
    }

    /// Record the tags of one more item
    pub fn add_item<T: Searchable + ?Sized>(&mut self, item: &T) {
        let Some(tags) = item.tags() else {
            return;
        };

        let mut seen: Vec<String> = tags
            .iter()
            .map(|tag| normalize_name(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        seen.sort_unstable();
        seen.dedup();

        for tag in seen {
            *self.counts.entry(tag).or_insert(0) += 1;
        }
    }
}

/// Collect every normalized tag used in a collection
pub fn collect_tags<'a, T, I>(items: I) -> TagCatalog
where
    T: Searchable + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut catalog = TagCatalog::default();
    for item in items {
        catalog.add_item(item);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRecord;

    #[test]
    fn test_collect_tags_counts_items() {
        let items = vec![
            ImageRecord::new(1, "a").with_tags(["Summer", "home"]),
            ImageRecord::new(2, "b").with_tags(["summer!", "SUMMER", "!!"]),
            ImageRecord::new(3, "c"),
        ];
        let catalog = collect_tags(&items);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.count("summer"), 2);
        assert_eq!(catalog.count("home"), 1);
        assert_eq!(catalog.count("missing"), 0);
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec![("home", 1), ("summer", 2)]
        );
    }

    #[test]
    fn test_collect_tags_empty() {
        let items: Vec<ImageRecord> = Vec::new();
        assert!(collect_tags(&items).is_empty());
    }
}
