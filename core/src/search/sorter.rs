//! Stable, direction-aware ordering of image lists

use crate::config::{SortDirection, SortField, SortSpec};
use crate::model::{ImageHistory, ImageRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::sync::Arc;

/// Keys the supplied comparators read
pub trait Sortable {
    /// Full path name
    fn fullname(&self) -> &str;

    /// Raw timestamp string, if any
    fn at(&self) -> Option<&str> {
        None
    }

    /// Numeric key for `Width`, `Height` or `DiskSize`
    fn numeric(&self, _field: SortField) -> Option<u64> {
        None
    }
}

impl Sortable for ImageRecord {
    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn at(&self) -> Option<&str> {
        self.at.as_deref()
    }

    fn numeric(&self, field: SortField) -> Option<u64> {
        match field {
            SortField::Width => self.width,
            SortField::Height => self.height,
            SortField::DiskSize => self.disk_size,
            SortField::Filename | SortField::At => None,
        }
    }
}

impl Sortable for ImageHistory {
    fn fullname(&self) -> &str {
        &self.fullname
    }

    fn at(&self) -> Option<&str> {
        Some(&self.at)
    }
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn fullname(&self) -> &str {
        (**self).fullname()
    }

    fn at(&self) -> Option<&str> {
        (**self).at()
    }

    fn numeric(&self, field: SortField) -> Option<u64> {
        (**self).numeric(field)
    }
}

impl<T: Sortable + ?Sized> Sortable for Arc<T> {
    fn fullname(&self) -> &str {
        (**self).fullname()
    }

    fn at(&self) -> Option<&str> {
        (**self).at()
    }

    fn numeric(&self, field: SortField) -> Option<u64> {
        (**self).numeric(field)
    }
}

/// Plain comparator function over two items
pub type Comparator<T> = fn(&T, &T) -> Ordering;

impl SortField {
    /// Comparator for this field
    pub fn comparator<T: Sortable>(self) -> Comparator<T> {
        match self {
            SortField::Filename => compare_fullname::<T>,
            SortField::At => compare_at::<T>,
            SortField::Width => |a: &T, b: &T| compare_numeric(a, b, SortField::Width),
            SortField::Height => |a: &T, b: &T| compare_numeric(a, b, SortField::Height),
            SortField::DiskSize => |a: &T, b: &T| compare_numeric(a, b, SortField::DiskSize),
        }
    }
}

/// Raw lexicographic comparison of full names, no normalization
pub fn compare_fullname<T: Sortable + ?Sized>(a: &T, b: &T) -> Ordering {
    a.fullname().cmp(b.fullname())
}

/// Timestamp comparison
///
/// A missing timestamp sorts before every dated item. If either side fails to
/// parse the pair compares equal.
pub fn compare_at<T: Sortable + ?Sized>(a: &T, b: &T) -> Ordering {
    match (a.at(), b.at()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        },
    }
}

/// Numeric comparison, missing values count as 0
pub fn compare_numeric<T: Sortable + ?Sized>(a: &T, b: &T, field: SortField) -> Ordering {
    let a = a.numeric(field).unwrap_or(0);
    let b = b.numeric(field).unwrap_or(0);
    a.cmp(&b)
}

/// Parse a server timestamp into milliseconds since the epoch
///
/// Accepts RFC 3339 and offset-less ISO forms, which are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Sort items stably, reversing the comparator for `Desc`
///
/// Elements are moved, never cloned. Items with equal keys keep their input
/// order in both directions.
pub fn sort_images<T, F>(items: Vec<T>, direction: SortDirection, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    match direction {
        SortDirection::Asc => merge_sort_by(items, &mut compare),
        SortDirection::Desc => merge_sort_by(items, &mut |a: &T, b: &T| compare(a, b).reverse()),
    }
}

/// Sort items by a field and direction
pub fn sort_by_spec<T: Sortable>(items: Vec<T>, spec: &SortSpec) -> Vec<T> {
    sort_images(items, spec.direction, spec.field.comparator::<T>())
}

// `slice::sort_by` may panic when the comparator is not a total order, and
// `compare_at` is not one once unparsable timestamps are involved. This merge
// sort only ever asks "is left greater than right", so it always terminates
// with a permutation of the input.
fn merge_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return items;
    }

    let mut order: Vec<usize> = (0..len).collect();
    let mut buffer = vec![0usize; len];
    let mut width = 1;

    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge_runs(
                &items,
                &order[start..mid],
                &order[mid..end],
                &mut buffer[start..end],
                compare,
            );
            start = end;
        }
        std::mem::swap(&mut order, &mut buffer);
        width *= 2;
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn merge_runs<T, F>(
    items: &[T],
    left: &[usize],
    right: &[usize],
    out: &mut [usize],
    compare: &mut F,
) where
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && compare(&items[left[i]], &items[right[j]]) != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<ImageRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ImageRecord::new(i as u64, *name))
            .collect()
    }

    fn names(items: &[ImageRecord]) -> Vec<&str> {
        items.iter().map(|i| i.fullname.as_str()).collect()
    }

    fn ids(items: &[ImageRecord]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_sort_by_name() {
        let sorted = sort_images(named(&["b", "a"]), SortDirection::Asc, compare_fullname);
        assert_eq!(names(&sorted), vec!["a", "b"]);

        let sorted = sort_images(named(&["b", "a"]), SortDirection::Desc, compare_fullname);
        assert_eq!(names(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_identity_cases() {
        let empty: Vec<ImageRecord> = Vec::new();
        assert!(sort_images(empty, SortDirection::Asc, compare_fullname).is_empty());

        let single = sort_images(named(&["only"]), SortDirection::Desc, compare_fullname);
        assert_eq!(names(&single), vec!["only"]);

        let sorted = sort_images(
            named(&["a", "b", "c", "d"]),
            SortDirection::Asc,
            compare_fullname,
        );
        assert_eq!(names(&sorted), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_name_sort_is_raw_not_normalized() {
        let sorted = sort_images(named(&["b", "B", "a"]), SortDirection::Asc, compare_fullname);
        assert_eq!(names(&sorted), vec!["B", "a", "b"]);
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let items = vec![
            ImageRecord::new(1, "x").with_disk_size(10),
            ImageRecord::new(2, "y").with_disk_size(5),
            ImageRecord::new(3, "z").with_disk_size(10),
            ImageRecord::new(4, "w"),
            ImageRecord::new(5, "v").with_disk_size(5),
        ];
        let cmp = SortField::DiskSize.comparator::<ImageRecord>();

        let asc = sort_images(items.clone(), SortDirection::Asc, cmp);
        assert_eq!(ids(&asc), vec![4, 2, 5, 1, 3]);

        let desc = sort_images(items, SortDirection::Desc, cmp);
        assert_eq!(ids(&desc), vec![1, 3, 2, 5, 4]);
    }

    #[test]
    fn test_missing_timestamp_sorts_first() {
        let items = vec![
            ImageRecord::new(1, "a").with_at("2021-05-01T00:00:00Z"),
            ImageRecord::new(2, "b"),
            ImageRecord::new(3, "c").with_at("2020-01-01"),
        ];
        let sorted = sort_images(items, SortDirection::Asc, compare_at);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_unparsable_timestamp_compares_equal() {
        let a = ImageRecord::new(1, "a").with_at("not a date");
        let b = ImageRecord::new(2, "b").with_at("2021-01-01T00:00:00Z");
        assert_eq!(compare_at(&a, &b), Ordering::Equal);
        assert_eq!(compare_at(&b, &a), Ordering::Equal);
    }

    #[test]
    fn test_mixed_timestamps_never_panic() {
        let stamps = [
            Some("2021-03-01T00:00:00Z"),
            Some("garbage"),
            None,
            Some("2019-01-01 10:00:00"),
            Some("2020-07-04T12:30:00+07:00"),
            Some("??"),
            Some("2018-12-31"),
            None,
        ];
        let items: Vec<ImageRecord> = stamps
            .iter()
            .enumerate()
            .map(|(i, at)| {
                let record = ImageRecord::new(i as u64, format!("img{i}"));
                match at {
                    Some(at) => record.with_at(*at),
                    None => record,
                }
            })
            .collect();

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_images(items.clone(), direction, compare_at);
            let mut seen = ids(&sorted);
            seen.sort_unstable();
            assert_eq!(seen, (0..8).collect::<Vec<u64>>());
        }
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(parse_timestamp("1970-01-01T00:00:01"), Some(1000));
        assert_eq!(parse_timestamp("1970-01-01 00:00:01.5"), Some(1500));
        assert_eq!(parse_timestamp("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_numeric_missing_is_zero() {
        let a = ImageRecord::new(1, "a");
        let b = ImageRecord::new(2, "b").with_dimensions(0, 0);
        assert_eq!(compare_numeric(&a, &b, SortField::Width), Ordering::Equal);
        // Non-numeric fields have no numeric key
        assert_eq!(compare_numeric(&a, &b, SortField::Filename), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_spec_with_references() {
        let items = vec![
            ImageRecord::new(1, "a").with_dimensions(300, 10),
            ImageRecord::new(2, "b").with_dimensions(100, 30),
            ImageRecord::new(3, "c").with_dimensions(200, 20),
        ];
        let refs: Vec<&ImageRecord> = items.iter().collect();
        let sorted = sort_by_spec(refs, &SortSpec::new(SortField::Height, SortDirection::Desc));

        assert_eq!(sorted.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        assert!(std::ptr::eq(sorted[2], &items[0]));
    }

    #[test]
    fn test_history_sorts_by_at() {
        use crate::model::ActionType;

        let entry = |id, at: &str| ImageHistory {
            id,
            at: at.to_string(),
            fullname: format!("f{id}"),
            backup_fullname: None,
            action_type: ActionType::Delete,
            by: None,
        };
        let sorted = sort_by_spec(
            vec![entry(1, "2021-02-01"), entry(2, "2021-01-01")],
            &SortSpec::new(SortField::At, SortDirection::Asc),
        );
        assert_eq!(sorted.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1]);
    }
}
