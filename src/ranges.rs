//! Sorted, merged sets of half-open byte ranges.

use std::ops::Range;

/// A set of `[start, end)` offsets kept sorted and disjoint.
///
/// Ranges may be inserted in any order and may overlap or touch; they are
/// merged on insertion, so two sets built from the same ranges in different
/// orders compare equal. Empty ranges are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    /// Sorted, non-overlapping, non-touching, non-empty ranges.
    ranges: Vec<Range<usize>>,
}

impl RangeSet {
    /// An empty set.
    pub const fn new() -> Self {
        return Self { ranges: Vec::new() };
    }

    /// Add a range, merging it with any range it overlaps or touches.
    pub fn insert(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }

        // Everything in `first..last` overlaps or touches `range`.
        let first = self.ranges.partition_point(|r| return r.end < range.start);
        let last = self.ranges.partition_point(|r| return r.start <= range.end);

        let mut merged = range;
        if let Some(overlapping) = self.ranges.get(first..last) {
            if let Some(head) = overlapping.first() {
                merged.start = merged.start.min(head.start);
            }
            if let Some(tail) = overlapping.last() {
                merged.end = merged.end.max(tail.end);
            }
        }
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    /// Whether `offset` lies inside any range.
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| return r.end <= offset);
        return self.ranges.get(idx).is_some_and(|r| return r.start <= offset);
    }

    /// Iterate the merged ranges in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Range<usize>> {
        return self.ranges.iter();
    }

    /// Number of merged ranges.
    pub fn len(&self) -> usize {
        return self.ranges.len();
    }

    /// Whether the set holds no ranges.
    pub fn is_empty(&self) -> bool {
        return self.ranges.is_empty();
    }
}

impl Extend<Range<usize>> for RangeSet {
    fn extend<I: IntoIterator<Item = Range<usize>>>(&mut self, iter: I) {
        for range in iter {
            self.insert(range);
        }
    }
}

impl FromIterator<Range<usize>> for RangeSet {
    fn from_iter<I: IntoIterator<Item = Range<usize>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        return set;
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type IntoIter = std::slice::Iter<'a, Range<usize>>;
    type Item = &'a Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        return self.iter();
    }
}
