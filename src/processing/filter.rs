//! Row filtering by row-index intervals.

/// An inclusive row-index interval `(begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowRange {
    /// First row (0-based, inclusive).
    pub begin: usize,
    /// Last row (inclusive).
    pub end: usize,
}

impl RowRange {
    /// Create a range. Callers guarantee `begin <= end`.
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "row range end {end} is before begin {begin}");
        Self { begin, end }
    }
}

/// Set of row intervals deciding which rows are processed.
///
/// Ranges are sorted by `begin` on construction; membership is a linear scan that stops at the
/// first range starting past the row. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    ranges: Vec<RowRange>,
}

impl RowFilter {
    /// Build a filter from ranges in any order. Overlapping ranges are allowed.
    pub fn new(mut ranges: Vec<RowRange>) -> Self {
        ranges.sort_by_key(|r| r.begin);
        Self { ranges }
    }

    /// A filter that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether this filter matches every row.
    pub fn matches_all(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Sorted ranges.
    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    /// Whether `row` should be processed.
    pub fn contains(&self, row: usize) -> bool {
        if self.ranges.is_empty() {
            return true;
        }
        for r in &self.ranges {
            if row < r.begin {
                return false;
            }
            if row <= r.end {
                return true;
            }
        }
        false
    }

    /// Largest row index any range can match; `usize::MAX` (unbounded) for an empty filter.
    ///
    /// Extractors stop reading once past this row.
    pub fn max_entry(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| r.end)
            .max()
            .unwrap_or(usize::MAX)
    }
}
