//! Core data model types.
//!
//! A run is described by one [`ColumnSpec`] per source, an optional [`OutputSpec`] over the merged
//! row, and an optional [`ComputeSpec`] that replaces each merged row with reducer outputs.

use std::fmt;
use std::ops::Deref;

/// Ordered list of column indices extracted from one source.
///
/// An empty spec is a sentinel meaning "emit the whole (trimmed) line as a single field".
/// Duplicated and out-of-order indices are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSpec(Vec<usize>);

impl ColumnSpec {
    /// Create a column spec from indices, kept in the given order.
    pub fn new(columns: Vec<usize>) -> Self {
        Self(columns)
    }

    /// The "whole line" sentinel.
    pub fn whole_line() -> Self {
        Self(Vec::new())
    }

    /// Whether this spec extracts the whole line.
    pub fn is_whole_line(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields this spec contributes to a merged row.
    pub fn width(&self) -> usize {
        if self.is_whole_line() { 1 } else { self.0.len() }
    }
}

impl Deref for ColumnSpec {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// Ordered list of indices into the merged row, used to reorder or duplicate output columns.
///
/// Empty means "pass the merged row through unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSpec(Vec<usize>);

impl OutputSpec {
    /// Create an output spec from indices, kept in the given order.
    pub fn new(columns: Vec<usize>) -> Self {
        Self(columns)
    }

    /// Whether this spec passes rows through unchanged.
    pub fn is_passthrough(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the output row for `merged` into `out`.
    ///
    /// Indices are validated against the merged width at startup, so indexing cannot fail here.
    pub fn project_into(&self, merged: &[String], out: &mut Vec<String>) {
        out.clear();
        out.extend(self.0.iter().map(|&c| merged[c].clone()));
    }
}

impl Deref for OutputSpec {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// A statistical reducer applied to a whole numeric row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeAction {
    /// Arithmetic mean.
    Mean,
    /// One-pass sample variance.
    Variance,
    /// Square root of the sample variance.
    Std,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Running (two-heap) median.
    Median,
}

impl ComputeAction {
    /// Parse a compute action from its textual name (surrounding whitespace is ignored).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "mean" => Some(Self::Mean),
            "var" => Some(Self::Variance),
            "std" => Some(Self::Std),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "median" => Some(Self::Median),
            _ => None,
        }
    }

    /// Textual name accepted by [`ComputeAction::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Variance => "var",
            Self::Std => "std",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
        }
    }
}

impl fmt::Display for ComputeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of reducers. Empty means "no reduction, emit the raw row".
pub type ComputeSpec = Vec<ComputeAction>;

/// What to do when one source runs out of rows before the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaggedPolicy {
    /// End the run cleanly as soon as any source is exhausted, discarding the partial row.
    #[default]
    Truncate,
    /// Substitute empty fields for exhausted sources until every source is exhausted.
    Pad,
}

/// The fields of one merged row, in source order.
///
/// The synchronizer owns one of these and refills it in place for every logical row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRow {
    fields: Vec<String>,
}

impl MergedRow {
    /// Create an empty row with room for `width` fields.
    pub fn with_capacity(width: usize) -> Self {
        Self {
            fields: Vec::with_capacity(width),
        }
    }

    /// Drop the previous row's fields, keeping the allocation.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Append one source's fields.
    pub fn extend_from_source(&mut self, fields: Vec<String>) {
        self.fields.extend(fields);
    }

    /// Append `width` empty placeholder fields for an exhausted source.
    pub fn pad(&mut self, width: usize) {
        self.fields.extend(std::iter::repeat_n(String::new(), width));
    }

    /// Fields of the row.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnSpec, ComputeAction, MergedRow, OutputSpec};

    #[test]
    fn column_spec_width_counts_whole_line_as_one() {
        assert_eq!(ColumnSpec::whole_line().width(), 1);
        assert_eq!(ColumnSpec::new(vec![3, 3, 0]).width(), 3);
    }

    #[test]
    fn output_spec_reorders_and_duplicates() {
        let merged: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let spec = OutputSpec::new(vec![2, 0, 0]);
        let mut out = Vec::new();
        spec.project_into(&merged, &mut out);
        assert_eq!(out, vec!["c", "a", "a"]);
    }

    #[test]
    fn compute_action_names_round_trip() {
        for action in [
            ComputeAction::Mean,
            ComputeAction::Variance,
            ComputeAction::Std,
            ComputeAction::Min,
            ComputeAction::Max,
            ComputeAction::Median,
        ] {
            assert_eq!(ComputeAction::from_name(action.name()), Some(action));
        }
        assert_eq!(ComputeAction::from_name(" median "), Some(ComputeAction::Median));
        assert_eq!(ComputeAction::from_name("mode"), None);
    }

    #[test]
    fn merged_row_is_reused_between_rows() {
        let mut row = MergedRow::with_capacity(3);
        row.extend_from_source(vec!["1".to_string(), "2".to_string()]);
        row.pad(1);
        assert_eq!(row.fields(), ["1", "2", ""]);
        row.clear();
        assert!(row.is_empty());
        row.extend_from_source(vec!["x".to_string()]);
        assert_eq!(row.len(), 1);
    }
}
