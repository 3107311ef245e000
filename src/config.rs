//! Run configuration.
//!
//! [`Spec`] holds the user's textual settings, either built in code, filled from command-line
//! flags, or loaded from JSON. [`PasteConfig::from_spec`] validates it once, before any source is
//! opened, into the immutable value shared by every stage of the run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PasteError, PasteResult};
use crate::ingestion::Separator;
use crate::processing::RowFilter;
use crate::spec::{expand_input_spec, parse_compute_spec, parse_output_spec, parse_row_spec};
use crate::types::{ColumnSpec, ComputeSpec, OutputSpec, RaggedPolicy};

/// Textual description of what to extract and how to assemble the output.
///
/// Every field is optional in JSON; missing fields take their [`Default`] values.
///
/// ```rust
/// use pst::config::Spec;
///
/// let spec: Spec = serde_json::from_str(r#"{ "input": "0,1|3", "compute": "mean,var" }"#).unwrap();
/// assert_eq!(spec.output_sep, " ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spec {
    /// Per-source column specs, `|`-separated. Empty extracts whole lines.
    pub input: String,
    /// Output column order over the merged row. Empty passes rows through.
    pub output: String,
    /// Input separator characters. Empty splits on whitespace.
    pub input_sep: String,
    /// Output separator.
    pub output_sep: String,
    /// Comma-separated compute actions. Empty prints raw rows.
    pub compute: String,
    /// Rows to process. Empty processes every row.
    pub rows: String,
    /// Pad exhausted sources with empty fields instead of stopping at the shortest source.
    pub pad: bool,
}

impl Default for Spec {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            input_sep: String::new(),
            output_sep: " ".to_string(),
            compute: String::new(),
            rows: String::new(),
            pad: false,
        }
    }
}

impl Spec {
    /// Load a spec from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PasteResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            PasteError::config(format!("invalid spec file {}: {e}", path.display()))
        })
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteConfig {
    /// One column spec per source, in source order.
    pub columns: Vec<ColumnSpec>,
    /// Output column order.
    pub output: OutputSpec,
    /// Rows to process.
    pub rows: RowFilter,
    /// Input field separator.
    pub separator: Separator,
    /// Output separator.
    pub output_sep: String,
    /// Reducers; empty prints raw rows.
    pub compute: ComputeSpec,
    /// Behavior when sources have different lengths.
    pub ragged: RaggedPolicy,
}

impl PasteConfig {
    /// Validate `spec` for `num_sources` input sources.
    pub fn from_spec(spec: &Spec, num_sources: usize) -> PasteResult<Self> {
        if num_sources == 0 {
            return Err(PasteError::config("at least one input source is required"));
        }

        let columns = expand_input_spec(&spec.input, num_sources)?;
        let total = columns.iter().map(ColumnSpec::width).sum();
        let output = parse_output_spec(&spec.output, total)?;
        let rows = parse_row_spec(&spec.rows)?;
        let compute = parse_compute_spec(&spec.compute)?;

        Ok(Self {
            columns,
            output,
            rows,
            separator: Separator::from_chars(&spec.input_sep),
            output_sep: spec.output_sep.clone(),
            compute,
            ragged: if spec.pad {
                RaggedPolicy::Pad
            } else {
                RaggedPolicy::Truncate
            },
        })
    }

    /// Number of sources this configuration was built for.
    pub fn num_sources(&self) -> usize {
        self.columns.len()
    }

    /// Width of a merged row before the output spec is applied.
    pub fn merged_width(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{PasteConfig, Spec};
    use crate::error::PasteError;
    use crate::types::{ColumnSpec, ComputeAction, RaggedPolicy};

    #[test]
    fn from_spec_pads_columns_and_counts_width() {
        let spec = Spec {
            input: "0,1|3".to_string(),
            output: "3,0".to_string(),
            compute: "mean".to_string(),
            ..Default::default()
        };
        let cfg = PasteConfig::from_spec(&spec, 3).unwrap();
        assert_eq!(cfg.num_sources(), 3);
        assert_eq!(cfg.columns[2], ColumnSpec::new(vec![3]));
        assert_eq!(cfg.merged_width(), 4);
        assert_eq!(cfg.compute, vec![ComputeAction::Mean]);
        assert_eq!(cfg.ragged, RaggedPolicy::Truncate);
    }

    #[test]
    fn output_index_must_fit_merged_width() {
        let spec = Spec {
            input: "0,1|3".to_string(),
            output: "4".to_string(),
            ..Default::default()
        };
        let err = PasteConfig::from_spec(&spec, 2).unwrap_err();
        assert!(matches!(err, PasteError::Config { .. }));
    }

    #[test]
    fn whole_line_sources_count_as_one_column() {
        let spec = Spec {
            output: "1,0".to_string(),
            ..Default::default()
        };
        let cfg = PasteConfig::from_spec(&spec, 2).unwrap();
        assert_eq!(cfg.merged_width(), 2);
    }

    #[test]
    fn zero_sources_is_rejected() {
        assert!(PasteConfig::from_spec(&Spec::default(), 0).is_err());
    }

    #[test]
    fn spec_loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        std::fs::write(&path, r#"{ "input": "0", "rows": "1-2", "pad": true }"#).unwrap();

        let spec = Spec::from_json_path(&path).unwrap();
        assert_eq!(spec.input, "0");
        assert!(spec.pad);

        let cfg = PasteConfig::from_spec(&spec, 1).unwrap();
        assert_eq!(cfg.ragged, RaggedPolicy::Pad);
        assert!(cfg.rows.contains(2));
        assert!(!cfg.rows.contains(0));
    }
}
