//! Parsers for the range-spec mini-language.
//!
//! A range spec is a comma-separated list of tokens, each either `a` (the single index `a`) or
//! `a-b` (the inclusive interval `a..=b`). Input specs hold one range list per source, separated by
//! `|`:
//!
//! ```text
//! 0,1-3,10|14,7,2|1,1-4
//! ```
//!
//! Order is preserved exactly as written; duplicates are kept.

use crate::error::{PasteError, PasteResult};
use crate::processing::{RowFilter, RowRange};
use crate::types::{ColumnSpec, ComputeAction, ComputeSpec, OutputSpec};

/// Parse a single `a` or `a-b` token into its inclusive bounds.
pub fn parse_range(token: &str) -> PasteResult<(usize, usize)> {
    let token = token.trim();
    let parts: Vec<&str> = token.split('-').collect();
    match parts.as_slice() {
        [single] => {
            let v = parse_index(single, token)?;
            Ok((v, v))
        }
        [begin, end] => {
            let b = parse_index(begin, token)?;
            let e = parse_index(end, token)?;
            if e < b {
                return Err(PasteError::format(
                    token,
                    "the end of the interval is smaller than its beginning",
                ));
            }
            Ok((b, e))
        }
        _ => Err(PasteError::format(token, "incorrect range specification")),
    }
}

fn parse_index(raw: &str, token: &str) -> PasteResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        PasteError::format(
            token,
            format!("could not convert '{}' into a non-negative integer", raw.trim()),
        )
    })
}

/// Parse a comma-separated range list into the expanded, ordered index sequence.
///
/// `"0,1-3,10"` becomes `[0, 1, 2, 3, 10]`.
pub fn parse_index_list(text: &str) -> PasteResult<Vec<usize>> {
    let mut out = Vec::new();
    for token in text.split(',') {
        if token.trim().is_empty() {
            return Err(PasteError::format(text, "empty range entry"));
        }
        let (b, e) = parse_range(token)?;
        out.extend(b..=e);
    }
    Ok(out)
}

/// Parse a `|`-separated input spec into one [`ColumnSpec`] per entry.
///
/// An empty string yields a single whole-line spec.
pub fn parse_input_spec(text: &str) -> PasteResult<Vec<ColumnSpec>> {
    if text.trim().is_empty() {
        return Ok(vec![ColumnSpec::whole_line()]);
    }
    text.split('|')
        .map(|entry| parse_index_list(entry).map(ColumnSpec::new))
        .collect()
}

/// Parse an input spec and stretch it to `num_sources` entries.
///
/// The last spec is replicated for the remaining sources. More specs than sources is a
/// configuration error.
pub fn expand_input_spec(text: &str, num_sources: usize) -> PasteResult<Vec<ColumnSpec>> {
    let mut specs = parse_input_spec(text)?;
    if specs.len() > num_sources {
        return Err(PasteError::config(format!(
            "there are more per-source column specifiers ({}) than input sources ({num_sources})",
            specs.len()
        )));
    }
    if let Some(last) = specs.last().cloned() {
        specs.resize(num_sources, last);
    }
    Ok(specs)
}

/// Parse an output spec and check every index against the merged row width.
pub fn parse_output_spec(text: &str, total_columns: usize) -> PasteResult<OutputSpec> {
    if text.trim().is_empty() {
        return Ok(OutputSpec::default());
    }
    let cols = parse_index_list(text)?;
    if let Some(&bad) = cols.iter().find(|&&c| c >= total_columns) {
        return Err(PasteError::config(format!(
            "output column {bad} is out of bounds: only {total_columns} columns are extracted"
        )));
    }
    Ok(OutputSpec::new(cols))
}

/// Parse a row spec (`"1,2,4-8,22"`) into a sorted [`RowFilter`].
pub fn parse_row_spec(text: &str) -> PasteResult<RowFilter> {
    if text.trim().is_empty() {
        return Ok(RowFilter::all());
    }
    let ranges = text
        .split(',')
        .map(|token| parse_range(token).map(|(b, e)| RowRange::new(b, e)))
        .collect::<PasteResult<Vec<_>>>()?;
    Ok(RowFilter::new(ranges))
}

/// Parse a comma-separated list of compute action names (`"mean, std, median"`).
pub fn parse_compute_spec(text: &str) -> PasteResult<ComputeSpec> {
    if text.trim().is_empty() {
        return Ok(ComputeSpec::new());
    }
    text.split(',')
        .map(|name| {
            ComputeAction::from_name(name).ok_or_else(|| {
                PasteError::config(format!("unknown compute action '{}'", name.trim()))
            })
        })
        .collect()
}
