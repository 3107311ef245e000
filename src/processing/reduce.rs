//! Row reducers: convert a merged row to numbers and apply [`ComputeAction`]s.

use crate::error::{PasteError, PasteResult};
use crate::types::ComputeAction;

use super::median::RunningMedian;

/// Apply a single reducer to a numeric row.
pub fn reduce(values: &[f64], action: ComputeAction) -> f64 {
    match action {
        ComputeAction::Mean => mean(values),
        ComputeAction::Variance => variance(values),
        ComputeAction::Std => variance(values).sqrt(),
        ComputeAction::Min => min(values),
        ComputeAction::Max => max(values),
        ComputeAction::Median => median(values),
    }
}

/// Convert `fields` to floats and apply every action in order, one output per action.
///
/// Fails with [`PasteError::NumericConversion`] naming the first field that is not a number.
pub fn compute_row(fields: &[String], actions: &[ComputeAction]) -> PasteResult<Vec<f64>> {
    let values = parse_floats(fields)?;
    Ok(actions.iter().map(|&a| reduce(&values, a)).collect())
}

/// Parse every (whitespace-trimmed) field as `f64`.
pub fn parse_floats(fields: &[String]) -> PasteResult<Vec<f64>> {
    fields
        .iter()
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| PasteError::NumericConversion {
                    field: raw.clone(),
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Arithmetic mean. NaN for an empty row.
pub fn mean(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    sum / values.len() as f64
}

/// One-pass sample variance (divisor `n - 1`); `0.0` for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    // mk: running mean, qk: running sum of squared deviations
    let mut mk = 0.0_f64;
    let mut qk = 0.0_f64;
    for (i, &x) in values.iter().enumerate() {
        let k = (i + 1) as f64;
        qk += (k - 1.0) * (x - mk) * (x - mk) / k;
        mk += (x - mk) / k;
    }
    if values.len() > 1 {
        qk / (values.len() - 1) as f64
    } else {
        0.0
    }
}

/// Smallest value; `f64::MAX` for an empty row.
pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(f64::MAX, |acc, &v| if v < acc { v } else { acc })
}

/// Largest value; `-f64::MAX` for an empty row.
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(-f64::MAX, |acc, &v| if v > acc { v } else { acc })
}

/// Median computed by streaming every value through a [`RunningMedian`].
pub fn median(values: &[f64]) -> f64 {
    let mut m = RunningMedian::new();
    m.extend(values.iter().copied());
    m.value()
}
