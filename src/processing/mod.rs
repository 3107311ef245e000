//! Per-row processing: row selection and statistics.
//!
//! Currently implemented:
//!
//! - [`RowFilter`]: which 0-based rows of every source are processed
//! - [`reduce()`] / [`compute_row()`]: mean, variance, std, min, max and median of a numeric row
//! - [`RunningMedian`]: the two-heap streaming median behind the `median` reducer
//!
//! ## Example: reduce a merged row
//!
//! ```rust
//! use pst::processing::compute_row;
//! use pst::types::ComputeAction;
//!
//! let row: Vec<String> = ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect();
//! let out = compute_row(&row, &[ComputeAction::Mean, ComputeAction::Median]).unwrap();
//! assert_eq!(out, vec![2.5, 2.5]);
//! ```

pub mod filter;
pub mod median;
pub mod reduce;

pub use filter::{RowFilter, RowRange};
pub use median::RunningMedian;
pub use reduce::{compute_row, parse_floats, reduce};
