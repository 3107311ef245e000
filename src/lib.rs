//! `pst` extracts columns from several column-oriented text files, pastes them side by side row by
//! row, and optionally reduces every merged row to a set of statistics.
//!
//! The primary entrypoint is [`execution::ExecutionEngine::run`]; [`execution::paste_files`] wraps
//! it for the common "files in, writer out" case.
//!
//! ## How a run works
//!
//! - every source gets its own extractor thread that splits lines into fields and keeps the
//!   columns named by its [`types::ColumnSpec`] (optionally only the rows kept by a
//!   [`processing::RowFilter`])
//! - a single synchronizer takes exactly one field vector from each source per logical row, in
//!   source order, and concatenates them into a merged row
//! - the merged row is optionally projected through an [`types::OutputSpec`] and then either
//!   written as-is or reduced with the configured [`types::ComputeAction`]s
//!
//! Any extractor error (missing file, read failure, missing column, bad number) aborts the run;
//! rows written before the error stay written.
//!
//! ## Spec language
//!
//! Column and row selections use a small textual language, parsed by [`spec`]:
//!
//! - **input**: `0,2|1-3` keeps columns 0 and 2 of the first source and 1, 2, 3 of the second;
//!   with no input spec every source contributes its whole (trimmed) line
//! - **output**: `3,0` picks merged columns, in that order
//! - **rows**: `0-9,20` keeps rows 0 to 9 and row 20 (0-based, ranges inclusive)
//! - **compute**: `mean,var,std,min,max,median`
//!
//! ## Quick example
//!
//! ```rust
//! use pst::config::{PasteConfig, Spec};
//! use pst::execution::paste_files;
//!
//! # fn main() -> Result<(), pst::PasteError> {
//! let dir = std::env::temp_dir().join(format!("pst-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir)?;
//! let (a, b) = (dir.join("a.txt"), dir.join("b.txt"));
//! std::fs::write(&a, "1 2\n3 4\n")?;
//! std::fs::write(&b, "5 6\n7 8\n")?;
//!
//! let spec = Spec {
//!     input: "0,1".to_string(),
//!     compute: "mean".to_string(),
//!     ..Default::default()
//! };
//! let config = PasteConfig::from_spec(&spec, 2)?;
//! let out = paste_files(&config, &[&a, &b], Vec::new())?;
//! assert_eq!(
//!     String::from_utf8_lossy(&out),
//!     "3.500000000000000\n5.500000000000000\n"
//! );
//! # std::fs::remove_dir_all(&dir)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`spec`]: parsers for the selection language
//! - [`config`]: the immutable run configuration, built once from a [`config::Spec`]
//! - [`ingestion`]: sources and per-source column extraction
//! - [`processing`]: row filters, reducers and the running median
//! - [`execution`]: the concurrent engine, observers and metrics
//! - [`output`]: the buffered row sink
//! - [`error`]: error types used across the crate

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod output;
pub mod processing;
pub mod spec;
pub mod types;

pub use error::{PasteError, PasteResult, Severity};
