use thiserror::Error;

/// Convenience result type for paste operations.
pub type PasteResult<T> = Result<T, PasteError>;

/// Error type returned by configuration, extraction, merging and reduction.
///
/// A single enum is shared by every stage of a run. Configuration errors are raised before any
/// source is opened; source errors travel from the extractor threads to the synchronizer over the
/// shared error channel.
#[derive(Debug, Error)]
pub enum PasteError {
    /// Inconsistent settings detected at startup (out-of-bounds output column, too many per-source
    /// column specs, unknown compute action, ...).
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A range-spec token could not be parsed.
    #[error("malformed spec '{input}': {message}")]
    Format { input: String, message: String },

    /// A source could not be opened.
    #[error("cannot open source '{source_name}': {error}")]
    SourceOpen {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// Reading a source failed part way through.
    #[error("error reading source '{source_name}': {error}")]
    SourceScan {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// A line had fewer fields than a requested column index.
    #[error("error parsing source '{source_name}': requested column {column} does not exist (row {row})")]
    ColumnOutOfRange {
        source_name: String,
        column: usize,
        row: usize,
    },

    /// A merged field could not be converted to a float in statistics mode.
    #[error("cannot convert field '{field}' to a number: {message}")]
    NumericConversion { field: String, message: String },

    /// Writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Severity classification used by observers and alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the run failed because of its input).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl PasteError {
    /// Build a [`PasteError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn format(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Classify this error for observers.
    pub fn severity(&self) -> Severity {
        match self {
            PasteError::Io(_) | PasteError::SourceOpen { .. } | PasteError::SourceScan { .. } => {
                Severity::Critical
            }
            PasteError::Config { .. }
            | PasteError::Format { .. }
            | PasteError::ColumnOutOfRange { .. }
            | PasteError::NumericConversion { .. } => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PasteError, Severity};

    #[test]
    fn io_rooted_errors_are_critical() {
        let err = PasteError::SourceOpen {
            source_name: "missing.txt".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.severity(), Severity::Critical);
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn input_errors_are_not_critical() {
        let err = PasteError::ColumnOutOfRange {
            source_name: "a.txt".to_string(),
            column: 7,
            row: 3,
        };
        assert_eq!(err.severity(), Severity::Error);
        let msg = err.to_string();
        assert!(msg.contains("a.txt"));
        assert!(msg.contains("requested column 7"));
    }
}
