//! Error types for the SVL compiler.

use std::fmt;

use thiserror::Error;

/// Result type alias for SVL operations.
pub type Result<T> = std::result::Result<T, SvlError>;

/// The refined kind of a syntax error, determined by matching the parse
/// failure against the example-error bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Unclassified parse failure.
    Generic,
    /// A declaration is missing its value (field, dataset, string payload).
    MissingValue,
    /// Missing or mismatched parens.
    MissingParen,
    /// A declaration received a payload of the wrong type.
    TypeError,
    /// A declaration that the chart type does not support.
    UnsupportedDeclaration,
    /// Invalid or unsupported temporal unit.
    InvalidTimeUnit,
    /// Aggregation function is not supported.
    InvalidAggregation,
    /// Sort specifier other than ASC or DESC.
    InvalidSort,
}

impl SyntaxErrorKind {
    /// Human-readable label, printed ahead of the failure location.
    pub fn label(&self) -> &'static str {
        match self {
            SyntaxErrorKind::Generic => "Syntax error",
            SyntaxErrorKind::MissingValue => "Missing value",
            SyntaxErrorKind::MissingParen => "Missing paren",
            SyntaxErrorKind::TypeError => "Incorrect type",
            SyntaxErrorKind::UnsupportedDeclaration => {
                "Invalid declaration for this chart type"
            }
            SyntaxErrorKind::InvalidTimeUnit => "Time unit invalid or unsupported",
            SyntaxErrorKind::InvalidAggregation => "Aggregation invalid or not supported",
            SyntaxErrorKind::InvalidSort => "Sort can only be ASC or DESC",
        }
    }
}

/// A classified syntax error with the source context where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Which refined kind of failure this is.
    pub kind: SyntaxErrorKind,
    /// The offending source line with a caret marking the column.
    pub context: String,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {} \n\n{}",
            self.kind.label(),
            self.line,
            self.column,
            self.context
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Main error type for the SVL compiler.
#[derive(Error, Debug)]
pub enum SvlError {
    /// A parse failure, refined by the error classifier.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    /// A file declared as a dataset does not exist.
    #[error("File {0} does not exist.")]
    MissingFile(String),

    /// A plot references a dataset that was never declared, or no file
    /// dataset was declared at all.
    #[error("{0}")]
    MissingDataset(String),

    /// One or more plot validation rules fired.
    #[error("Plot error: {0}")]
    Plot(String),

    /// The relational engine failed while loading a dataset.
    #[error("Error loading data: {0}.")]
    DataLoad(String),

    /// The relational engine failed while executing a plot query, or the
    /// query produced no rows.
    #[error("Error processing plot data: {0}")]
    DataProcessing(String),

    /// The selected backend has not been implemented.
    #[error("Unable to use {0} as a backend.")]
    NotImplemented(String),

    /// A malformed command-line dataset binding or other bad invocation.
    #[error("{0}")]
    Specification(String),

    /// Underlying IO failure while reading source or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SvlError {
    /// One-line category label used by the CLI to prefix the message.
    pub fn category(&self) -> &'static str {
        match self {
            SvlError::Syntax(_) => "Syntax error",
            SvlError::MissingFile(_) => "Missing file error",
            SvlError::MissingDataset(_) => "Missing dataset error",
            SvlError::Plot(_) => "Plot error",
            SvlError::DataLoad(_) => "Data load error",
            SvlError::DataProcessing(_) => "Data processing error",
            SvlError::NotImplemented(_) => "Not implemented error",
            SvlError::Specification(_) => "Specification error",
            SvlError::Io(_) => "IO error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError {
            kind: SyntaxErrorKind::MissingValue,
            context: "DATASETS \"bigfoot.csv\"\n         ^".to_string(),
            line: 1,
            column: 10,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Missing value at line 1, column 10"));
        assert!(msg.contains("bigfoot.csv"));
    }

    #[test]
    fn test_error_categories() {
        let err = SvlError::MissingFile("bigfoot.csv".to_string());
        assert_eq!(err.category(), "Missing file error");
        assert_eq!(err.to_string(), "File bigfoot.csv does not exist.");

        let err = SvlError::NotImplemented("vega".to_string());
        assert_eq!(err.to_string(), "Unable to use vega as a backend.");
    }
}
