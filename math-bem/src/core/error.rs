//! Error types for grid construction, function spaces and potential evaluation.

use thiserror::Error;

/// Errors raised by the potential evaluation library.
#[derive(Debug, Error)]
pub enum BemError {
    /// The grid data is inconsistent (bad indices, degenerate triangles, ...)
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The function space could not be built or does not match
    #[error("invalid function space: {0}")]
    InvalidSpace(String),

    /// An array does not have the expected size
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// A parameter is outside its valid range
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A file format or extension is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A mesh or data file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The rayon thread pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for potential evaluation.
pub type Result<T> = std::result::Result<T, BemError>;

impl BemError {
    /// Returns `true` if the error was caused by the caller's input
    /// rather than by the environment (IO, threads).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BemError::InvalidGrid(_)
                | BemError::InvalidSpace(_)
                | BemError::DimensionMismatch { .. }
                | BemError::InvalidParameters(_)
                | BemError::UnsupportedFormat(_)
                | BemError::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BemError::DimensionMismatch {
            what: "coefficients",
            expected: 12,
            got: 10,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch for coefficients: expected 12, got 10"
        );
    }

    #[test]
    fn test_is_input_error() {
        let grid_err = BemError::InvalidGrid("empty".to_string());
        let io_err = BemError::Io(std::io::Error::other("disk"));

        assert!(grid_err.is_input_error());
        assert!(!io_err.is_input_error());
    }
}
