//! Error types for the Lancet library.
//!
//! All fallible operations return [`Result`], and every fatal condition
//! (bad root directory, unreadable document, malformed query, unknown
//! query term, degenerate build) is represented as a [`LancetError`]
//! variant. The library itself never terminates the process; the CLI
//! turns a returned error into a diagnostic and a non-zero exit status.

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Lancet operations.
#[derive(Error, Debug)]
pub enum LancetError {
    /// I/O errors (document reads, store file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index build errors (invalid root, empty corpus).
    #[error("Index error: {0}")]
    Index(String),

    /// Store format errors (corrupt or truncated store files).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Tokenization errors.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query errors (lexing, parsing, unknown terms).
    #[error("Query error: {0}")]
    Query(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with LancetError.
pub type Result<T> = std::result::Result<T, LancetError>;

impl LancetError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        LancetError::Index(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LancetError::Storage(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        LancetError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        LancetError::Query(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LancetError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LancetError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = LancetError::index("no documents found");
        assert_eq!(error.to_string(), "Index error: no documents found");

        let error = LancetError::query("unexpected character");
        assert_eq!(error.to_string(), "Query error: unexpected character");

        let error = LancetError::storage("truncated posting block");
        assert_eq!(error.to_string(), "Storage error: truncated posting block");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let lancet_error = LancetError::from(io_error);

        match lancet_error {
            LancetError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
