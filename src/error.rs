//! Error types for the searchbridge library.
//!
//! All errors are represented by the [`SearchBridgeError`] enum. Compile-time
//! errors (query, script, aggregation) indicate an invalid caller-constructed
//! request and are never caught inside the library; transport errors are
//! handled once per logical search by the executor.

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for searchbridge operations.
#[derive(Error, Debug)]
pub enum SearchBridgeError {
    /// I/O errors (network, file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Query compilation errors (malformed filter input)
    #[error("Query error: {0}")]
    Query(String),

    /// Script compilation errors (malformed scoring rule)
    #[error("Script error: {0}")]
    Script(String),

    /// Aggregation compilation errors (malformed aggregation request)
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Transport errors (engine unreachable, malformed response, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SearchBridgeError.
pub type Result<T> = std::result::Result<T, SearchBridgeError>;

impl SearchBridgeError {
    /// Create a new query compilation error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SearchBridgeError::Query(msg.into())
    }

    /// Create a new script compilation error.
    pub fn script<S: Into<String>>(msg: S) -> Self {
        SearchBridgeError::Script(msg.into())
    }

    /// Create a new aggregation compilation error.
    pub fn aggregation<S: Into<String>>(msg: S) -> Self {
        SearchBridgeError::Aggregation(msg.into())
    }

    /// Create a new transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        SearchBridgeError::Transport(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SearchBridgeError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SearchBridgeError::query("bad filter");
        assert_eq!(error.to_string(), "Query error: bad filter");

        let error = SearchBridgeError::script("bad rule");
        assert_eq!(error.to_string(), "Script error: bad rule");

        let error = SearchBridgeError::transport("connection refused");
        assert_eq!(error.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let error = SearchBridgeError::from(io_error);

        match error {
            SearchBridgeError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
