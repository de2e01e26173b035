//! Error types for squill.

use thiserror::Error;

/// Result type alias for squill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for query construction and execution.
#[derive(Debug, Error)]
pub enum Error {
    /// `execute()` was called on a query with no bound connection. This is
    /// programmer misuse, not a recoverable condition.
    #[error("cannot execute without a bound connection")]
    MissingConnection,

    /// A value was passed where a scalar or term was expected but cannot be
    /// normalized into one (e.g. a JSON array). Raised at construction time.
    #[error("unsupported operand: {0}")]
    UnsupportedOperand(String),

    /// Error obtaining a cursor from the connection collaborator.
    #[error("connection error: {0}")]
    Connection(String),

    /// Error executing or fetching through the cursor collaborator.
    #[error("query error: {0}")]
    Query(String),
}

impl Error {
    /// Create an unsupported-operand error.
    pub fn unsupported_operand(message: impl Into<String>) -> Self {
        Self::UnsupportedOperand(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }
}
