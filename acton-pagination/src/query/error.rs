//! Query execution error types
//!
//! Executors report failures as a [`QueryError`]. Paginators propagate them
//! unchanged and never retry; callers may consult
//! [`QueryError::is_retriable`].
//!
//! # Example
//!
//! ```rust
//! use acton_pagination::query::{QueryError, QueryErrorKind, QueryOperation};
//!
//! let error = QueryError::timeout(QueryOperation::Count, "statement timeout");
//! assert!(matches!(error.kind, QueryErrorKind::Timeout));
//! assert!(error.is_retriable());
//! ```

use std::fmt;

/// Operation being performed when the query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    /// Fetching rows
    Fetch,
    /// Counting rows
    Count,
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// Category of query error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// Failed to connect to the database
    ConnectionFailed,
    /// Query timed out
    Timeout,
    /// Underlying database error
    DatabaseError,
    /// Row could not be decoded
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured query error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The operation being performed when the error occurred
    pub operation: QueryOperation,
    /// The category of error
    pub kind: QueryErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl QueryError {
    /// Create a new query error
    pub fn new(operation: QueryOperation, kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::ConnectionFailed, message)
    }

    /// Create a timeout error
    pub fn timeout(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::Timeout, message)
    }

    /// Create a database error
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_pagination::query::{QueryError, QueryOperation};
    ///
    /// let error = QueryError::database_error(QueryOperation::Fetch, "relation does not exist");
    /// assert!(!error.is_retriable());
    /// ```
    pub fn database_error(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::DatabaseError, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, QueryErrorKind::SerializationError, message)
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: QueryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is transient and may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            QueryErrorKind::ConnectionFailed | QueryErrorKind::Timeout
        )
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error = QueryError::database_error(QueryOperation::Fetch, "syntax error");
        assert_eq!(
            error.to_string(),
            "Query database_error error during fetch: syntax error"
        );
    }

    #[test]
    fn test_is_retriable() {
        assert!(QueryError::connection_failed(QueryOperation::Fetch, "refused").is_retriable());
        assert!(QueryError::timeout(QueryOperation::Count, "slow").is_retriable());
        assert!(!QueryError::database_error(QueryOperation::Fetch, "bad").is_retriable());
        assert!(!QueryError::serialization_error(QueryOperation::Fetch, "bad row").is_retriable());
        assert!(
            !QueryError::new(QueryOperation::Count, QueryErrorKind::Other, "?").is_retriable()
        );
    }

    #[test]
    fn test_with_operation() {
        let error = QueryError::timeout(QueryOperation::Fetch, "slow")
            .with_operation(QueryOperation::Count);
        assert_eq!(error.operation, QueryOperation::Count);
        assert_eq!(error.kind, QueryErrorKind::Timeout);
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&QueryError::timeout(QueryOperation::Fetch, "slow"));
    }
}
