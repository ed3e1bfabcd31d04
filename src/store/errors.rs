//! Store error types
//!
//! Error codes:
//! - AERO_STORE_UNAVAILABLE
//! - AERO_STORE_NOT_FOUND
//! - AERO_STORE_INVALID_QUERY
//! - AERO_STORE_REDIRECT_LOOP

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A point lookup referenced a missing document
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Query could not be evaluated
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Redirect chain revisits a page
    #[error("Redirect loop at page: {0}")]
    RedirectLoop(String),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "AERO_STORE_UNAVAILABLE",
            Self::NotFound(_) => "AERO_STORE_NOT_FOUND",
            Self::InvalidQuery(_) => "AERO_STORE_INVALID_QUERY",
            Self::RedirectLoop(_) => "AERO_STORE_REDIRECT_LOOP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::unavailable("x").code(), "AERO_STORE_UNAVAILABLE");
        assert_eq!(StoreError::not_found("x").code(), "AERO_STORE_NOT_FOUND");
        assert_eq!(StoreError::invalid_query("x").code(), "AERO_STORE_INVALID_QUERY");
        assert_eq!(
            StoreError::RedirectLoop("x".into()).code(),
            "AERO_STORE_REDIRECT_LOOP"
        );
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found("page/1");
        assert_eq!(err.to_string(), "Document not found: page/1");
    }
}
