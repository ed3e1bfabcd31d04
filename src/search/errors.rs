//! Search error types
//!
//! Error codes:
//! - AERO_STORE_* (store failures, passed through unchanged)
//! - AERO_SEARCH_PAGE_NOT_FOUND
//! - AERO_SEARCH_POSITIONAL_MISMATCH
//! - AERO_SEARCH_MISSING_PAGE_REF
//! - AERO_SEARCH_MALFORMED_VISIT_KEY

use thiserror::Error;

use crate::store::StoreError;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised by visit search
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A visit references a page absent from the page set
    #[error("Page {page_id} referenced by visit {visit_id} is missing from the page set")]
    PageNotFound { visit_id: String, page_id: String },

    /// Positional join inputs are not aligned
    #[error("Positional join needs one page per visit: {visits} visits, {pages} pages")]
    PositionalMismatch { visits: usize, pages: usize },

    /// A visit document has no `page._id`
    #[error("Visit {0} has no page reference")]
    MissingPageRef(String),

    /// A visit id does not decode to a timestamp
    #[error("Malformed visit key: {0}")]
    MalformedVisitKey(String),
}

impl SearchError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.code(),
            Self::PageNotFound { .. } => "AERO_SEARCH_PAGE_NOT_FOUND",
            Self::PositionalMismatch { .. } => "AERO_SEARCH_POSITIONAL_MISMATCH",
            Self::MissingPageRef(_) => "AERO_SEARCH_MISSING_PAGE_REF",
            Self::MalformedVisitKey(_) => "AERO_SEARCH_MALFORMED_VISIT_KEY",
        }
    }

    /// Returns true for errors caused by inconsistent data or caller
    /// inputs rather than by the store
    pub fn is_data_integrity(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_pass_through() {
        let err: SearchError = StoreError::unavailable("disk gone").into();
        assert_eq!(err.code(), "AERO_STORE_UNAVAILABLE");
        assert_eq!(err.to_string(), "Store unavailable: disk gone");
        assert!(!err.is_data_integrity());
    }

    #[test]
    fn test_integrity_errors() {
        let err = SearchError::PageNotFound {
            visit_id: "visit/1".into(),
            page_id: "page/x".into(),
        };
        assert_eq!(err.code(), "AERO_SEARCH_PAGE_NOT_FOUND");
        assert!(err.is_data_integrity());
        assert!(err.to_string().contains("page/x"));

        let err = SearchError::PositionalMismatch { visits: 3, pages: 2 };
        assert_eq!(err.code(), "AERO_SEARCH_POSITIONAL_MISMATCH");
    }
}
