//! Visit data model
//!
//! Visits are documents keyed by time. A visit references the page it
//! viewed through a `page: { _id }` stub that the search layer replaces
//! with the full page document.

mod key;
mod result;

pub use key::{encode_visit_key, extract_timestamp, VisitKey, MAX_TIMESTAMP, VISIT_KEY_PREFIX};
pub use result::{ResultRow, ResultSet};
