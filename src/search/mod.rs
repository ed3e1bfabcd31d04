//! Visit search
//!
//! # Operations
//!
//! - `last_visits`: most recent N visits, pages nested in
//! - `find_visits_to_pages`: visits to known pages within a date window
//! - `add_visits_context`: surround each visit with its neighbours in time
//! - `insert_pages_into_visits`: the page joiner the others build on
//!
//! # Guarantees
//!
//! - Store failures are propagated unchanged, never retried
//! - A visit whose page cannot be found fails the operation
//! - Context output is duplicate-free by visit id and sorted newest first,
//!   independent of the order concurrent fetches complete in

mod context;
mod errors;
mod history;
mod join;
mod merge;
mod range;
mod recent;

pub use context::{preceding_range, succeeding_range};
pub use errors::{SearchError, SearchResult};
pub use history::HistorySearch;
pub use join::{insert_pages, page_ids, JoinMode};
pub use merge::{merge_by_priority, sort_by_recency};
pub use range::{visits_to_pages_query, DateRange};
pub use recent::recent_visits_query;
