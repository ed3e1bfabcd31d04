//! aerohistory - Browsing-history visit search over a time-keyed document store
//!
//! Visits are keyed by timestamp, so every temporal query is a key-range
//! query. The search layer joins visits with their pages and can widen a
//! result with the visits around each hit.

pub mod config;
pub mod observability;
pub mod search;
pub mod store;
pub mod visit;

pub use config::{ContextOptions, HistoryConfig};
pub use search::{DateRange, HistorySearch, JoinMode, SearchError, SearchResult};
pub use store::{DocumentStore, MemoryStore, StoreError};
pub use visit::{ResultRow, ResultSet, VisitKey};
