//! Document store abstraction
//!
//! The search layer consumes a document store through three primitives:
//!
//! 1. Selector find (equality, `$in`, range predicates, sort, limit)
//! 2. Inclusive key-range scan, ascending or descending, with limit
//! 3. Batch point lookup, optionally following page redirects
//!
//! The storage engine behind these primitives is not part of this crate.
//! `MemoryStore` is a reference implementation used by tests and tools.

mod errors;
mod filters;
mod memory;
mod selector;
mod sorter;

use std::future::Future;
use std::pin::Pin;

pub use errors::{StoreError, StoreResult};
pub use filters::PredicateFilter;
pub use memory::MemoryStore;
pub use selector::{FilterOp, FindQuery, KeyRange, Predicate, SortDirection, SortSpec};
pub use sorter::DocumentSorter;

use crate::visit::ResultSet;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Trait for the document store backing visit search
pub trait DocumentStore: Send + Sync {
    /// Finds documents matching a selector
    fn find<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, ResultSet>;

    /// Scans documents whose ids fall in an inclusive key range
    fn range_scan<'a>(&'a self, range: &'a KeyRange) -> StoreFuture<'a, ResultSet>;

    /// Looks up documents by id.
    ///
    /// Returns one row per requested id, in request order. Row ids are the
    /// requested ids; with `follow_redirects` the row's doc is the end of
    /// the redirect chain.
    fn batch_lookup<'a>(
        &'a self,
        ids: &'a [String],
        follow_redirects: bool,
    ) -> StoreFuture<'a, ResultSet>;
}
