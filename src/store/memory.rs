//! In-memory document store
//!
//! Documents live in a BTreeMap keyed by `_id`, which gives key-range scans
//! the same ordering a persistent store's primary index would.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::filters::PredicateFilter;
use super::selector::{FindQuery, KeyRange, SortDirection};
use super::sorter::DocumentSorter;
use super::{DocumentStore, StoreFuture};
use crate::visit::{ResultRow, ResultSet};

/// Field marking a page as redirected to another page
pub const REDIRECT_FIELD: &str = "seeInstead";

/// In-memory implementation of `DocumentStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Value>>,
    failing_finds: AtomicUsize,
    failing_range_scans: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with documents.
    ///
    /// Every document must carry a string `_id`.
    pub fn with_docs(docs: impl IntoIterator<Item = Value>) -> StoreResult<Self> {
        let mut map = BTreeMap::new();
        for doc in docs {
            let id = doc_id(&doc)?;
            map.insert(id, doc);
        }
        Ok(Self {
            docs: RwLock::new(map),
            ..Self::default()
        })
    }

    /// Inserts or replaces a document, returning its id
    pub async fn insert(&self, doc: Value) -> StoreResult<String> {
        let id = doc_id(&doc)?;
        self.docs.write().await.insert(id.clone(), doc);
        Ok(id)
    }

    /// Returns the number of stored documents
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Returns true if the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Makes the next `count` find calls fail with `Unavailable`
    pub fn fail_next_finds(&self, count: usize) {
        self.failing_finds.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` range scans fail with `Unavailable`
    pub fn fail_next_range_scans(&self, count: usize) {
        self.failing_range_scans.store(count, Ordering::SeqCst);
    }

    fn injected_failure(counter: &AtomicUsize, op: &str) -> StoreResult<()> {
        let tripped = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            return Err(StoreError::unavailable(format!("injected {} failure", op)));
        }
        Ok(())
    }

    fn resolve_page<'d>(
        docs: &'d BTreeMap<String, Value>,
        id: &str,
        follow_redirects: bool,
    ) -> StoreResult<&'d Value> {
        let mut doc = docs.get(id).ok_or_else(|| StoreError::not_found(id))?;
        if !follow_redirects {
            return Ok(doc);
        }

        let mut seen = HashSet::new();
        seen.insert(id.to_string());
        while let Some(target) = PredicateFilter::resolve(doc, REDIRECT_FIELD)
            .and_then(|r| r.get("_id"))
            .and_then(Value::as_str)
        {
            if !seen.insert(target.to_string()) {
                return Err(StoreError::RedirectLoop(target.to_string()));
            }
            doc = docs.get(target).ok_or_else(|| StoreError::not_found(target))?;
        }
        Ok(doc)
    }
}

fn doc_id(doc: &Value) -> StoreResult<String> {
    doc.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::invalid_query("document has no string _id"))
}

impl DocumentStore for MemoryStore {
    fn find<'a>(&'a self, query: &'a FindQuery) -> StoreFuture<'a, ResultSet> {
        Box::pin(async move {
            Self::injected_failure(&self.failing_finds, "find")?;
            if let Some(pred) = query.predicates.iter().find(|p| p.field.is_empty()) {
                return Err(StoreError::invalid_query(format!(
                    "empty field name in {} predicate",
                    pred.op.op_name()
                )));
            }

            let mut matched: Vec<Value> = {
                let docs = self.docs.read().await;
                docs.values()
                    .filter(|doc| PredicateFilter::matches(doc, &query.predicates))
                    .cloned()
                    .collect()
            };

            DocumentSorter::sort(&mut matched, &query.sort);
            if let Some(limit) = query.limit {
                matched.truncate(limit);
            }
            Ok(ResultSet::from_docs(matched))
        })
    }

    fn range_scan<'a>(&'a self, range: &'a KeyRange) -> StoreFuture<'a, ResultSet> {
        Box::pin(async move {
            Self::injected_failure(&self.failing_range_scans, "range scan")?;
            if range.is_inverted() {
                return Ok(ResultSet::empty());
            }

            let (low, high) = range.bounds();
            let limit = range.limit.unwrap_or(usize::MAX);
            let docs = self.docs.read().await;
            let scan = docs.range::<str, _>((Bound::Included(low), Bound::Included(high)));
            let to_row = |(id, doc): (&String, &Value)| ResultRow::new(id.clone(), doc.clone());

            let rows = match range.direction {
                SortDirection::Asc => scan.take(limit).map(to_row).collect(),
                SortDirection::Desc => scan.rev().take(limit).map(to_row).collect(),
            };
            Ok(ResultSet::new(rows))
        })
    }

    fn batch_lookup<'a>(
        &'a self,
        ids: &'a [String],
        follow_redirects: bool,
    ) -> StoreFuture<'a, ResultSet> {
        Box::pin(async move {
            let docs = self.docs.read().await;
            ids.iter()
                .map(|id| {
                    Self::resolve_page(&docs, id, follow_redirects)
                        .map(|doc| ResultRow::new(id.clone(), doc.clone()))
                })
                .collect::<StoreResult<Vec<_>>>()
                .map(ResultSet::new)
        })
    }
}
