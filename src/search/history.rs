//! Visit search service
//!
//! `HistorySearch` binds a document store to the search operations. The
//! operations themselves live next to their helpers in `recent`, `range`
//! and `context`; this file holds the shared pieces.

use std::sync::Arc;

use super::errors::SearchResult;
use super::join::{insert_pages, page_ids, JoinMode};
use crate::config::HistoryConfig;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::DocumentStore;
use crate::visit::ResultSet;

/// Visit search over a document store
pub struct HistorySearch<S> {
    pub(super) store: Arc<S>,
    pub(super) config: HistoryConfig,
    pub(super) metrics: Arc<MetricsRegistry>,
}

impl<S: DocumentStore> HistorySearch<S> {
    /// Creates a search service with default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, HistoryConfig::default())
    }

    /// Creates a search service with the given configuration
    pub fn with_config(store: Arc<S>, config: HistoryConfig) -> Self {
        Self {
            store,
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares an existing metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the underlying document store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the active configuration
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Returns the metrics registry
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Nests page documents into visits.
    ///
    /// With an explicit `JoinMode` the given pages are used as-is. Without
    /// one, pages are fetched by each visit's `page._id` (following
    /// redirects) and joined by id.
    pub async fn insert_pages_into_visits(
        &self,
        visits: &ResultSet,
        pages: Option<JoinMode<'_>>,
    ) -> SearchResult<ResultSet> {
        let result = match pages {
            Some(mode) => self.join(visits, mode),
            None => match self.resolve_pages(visits).await {
                Ok(resolved) => self.join(visits, JoinMode::Keyed(&resolved)),
                Err(err) => Err(err),
            },
        };
        self.observe(result)
    }

    /// Fetches one page per visit, in visit order, following redirects.
    ///
    /// Row ids of the returned set are the requested page ids.
    pub(super) async fn resolve_pages(&self, visits: &ResultSet) -> SearchResult<ResultSet> {
        if visits.is_empty() {
            return Ok(ResultSet::empty());
        }
        let ids = page_ids(visits)?;
        self.metrics.increment_lookups();
        Ok(self.store.batch_lookup(&ids, true).await?)
    }

    pub(super) fn join(&self, visits: &ResultSet, mode: JoinMode<'_>) -> SearchResult<ResultSet> {
        self.metrics.increment_joins();
        insert_pages(visits, mode).inspect_err(|err| {
            let reason = err.to_string();
            log_event(
                Event::JoinFailed,
                &[("code", err.code()), ("reason", reason.as_str())],
            );
        })
    }

    /// Records a failed operation and hands the result back
    pub(super) fn observe<T>(&self, result: SearchResult<T>) -> SearchResult<T> {
        if let Err(err) = &result {
            self.metrics.increment_failures();
            log_event(Event::SearchFailed, &[("code", err.code())]);
        }
        result
    }
}
