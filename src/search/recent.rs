//! Most recent visits

use serde_json::Value;

use super::errors::SearchResult;
use super::history::HistorySearch;
use super::join::JoinMode;
use crate::observability::{log_event, Event};
use crate::store::{DocumentStore, FindQuery, SortSpec};
use crate::visit::{ResultSet, VisitKey, VISIT_KEY_PREFIX};

/// Selector covering the whole visit namespace, newest first
pub fn recent_visits_query(limit: Option<usize>) -> FindQuery {
    FindQuery::new()
        .with_range(
            "_id",
            Value::from(VISIT_KEY_PREFIX),
            Value::from(VisitKey::namespace_end()),
        )
        .with_sort(SortSpec::desc("_id"))
        .with_limit(limit)
}

impl<S: DocumentStore> HistorySearch<S> {
    /// Returns the `limit` most recent visits with their pages nested in.
    ///
    /// Unbounded when `limit` is None. Rows are ordered newest first.
    pub async fn last_visits(&self, limit: Option<usize>) -> SearchResult<ResultSet> {
        let limit_field = limit.map_or_else(|| "none".to_string(), |l| l.to_string());
        log_event(Event::RecentVisitsBegin, &[("limit", limit_field.as_str())]);

        let result = self.fetch_last_visits(limit).await;
        if let Ok(visits) = &result {
            let rows = visits.len().to_string();
            log_event(Event::RecentVisitsComplete, &[("rows", rows.as_str())]);
        }
        self.observe(result)
    }

    async fn fetch_last_visits(&self, limit: Option<usize>) -> SearchResult<ResultSet> {
        let query = recent_visits_query(limit);
        self.metrics.increment_finds();
        let visits = self.store.find(&query).await?;

        // Lookup answers one page per requested id, in request order
        let pages = self.resolve_pages(&visits).await?;
        self.join(&visits, JoinMode::Positional(&pages))
    }
}
