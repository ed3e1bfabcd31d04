//! Visits to known pages within a time window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::SearchResult;
use super::history::HistorySearch;
use super::join::JoinMode;
use crate::observability::{log_event, Event};
use crate::store::{DocumentStore, FindQuery, Predicate, SortSpec};
use crate::visit::{ResultSet, VisitKey};

/// Caller-selected date bounds, in ms since epoch.
///
/// A missing end falls back to the default window when resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DateRange {
    /// No bounds selected; resolves to the default window
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Inclusive window in epoch milliseconds
    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Window from optional UTC datetimes; missing bounds resolve as in `resolve`
    pub fn from_datetimes(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start: start.map(|d| d.timestamp_millis()),
            end: end.map(|d| d.timestamp_millis()),
        }
    }

    /// Resolves to concrete inclusive bounds.
    ///
    /// Start defaults to `now - default_window_ms`, end to `now`. Each end
    /// is resolved independently.
    pub fn resolve(&self, now: i64, default_window_ms: i64) -> (i64, i64) {
        let start = self
            .start
            .unwrap_or_else(|| now.saturating_sub(default_window_ms));
        let end = self.end.unwrap_or(now);
        (start, end)
    }
}

/// Selector for visits to `page_ids` with timestamps in `[start, end]`
pub fn visits_to_pages_query(page_ids: Vec<Value>, start: i64, end: i64) -> FindQuery {
    FindQuery::new()
        .with_predicate(Predicate::is_in("page._id", page_ids))
        .with_range(
            "_id",
            Value::from(VisitKey::lower_bound(start)),
            Value::from(VisitKey::upper_bound(end)),
        )
        .with_sort(SortSpec::desc("_id"))
}

impl<S: DocumentStore> HistorySearch<S> {
    /// Finds all visits to the given pages within the window, newest first,
    /// with the given page documents nested in.
    ///
    /// Redirects are not followed: only visits that reference one of the
    /// given page ids directly are found.
    pub async fn find_visits_to_pages(
        &self,
        pages: &ResultSet,
        window: DateRange,
    ) -> SearchResult<ResultSet> {
        self.find_visits_to_pages_at(pages, window, Utc::now().timestamp_millis())
            .await
    }

    /// Same as `find_visits_to_pages` with an explicit clock reading
    pub async fn find_visits_to_pages_at(
        &self,
        pages: &ResultSet,
        window: DateRange,
        now: i64,
    ) -> SearchResult<ResultSet> {
        let (start, end) = window.resolve(now, self.config.default_window_ms());
        let start_field = start.to_string();
        let end_field = end.to_string();
        let pages_field = pages.len().to_string();
        log_event(
            Event::RangeQueryBegin,
            &[
                ("end", end_field.as_str()),
                ("pages", pages_field.as_str()),
                ("start", start_field.as_str()),
            ],
        );

        if start > end {
            log_event(Event::RangeQueryEmptyWindow, &[]);
            return Ok(ResultSet::empty());
        }

        let result = self.fetch_visits_to_pages(pages, start, end).await;
        if let Ok(visits) = &result {
            let rows = visits.len().to_string();
            log_event(Event::RangeQueryComplete, &[("rows", rows.as_str())]);
        }
        self.observe(result)
    }

    async fn fetch_visits_to_pages(
        &self,
        pages: &ResultSet,
        start: i64,
        end: i64,
    ) -> SearchResult<ResultSet> {
        let page_ids = pages.iter().map(|row| Value::from(row.id.as_str())).collect();
        let query = visits_to_pages_query(page_ids, start, end);

        self.metrics.increment_finds();
        let visits = self.store.find(&query).await?;
        self.join(&visits, JoinMode::Keyed(pages))
    }
}
