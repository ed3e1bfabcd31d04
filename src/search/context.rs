//! Context expansion
//!
//! Adds the visits immediately before and after each result row, so a
//! search hit is shown together with what the user was doing around it.
//!
//! Per row:
//! 1. Descending scan of up to N visits in `[t - max_preceding_time, t - 1]`
//! 2. Ascending scan of up to M visits in `[t + 1, t + max_succeding_time]`
//! 3. Join pages, mark rows contextual
//!
//! Per-row chains run concurrently, capped by `ContextOptions::concurrency`.
//! Any failure fails the whole expansion. Output order depends only on the
//! input order and timestamps, never on completion order.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use super::errors::SearchResult;
use super::history::HistorySearch;
use super::join::JoinMode;
use super::merge::{merge_by_priority, sort_by_recency};
use crate::config::ContextOptions;
use crate::observability::{log_event, Event};
use crate::store::{DocumentStore, KeyRange};
use crate::visit::{extract_timestamp, ResultRow, ResultSet, VisitKey, MAX_TIMESTAMP};

/// Scan for visits strictly before `timestamp`, newest first.
///
/// None when nothing can precede the row.
pub fn preceding_range(timestamp: i64, options: &ContextOptions) -> Option<KeyRange> {
    if options.max_preceding_visits == 0 || timestamp <= 0 {
        return None;
    }
    let window = ms_to_i64(options.max_preceding_time_ms);
    // No exclusive-start scan exists, so step one millisecond away
    let start = VisitKey::upper_bound(timestamp - 1);
    let end = VisitKey::lower_bound(timestamp.saturating_sub(window));
    Some(KeyRange::descending(start, end).with_limit(options.max_preceding_visits))
}

/// Scan for visits strictly after `timestamp`, oldest first.
///
/// None when nothing can follow the row.
pub fn succeeding_range(timestamp: i64, options: &ContextOptions) -> Option<KeyRange> {
    if options.max_succeding_visits == 0 || timestamp >= MAX_TIMESTAMP {
        return None;
    }
    let window = ms_to_i64(options.max_succeding_time_ms);
    let start = VisitKey::lower_bound(timestamp.saturating_add(1));
    let end = VisitKey::upper_bound(timestamp.saturating_add(window));
    Some(KeyRange::ascending(start, end).with_limit(options.max_succeding_visits))
}

fn ms_to_i64(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

impl<S: DocumentStore> HistorySearch<S> {
    /// Expands visits with context using the configured bounds
    pub async fn add_default_context(&self, visits: &ResultSet) -> SearchResult<ResultSet> {
        let options = self.config.context.clone();
        self.add_visits_context(visits, &options).await
    }

    /// Expands visits with the visits around them.
    ///
    /// Original rows take priority over contextual copies of the same
    /// visit; among contextual duplicates the batch of the earliest input
    /// row wins. The result is sorted newest first.
    pub async fn add_visits_context(
        &self,
        visits: &ResultSet,
        options: &ContextOptions,
    ) -> SearchResult<ResultSet> {
        if visits.is_empty() {
            return Ok(ResultSet::empty());
        }

        let rows_field = visits.len().to_string();
        log_event(Event::ContextBegin, &[("rows", rows_field.as_str())]);

        let result = self.expand(visits, options).await;
        if let Ok(expanded) = &result {
            let added = expanded.iter().filter(|r| r.is_contextual_result).count();
            self.metrics.add_context_rows(added as u64);

            let added_field = added.to_string();
            let rows_field = expanded.len().to_string();
            log_event(
                Event::ContextComplete,
                &[("added", added_field.as_str()), ("rows", rows_field.as_str())],
            );
        }
        self.observe(result)
    }

    async fn expand(&self, visits: &ResultSet, options: &ContextOptions) -> SearchResult<ResultSet> {
        let batches: Vec<Vec<ResultRow>> = stream::iter(visits.iter())
            .map(|row| self.fetch_context(row, options))
            .buffered(options.effective_concurrency())
            .try_collect()
            .await?;

        let sources = std::iter::once(visits.rows.clone()).chain(batches);
        let merged = merge_by_priority(sources);
        Ok(ResultSet::new(sort_by_recency(merged)?))
    }

    /// Fetches, joins and flags the context of a single row
    async fn fetch_context(
        &self,
        row: &ResultRow,
        options: &ContextOptions,
    ) -> SearchResult<Vec<ResultRow>> {
        let timestamp = extract_timestamp(&row.doc)?;

        let preceding = self.scan(preceding_range(timestamp, options)).await?;
        let succeeding = self.scan(succeeding_range(timestamp, options)).await?;

        // Outward from the row on both sides; the final sort makes this moot
        let mut rows = preceding.rows;
        rows.extend(succeeding.rows.into_iter().rev());
        let batch = ResultSet::new(rows);

        let pages = self.resolve_pages(&batch).await?;
        let joined = self.join(&batch, JoinMode::Keyed(&pages))?;
        Ok(joined.rows.into_iter().map(ResultRow::into_contextual).collect())
    }

    async fn scan(&self, range: Option<KeyRange>) -> SearchResult<ResultSet> {
        match range {
            Some(range) => {
                self.metrics.increment_range_scans();
                Ok(self.store.range_scan(&range).await?)
            }
            None => Ok(ResultSet::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(ts: i64) -> String {
        VisitKey::new(ts, "n").encode()
    }

    fn visit(ts: i64) -> Value {
        json!({"_id": key(ts), "page": {"_id": format!("page/{}", ts)}})
    }

    fn page(ts: i64) -> Value {
        json!({"_id": format!("page/{}", ts), "title": format!("Page {}", ts)})
    }

    fn search(timestamps: &[i64]) -> HistorySearch<MemoryStore> {
        let docs = timestamps.iter().flat_map(|&ts| [visit(ts), page(ts)]);
        HistorySearch::new(Arc::new(MemoryStore::with_docs(docs).unwrap()))
    }

    fn original(ts: i64) -> ResultRow {
        let mut doc = visit(ts);
        doc["page"] = page(ts);
        ResultRow::new(key(ts), doc)
    }

    fn timestamps(set: &ResultSet) -> Vec<i64> {
        set.iter().map(|r| extract_timestamp(&r.doc).unwrap()).collect()
    }

    #[test]
    fn test_preceding_range_excludes_row() {
        let options = ContextOptions::default().with_max_time(
            Duration::from_millis(150),
            Duration::from_millis(150),
        );
        let range = preceding_range(300, &options).unwrap();
        assert_eq!(range.start, VisitKey::upper_bound(299));
        assert_eq!(range.end, VisitKey::lower_bound(150));
        assert_eq!(range.limit, Some(2));

        let range = succeeding_range(300, &options).unwrap();
        assert_eq!(range.start, VisitKey::lower_bound(301));
        assert_eq!(range.end, VisitKey::upper_bound(450));
    }

    #[test]
    fn test_ranges_skipped_when_unneeded() {
        let options = ContextOptions::default();
        assert!(preceding_range(0, &options).is_none());
        assert!(preceding_range(10, &options.clone().with_max_visits(0, 2)).is_none());
        assert!(succeeding_range(10, &options.clone().with_max_visits(2, 0)).is_none());
        assert!(succeeding_range(MAX_TIMESTAMP, &options).is_none());
    }

    #[tokio::test]
    async fn test_same_millisecond_siblings_at_max_timestamp() {
        let sibling = |nonce: &str| {
            json!({
                "_id": VisitKey::new(MAX_TIMESTAMP, nonce).encode(),
                "page": {"_id": "page/last"},
            })
        };
        let store = MemoryStore::with_docs(vec![
            sibling("a"),
            sibling("b"),
            json!({"_id": "page/last", "title": "Last"}),
        ])
        .unwrap();
        let search = HistorySearch::new(Arc::new(store));
        let mut doc = sibling("a");
        doc["page"] = json!({"_id": "page/last", "title": "Last"});
        let input = ResultSet::new(vec![ResultRow::new(
            VisitKey::new(MAX_TIMESTAMP, "a").encode(),
            doc,
        )]);

        let result = search
            .add_visits_context(&input, &ContextOptions::default())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(!result.rows[0].is_contextual_result);
    }

    #[tokio::test]
    async fn test_preceding_scenario() {
        let search = search(&[100, 200, 300]);
        let options = ContextOptions::default()
            .with_max_visits(5, 5)
            .with_max_time(Duration::from_millis(150), Duration::from_millis(150));
        let input = ResultSet::new(vec![original(300)]);

        let result = search.add_visits_context(&input, &options).await.unwrap();

        assert_eq!(timestamps(&result), vec![300, 200]);
        assert!(!result.rows[0].is_contextual_result);
        assert!(result.rows[1].is_contextual_result);
        assert_eq!(result.rows[1].doc["page"]["title"], "Page 200");
    }

    #[tokio::test]
    async fn test_count_bounds() {
        let search = search(&[96, 97, 98, 99, 100, 101, 102, 103, 104]);
        let options = ContextOptions::default().with_max_visits(2, 1);
        let input = ResultSet::new(vec![original(100)]);

        let result = search.add_visits_context(&input, &options).await.unwrap();
        assert_eq!(timestamps(&result), vec![101, 100, 99, 98]);
    }

    #[tokio::test]
    async fn test_original_rows_win_over_context() {
        let search = search(&[100, 110]);
        let mut first = original(110);
        first.doc["marker"] = json!("original");
        let input = ResultSet::new(vec![first.clone(), original(100)]);

        let result = search
            .add_visits_context(&input, &ContextOptions::default())
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.rows[0], first);
        assert!(result.iter().all(|r| !r.is_contextual_result));
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_store_calls() {
        let search = search(&[100]);
        let result = search
            .add_visits_context(&ResultSet::empty(), &ContextOptions::default())
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(search.metrics().store_calls(), 0);
    }

    #[tokio::test]
    async fn test_single_failure_fails_expansion() {
        let search = search(&[100, 200, 300]);
        search.store().fail_next_range_scans(1);
        let input = ResultSet::new(vec![original(100), original(200), original(300)]);

        let err = search
            .add_visits_context(&input, &ContextOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "AERO_STORE_UNAVAILABLE");
        assert_eq!(search.metrics().snapshot().searches_failed, 1);
    }

    #[tokio::test]
    async fn test_concurrency_does_not_change_output() {
        let stamps: Vec<i64> = (1..=20).map(|i| i * 1_000).collect();
        let search = search(&stamps);
        let input = ResultSet::new(vec![original(5_000), original(12_000), original(19_000)]);

        let serial = search
            .add_visits_context(&input, &ContextOptions::default().with_concurrency(1))
            .await
            .unwrap();
        let parallel = search
            .add_visits_context(&input, &ContextOptions::default().with_concurrency(16))
            .await
            .unwrap();
        assert_eq!(serial, parallel);
    }
}
