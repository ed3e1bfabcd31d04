//! Visit-page joiner
//!
//! Replaces each visit's `page: { _id }` stub with a page document. Inputs
//! are never mutated; the output keeps the visits' order and count.

use serde_json::Value;

use super::errors::{SearchError, SearchResult};
use crate::visit::{ResultRow, ResultSet};

/// How pages are matched to visits
#[derive(Debug, Clone, Copy)]
pub enum JoinMode<'a> {
    /// Row i takes page i. Lengths must match.
    Positional(&'a ResultSet),
    /// Each row takes the page whose row id equals its `page._id`.
    Keyed(&'a ResultSet),
}

/// Joins pages into visits.
pub fn insert_pages(visits: &ResultSet, mode: JoinMode<'_>) -> SearchResult<ResultSet> {
    match mode {
        JoinMode::Positional(pages) => join_positional(visits, pages),
        JoinMode::Keyed(pages) => join_keyed(visits, pages),
    }
}

/// Collects each visit's page id, in row order
pub fn page_ids(visits: &ResultSet) -> SearchResult<Vec<String>> {
    visits
        .iter()
        .map(|row| {
            row.page_id()
                .map(str::to_string)
                .ok_or_else(|| SearchError::MissingPageRef(row.id.clone()))
        })
        .collect()
}

fn join_positional(visits: &ResultSet, pages: &ResultSet) -> SearchResult<ResultSet> {
    if visits.len() != pages.len() {
        return Err(SearchError::PositionalMismatch {
            visits: visits.len(),
            pages: pages.len(),
        });
    }

    visits
        .iter()
        .zip(pages.iter())
        .map(|(row, page)| with_page(row, page.doc.clone()))
        .collect()
}

fn join_keyed(visits: &ResultSet, pages: &ResultSet) -> SearchResult<ResultSet> {
    let pages_by_id = pages.rows_by_id();

    visits
        .iter()
        .map(|row| {
            let page_id = row
                .page_id()
                .ok_or_else(|| SearchError::MissingPageRef(row.id.clone()))?;
            let page = pages_by_id
                .get(page_id)
                .ok_or_else(|| SearchError::PageNotFound {
                    visit_id: row.id.clone(),
                    page_id: page_id.to_string(),
                })?;
            with_page(row, page.doc.clone())
        })
        .collect()
}

fn with_page(row: &ResultRow, page: Value) -> SearchResult<ResultRow> {
    let mut joined = row.clone();
    let doc = joined
        .doc
        .as_object_mut()
        .ok_or_else(|| SearchError::MissingPageRef(row.id.clone()))?;
    doc.insert("page".to_string(), page);
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visit(id: &str, page: &str) -> ResultRow {
        ResultRow::new(id, json!({"_id": id, "page": {"_id": page}}))
    }

    fn page(id: &str, title: &str) -> ResultRow {
        ResultRow::new(id, json!({"_id": id, "title": title}))
    }

    fn visits() -> ResultSet {
        ResultSet::new(vec![visit("v1", "p1"), visit("v2", "p2"), visit("v3", "p1")])
    }

    #[test]
    fn test_positional_join_uses_row_index() {
        let pages = ResultSet::new(vec![page("p1", "One"), page("p2", "Two"), page("p9", "Nine")]);
        let joined = insert_pages(&visits(), JoinMode::Positional(&pages)).unwrap();

        for (i, row) in joined.iter().enumerate() {
            assert_eq!(row.doc["page"], pages.rows[i].doc);
        }
        // Positional mode trusts alignment, it does not check ids
        assert_eq!(joined.rows[2].doc["page"]["title"], "Nine");
    }

    #[test]
    fn test_positional_join_length_mismatch() {
        let pages = ResultSet::new(vec![page("p1", "One")]);
        let err = insert_pages(&visits(), JoinMode::Positional(&pages)).unwrap_err();
        assert_eq!(err, SearchError::PositionalMismatch { visits: 3, pages: 1 });
    }

    #[test]
    fn test_keyed_join_by_page_id() {
        let pages = ResultSet::new(vec![page("p2", "Two"), page("p1", "One")]);
        let input = visits();
        let joined = insert_pages(&input, JoinMode::Keyed(&pages)).unwrap();

        assert_eq!(joined.ids(), vec!["v1", "v2", "v3"]);
        assert_eq!(joined.rows[0].doc["page"]["title"], "One");
        assert_eq!(joined.rows[1].doc["page"]["title"], "Two");
        assert_eq!(joined.rows[2].doc["page"]["title"], "One");

        // Input left untouched
        assert_eq!(input.rows[0].doc["page"], json!({"_id": "p1"}));
    }

    #[test]
    fn test_keyed_join_missing_page_fails() {
        let pages = ResultSet::new(vec![page("p1", "One")]);
        let err = insert_pages(&visits(), JoinMode::Keyed(&pages)).unwrap_err();
        assert_eq!(
            err,
            SearchError::PageNotFound {
                visit_id: "v2".into(),
                page_id: "p2".into()
            }
        );
    }

    #[test]
    fn test_missing_page_ref() {
        let input = ResultSet::new(vec![ResultRow::new("v1", json!({"_id": "v1"}))]);
        let pages = ResultSet::new(vec![page("p1", "One")]);
        let err = insert_pages(&input, JoinMode::Keyed(&pages)).unwrap_err();
        assert_eq!(err, SearchError::MissingPageRef("v1".into()));
        assert!(page_ids(&input).is_err());
    }

    #[test]
    fn test_contextual_flag_survives_join() {
        let input = ResultSet::new(vec![visit("v1", "p1").into_contextual()]);
        let pages = ResultSet::new(vec![page("p1", "One")]);
        let joined = insert_pages(&input, JoinMode::Keyed(&pages)).unwrap();
        assert!(joined.rows[0].is_contextual_result);
    }

    #[test]
    fn test_empty_visits() {
        let joined = insert_pages(&ResultSet::empty(), JoinMode::Positional(&ResultSet::empty()));
        assert!(joined.unwrap().is_empty());
    }
}
