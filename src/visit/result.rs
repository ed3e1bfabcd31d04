//! Result rows and result sets returned by store queries

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row in a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Document ID
    pub id: String,
    /// Document body
    pub doc: Value,
    /// Set on rows added by context expansion
    #[serde(
        rename = "isContextualResult",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_contextual_result: bool,
}

impl ResultRow {
    /// Creates a new row
    pub fn new(id: impl Into<String>, doc: Value) -> Self {
        Self {
            id: id.into(),
            doc,
            is_contextual_result: false,
        }
    }

    /// Creates a row keyed by the document's own `_id`.
    ///
    /// Returns None if the document has no string `_id`.
    pub fn from_doc(doc: Value) -> Option<Self> {
        let id = doc.get("_id")?.as_str()?.to_string();
        Some(Self::new(id, doc))
    }

    /// Returns the row marked as a contextual result
    pub fn into_contextual(mut self) -> Self {
        self.is_contextual_result = true;
        self
    }

    /// Returns the id of the page this visit row references
    pub fn page_id(&self) -> Option<&str> {
        self.doc.get("page")?.get("_id")?.as_str()
    }
}

/// An ordered sequence of result rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Rows in result order
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Creates an empty result set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a result set from rows
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    /// Turns a plain document list into rows keyed by `_id`.
    ///
    /// Documents without a string `_id` are dropped.
    pub fn from_docs(docs: impl IntoIterator<Item = Value>) -> Self {
        Self {
            rows: docs.into_iter().filter_map(ResultRow::from_doc).collect(),
        }
    }

    /// Builds an id -> row lookup table.
    ///
    /// When an id repeats, the first row wins.
    pub fn rows_by_id(&self) -> HashMap<&str, &ResultRow> {
        let mut map = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            map.entry(row.id.as_str()).or_insert(row);
        }
        map
    }

    /// Returns the row ids in order
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    /// Returns true if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }
}

impl FromIterator<ResultRow> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_docs_keys_by_id() {
        let set = ResultSet::from_docs(vec![
            json!({"_id": "a", "n": 1}),
            json!({"n": 2}),
            json!({"_id": "b"}),
        ]);
        assert_eq!(set.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_rows_by_id_first_wins() {
        let set = ResultSet::new(vec![
            ResultRow::new("a", json!({"v": 1})),
            ResultRow::new("a", json!({"v": 2})),
        ]);
        let map = set.rows_by_id();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"].doc["v"], 1);
    }

    #[test]
    fn test_page_id() {
        let row = ResultRow::new("v", json!({"page": {"_id": "page/1"}}));
        assert_eq!(row.page_id(), Some("page/1"));
        assert_eq!(ResultRow::new("v", json!({})).page_id(), None);
    }

    #[test]
    fn test_contextual_flag_serialization() {
        let row = ResultRow::new("v", json!({}));
        let plain = serde_json::to_value(&row).unwrap();
        assert!(plain.get("isContextualResult").is_none());

        let flagged = serde_json::to_value(row.into_contextual()).unwrap();
        assert_eq!(flagged["isContextualResult"], true);
    }
}
