//! Document sorting for selector queries

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::PredicateFilter;
use super::selector::{SortDirection, SortSpec};

/// Sorts documents by one or more sort keys
pub struct DocumentSorter;

impl DocumentSorter {
    /// Sorts documents according to the sort keys.
    ///
    /// Sort is stable; later keys break ties of earlier ones.
    pub fn sort(documents: &mut [Value], specs: &[SortSpec]) {
        if specs.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            specs
                .iter()
                .map(|spec| {
                    let ordering = Self::compare_values(
                        PredicateFilter::resolve(a, &spec.field),
                        PredicateFilter::resolve(b, &spec.field),
                    );
                    match spec.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Compares two JSON values.
    ///
    /// Missing < null < bool < number < string; arrays and objects are
    /// ordered by type only.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                    (Value::Number(x), Value::Number(y)) => {
                        let xf = x.as_f64().unwrap_or(0.0);
                        let yf = y.as_f64().unwrap_or(0.0);
                        xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    _ => Ordering::Equal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Value]) -> Vec<&str> {
        docs.iter().map(|d| d["_id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_descending_by_id() {
        let mut docs = vec![json!({"_id": "b"}), json!({"_id": "c"}), json!({"_id": "a"})];
        DocumentSorter::sort(&mut docs, &[SortSpec::desc("_id")]);
        assert_eq!(ids(&docs), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_nested_field_with_tiebreak() {
        let mut docs = vec![
            json!({"_id": "1", "page": {"rank": 2}}),
            json!({"_id": "2", "page": {"rank": 1}}),
            json!({"_id": "3", "page": {"rank": 2}}),
        ];
        DocumentSorter::sort(
            &mut docs,
            &[SortSpec::asc("page.rank"), SortSpec::desc("_id")],
        );
        assert_eq!(ids(&docs), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_stable_without_keys() {
        let mut docs = vec![json!({"_id": "z"}), json!({"_id": "a"})];
        DocumentSorter::sort(&mut docs, &[]);
        assert_eq!(ids(&docs), vec!["z", "a"]);
    }
}
