//! Predicate filtering for selector queries
//!
//! No type coercion: numbers compare with numbers, strings with strings.
//! Missing or null fields never match.

use std::cmp::Ordering;

use serde_json::Value;

use super::selector::{FilterOp, Predicate};

/// Evaluates predicates against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches all predicates
    pub fn matches(document: &Value, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|pred| Self::matches_predicate(document, pred))
    }

    /// Resolves a dotted field path (`page._id`) inside a document
    pub fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.')
            .try_fold(document, |value, segment| value.get(segment))
    }

    fn matches_predicate(document: &Value, predicate: &Predicate) -> bool {
        let field_value = match Self::resolve(document, &predicate.field) {
            Some(v) if !v.is_null() => v,
            _ => return false,
        };

        match &predicate.op {
            FilterOp::Eq(expected) => field_value == expected,
            FilterOp::In(candidates) => candidates.iter().any(|c| c == field_value),
            FilterOp::Gte(bound) => {
                matches!(compare(field_value, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOp::Gt(bound) => matches!(compare(field_value, bound), Some(Ordering::Greater)),
            FilterOp::Lte(bound) => {
                matches!(compare(field_value, bound), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOp::Lt(bound) => matches!(compare(field_value, bound), Some(Ordering::Less)),
        }
    }
}

/// Compares two scalars of the same type; None for mixed or non-scalar types
fn compare(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
