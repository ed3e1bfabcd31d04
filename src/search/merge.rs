//! Merge helpers for combining visit batches

use std::cmp::Reverse;
use std::collections::HashSet;

use super::errors::SearchResult;
use crate::visit::{extract_timestamp, ResultRow};

/// Merges row sources by visit id.
///
/// Sources are given in priority order. The first occurrence of an id wins,
/// later duplicates are dropped. Relative order of surviving rows follows
/// the concatenation of the sources.
pub fn merge_by_priority<I>(sources: I) -> Vec<ResultRow>
where
    I: IntoIterator<Item = Vec<ResultRow>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for row in sources.into_iter().flatten() {
        if seen.insert(row.id.clone()) {
            merged.push(row);
        }
    }
    merged
}

/// Stable sort by descending visit timestamp.
///
/// Rows sharing a timestamp keep their relative order.
pub fn sort_by_recency(rows: Vec<ResultRow>) -> SearchResult<Vec<ResultRow>> {
    let mut keyed = rows
        .into_iter()
        .map(|row| Ok((extract_timestamp(&row.doc)?, row)))
        .collect::<SearchResult<Vec<_>>>()?;
    keyed.sort_by_key(|(timestamp, _)| Reverse(*timestamp));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}
