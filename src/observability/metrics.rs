//! Search metrics
//!
//! Counters only, monotonic, lock-free.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for store traffic and search outcomes
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    store_finds: AtomicU64,
    store_range_scans: AtomicU64,
    store_lookups: AtomicU64,
    joins: AtomicU64,
    context_rows_added: AtomicU64,
    searches_failed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_finds(&self) {
        self.store_finds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_range_scans(&self) {
        self.store_range_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lookups(&self) {
        self.store_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_joins(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_context_rows(&self, rows: u64) {
        self.context_rows_added.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.searches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total store calls of any kind
    pub fn store_calls(&self) -> u64 {
        self.store_finds.load(Ordering::Relaxed)
            + self.store_range_scans.load(Ordering::Relaxed)
            + self.store_lookups.load(Ordering::Relaxed)
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            store_finds: self.store_finds.load(Ordering::Relaxed),
            store_range_scans: self.store_range_scans.load(Ordering::Relaxed),
            store_lookups: self.store_lookups.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            context_rows_added: self.context_rows_added.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub store_finds: u64,
    pub store_range_scans: u64,
    pub store_lookups: u64,
    pub joins: u64,
    pub context_rows_added: u64,
    pub searches_failed: u64,
}
