//! Observable events emitted by visit search

use std::fmt;

/// Observable search events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Recent visits
    RecentVisitsBegin,
    RecentVisitsComplete,

    // Temporal range
    RangeQueryBegin,
    RangeQueryComplete,
    /// Window start is after window end
    RangeQueryEmptyWindow,

    // Context expansion
    ContextBegin,
    ContextComplete,

    // Failures
    JoinFailed,
    SearchFailed,

    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RecentVisitsBegin => "VISITS_RECENT_BEGIN",
            Event::RecentVisitsComplete => "VISITS_RECENT_COMPLETE",
            Event::RangeQueryBegin => "VISITS_RANGE_BEGIN",
            Event::RangeQueryComplete => "VISITS_RANGE_COMPLETE",
            Event::RangeQueryEmptyWindow => "VISITS_RANGE_EMPTY_WINDOW",
            Event::ContextBegin => "VISITS_CONTEXT_BEGIN",
            Event::ContextComplete => "VISITS_CONTEXT_COMPLETE",
            Event::JoinFailed => "VISITS_JOIN_FAILED",
            Event::SearchFailed => "VISITS_SEARCH_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Returns true for events reporting a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::JoinFailed | Event::SearchFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
