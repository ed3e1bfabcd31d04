//! Observability for visit search
//!
//! - Structured logging (JSON lines)
//! - Typed search events
//! - Counters for store traffic
//!
//! Search events, failures included, are emitted below the default
//! minimum severity (WARN). Nothing is written unless a caller lowers the
//! threshold with `Logger::set_min_severity`.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_MIN_SEVERITY};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Severity a search event is logged at.
///
/// Failures at INFO, everything else at TRACE. Both sit below
/// `DEFAULT_MIN_SEVERITY`; failures are reported to the caller as errors.
pub fn event_severity(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Info
    } else {
        Severity::Trace
    }
}

/// Log a search event with fields
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
