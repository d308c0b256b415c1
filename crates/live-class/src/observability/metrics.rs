//! Metrics definitions for the live-class core.
//!
//! All metrics follow Prometheus naming conventions:
//! - `lc_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `event`: 3 values (published, unpublished, left)
//! - `reason`: bounded by `FailureKind` (4 values)
//! - `stage`: bounded cleanup stages (local_track, remote_track, transport_leave)

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Set the number of remote participants in the registry.
///
/// Metric: `lc_remote_participants`
/// Labels: none
pub fn set_remote_participants(count: usize) {
    // usize to f64 conversion is safe for realistic class sizes
    #[allow(clippy::cast_precision_loss)]
    gauge!("lc_remote_participants").set(count as f64);
}

/// Record a transport event applied to the registry.
///
/// Metric: `lc_transport_events_total`
/// Labels: `event`
pub fn record_transport_event(event: &'static str) {
    counter!("lc_transport_events_total", "event" => event).increment(1);
}

/// Record an event that referenced an unknown participant.
///
/// Metric: `lc_stale_events_total`
/// Labels: `event`
///
/// Benign; a steady non-zero rate is expected when leaves race unpublishes.
pub fn record_stale_event(event: &'static str) {
    counter!("lc_stale_events_total", "event" => event).increment(1);
}

/// Record a join attempt.
///
/// Metric: `lc_join_attempts_total`
/// Labels: none
pub fn record_join_attempt() {
    counter!("lc_join_attempts_total").increment(1);
}

/// Record a failed join.
///
/// Metric: `lc_join_failures_total`
/// Labels: `reason`
pub fn record_join_failure(reason: &'static str) {
    counter!("lc_join_failures_total", "reason" => reason).increment(1);
}

/// Record time from join request to published local tracks.
///
/// Metric: `lc_join_duration_seconds`
/// Labels: none
pub fn record_join_duration(duration: Duration) {
    histogram!("lc_join_duration_seconds").record(duration.as_secs_f64());
}

/// Record a cleanup step that failed during leave.
///
/// Metric: `lc_cleanup_failures_total`
/// Labels: `stage`
///
/// Cleanup failures never block the local Left state; this is the only trace
/// besides the warn log.
pub fn record_cleanup_failure(stage: &'static str) {
    counter!("lc_cleanup_failures_total", "stage" => stage).increment(1);
}
