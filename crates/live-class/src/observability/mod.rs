//! Observability module for the live-class core.
//!
//! # Privacy by Default
//!
//! Instrumented handlers use `#[instrument(skip_all)]` with explicit safe
//! fields (participant ids, channel names). Transport tokens are never logged.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `lc_remote_participants` | Gauge | none | Remote participants in the registry |
//! | `lc_transport_events_total` | Counter | `event` | Events applied to the registry |
//! | `lc_stale_events_total` | Counter | `event` | Events for unknown participants |
//! | `lc_join_attempts_total` | Counter | none | Join requests accepted by the actor |
//! | `lc_join_failures_total` | Counter | `reason` | Failed joins by failure kind |
//! | `lc_join_duration_seconds` | Histogram | none | Join-to-published latency |
//! | `lc_cleanup_failures_total` | Counter | `stage` | Leave cleanup steps that failed |

pub mod metrics;

pub use self::metrics::{
    record_cleanup_failure, record_join_attempt, record_join_duration, record_join_failure,
    record_stale_event, record_transport_event, set_remote_participants,
};
