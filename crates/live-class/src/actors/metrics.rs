//! Session actor counters and mailbox monitoring.
//!
//! | Level    | Depth      |
//! |----------|------------|
//! | Normal   | < 32       |
//! | Warning  | 32-128     |
//! | Critical | > 128      |
//!
//! Handles count a message when they queue it and the actor uncounts it once
//! handled, so the depth includes the message in progress. A session serves
//! one local party, so a deep mailbox means the UI is issuing requests faster
//! than the transport answers them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Mailbox depth thresholds for session actors.
pub const SESSION_MAILBOX_NORMAL: usize = 32;
pub const SESSION_MAILBOX_WARNING: usize = 128;

/// Mailbox depth level for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxLevel {
    /// Below normal threshold.
    Normal,
    /// Between normal and warning thresholds.
    Warning,
    /// Above warning threshold.
    Critical,
}

/// Tracks queue depth of one session actor.
#[derive(Debug)]
pub struct MailboxMonitor {
    session_id: String,
    depth: AtomicUsize,
    peak_depth: AtomicUsize,
    messages_processed: AtomicU64,
}

impl MailboxMonitor {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            depth: AtomicUsize::new(0),
            peak_depth: AtomicUsize::new(0),
            messages_processed: AtomicU64::new(0),
        }
    }

    /// Record a message queued for the actor.
    pub fn record_enqueue(&self) {
        let new_depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_depth.fetch_max(new_depth, Ordering::Relaxed);

        match level_for_depth(new_depth) {
            MailboxLevel::Critical => warn!(
                target: "lc.actor.mailbox",
                session_id = %self.session_id,
                depth = new_depth,
                threshold = SESSION_MAILBOX_WARNING,
                "Mailbox depth critical"
            ),
            MailboxLevel::Warning if new_depth == SESSION_MAILBOX_NORMAL + 1 => debug!(
                target: "lc.actor.mailbox",
                session_id = %self.session_id,
                depth = new_depth,
                "Mailbox depth elevated"
            ),
            _ => {}
        }
    }

    /// Record a message as fully handled.
    pub fn record_dequeue(&self) {
        self.decrement();
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Undo an enqueue whose send failed.
    pub fn record_rejected(&self) {
        self.decrement();
    }

    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn peak_depth(&self) -> usize {
        self.peak_depth.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn messages_processed(&self) -> u64 {
        self.messages_processed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn current_level(&self) -> MailboxLevel {
        level_for_depth(self.current_depth())
    }

    fn decrement(&self) {
        // Saturate so a stray dequeue cannot wrap the gauge.
        let _ = self
            .depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                Some(d.saturating_sub(1))
            });
    }
}

fn level_for_depth(depth: usize) -> MailboxLevel {
    if depth > SESSION_MAILBOX_WARNING {
        MailboxLevel::Critical
    } else if depth > SESSION_MAILBOX_NORMAL {
        MailboxLevel::Warning
    } else {
        MailboxLevel::Normal
    }
}

/// Session counters shared between the actor and its handles.
///
/// Mirrors the `lc_*` metrics for callers without a metrics recorder
/// installed (tests, embedded UIs showing a debug panel).
#[derive(Debug, Default)]
pub struct SessionMetrics {
    join_attempts: AtomicU64,
    join_failures: AtomicU64,
    events_applied: AtomicU64,
    stale_events: AtomicU64,
    cleanup_failures: AtomicU64,
    remote_participants: AtomicUsize,
}

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMetricsSnapshot {
    pub join_attempts: u64,
    pub join_failures: u64,
    pub events_applied: u64,
    pub stale_events: u64,
    pub cleanup_failures: u64,
    pub remote_participants: usize,
}

impl SessionMetrics {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn join_attempted(&self) {
        self.join_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn join_failed(&self) {
        self.join_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_applied(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_event(&self) {
        self.stale_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cleanup_failed(&self) {
        self.cleanup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_remote_participants(&self, count: usize) {
        self.remote_participants.store(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionMetricsSnapshot {
        SessionMetricsSnapshot {
            join_attempts: self.join_attempts.load(Ordering::Relaxed),
            join_failures: self.join_failures.load(Ordering::Relaxed),
            events_applied: self.events_applied.load(Ordering::Relaxed),
            stale_events: self.stale_events.load(Ordering::Relaxed),
            cleanup_failures: self.cleanup_failures.load(Ordering::Relaxed),
            remote_participants: self.remote_participants.load(Ordering::Relaxed),
        }
    }
}
