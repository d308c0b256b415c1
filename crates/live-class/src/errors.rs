//! Live-class error types.
//!
//! Errors map to a [`FailureKind`] the UI renders as session state. Internal
//! details are logged but never put in client-facing messages.

use crate::config::ConfigError;
use crate::transport::TransportError;

use common::error::DataAccessError;
use thiserror::Error;

/// Live-class error type.
///
/// Maps to `FailureKind`:
/// - `PermissionDenied`: `PermissionDenied`
/// - `JoinFailed`, `PublishFailed`: `ConnectionFailed`
/// - `Busy`, `AlreadyJoined`, `NotJoined`, `Cancelled`: `InvalidState`
/// - `DataAccess`, `Config`, `Internal`: `Internal`
#[derive(Debug, Error)]
pub enum LiveClassError {
    /// Camera or microphone access refused.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport failed while joining the channel or acquiring local media.
    #[error("Join failed: {0}")]
    JoinFailed(String),

    /// Transport failed while publishing local tracks.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// A join or leave is already in progress for this session.
    #[error("Session busy: {0}")]
    Busy(String),

    /// Join requested while already joined.
    #[error("Already joined channel: {0}")]
    AlreadyJoined(String),

    /// Operation needs a joined session.
    #[error("Not joined")]
    NotJoined,

    /// The session actor was cancelled before the operation completed.
    #[error("Session cancelled")]
    Cancelled,

    /// Data-access side call failed.
    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Internal error (actor channel closed, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure classes surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Show an actionable "allow camera and microphone" prompt.
    PermissionDenied,
    /// Show a connection-failed state; the user re-triggers join.
    ConnectionFailed,
    /// The request does not fit the current session state.
    InvalidState,
    /// Anything else.
    Internal,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::ConnectionFailed => "connection_failed",
            FailureKind::InvalidState => "invalid_state",
            FailureKind::Internal => "internal",
        }
    }
}

impl LiveClassError {
    /// Failure class for UI state.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            LiveClassError::PermissionDenied(_) => FailureKind::PermissionDenied,
            LiveClassError::JoinFailed(_) | LiveClassError::PublishFailed(_) => {
                FailureKind::ConnectionFailed
            }
            LiveClassError::Busy(_)
            | LiveClassError::AlreadyJoined(_)
            | LiveClassError::NotJoined
            | LiveClassError::Cancelled => FailureKind::InvalidState,
            LiveClassError::DataAccess(_)
            | LiveClassError::Config(_)
            | LiveClassError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Returns a client-safe error message (no internal details).
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            LiveClassError::PermissionDenied(msg) => msg.clone(),
            LiveClassError::JoinFailed(_) => {
                "Could not connect to the live class, please try again".to_string()
            }
            LiveClassError::PublishFailed(_) => {
                "Could not share your camera and microphone, please try again".to_string()
            }
            LiveClassError::Busy(_) => "Please wait for the current action to finish".to_string(),
            LiveClassError::AlreadyJoined(_) => "You are already in this class".to_string(),
            LiveClassError::NotJoined => "You are not in a live class".to_string(),
            LiveClassError::Cancelled => "The live class was closed".to_string(),
            LiveClassError::DataAccess(_)
            | LiveClassError::Config(_)
            | LiveClassError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Wrap a transport failure from the join step.
    #[must_use]
    pub fn join_failed(err: &TransportError) -> Self {
        LiveClassError::JoinFailed(err.to_string())
    }

    /// Wrap a transport failure from the publish step.
    #[must_use]
    pub fn publish_failed(err: &TransportError) -> Self {
        LiveClassError::PublishFailed(err.to_string())
    }
}
