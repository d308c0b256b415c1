//! Message types for the session actor.
//!
//! All requests use a `respond_to` oneshot for the reply. Transport events do
//! not travel through this mailbox; the actor drains them from the
//! transport's own event channel.

use crate::errors::{FailureKind, LiveClassError};
use crate::participant::{MediaKind, Participant};
use crate::registry::RegistrySnapshot;
use crate::view_model::ViewModel;

use common::types::{ChannelName, ParticipantId};
use tokio::sync::oneshot;

/// Messages handled by the `SessionActor`.
#[derive(Debug)]
pub enum SessionMessage {
    /// Check permissions, join the channel, publish camera and microphone.
    Join {
        request: JoinRequest,
        respond_to: oneshot::Sender<Result<JoinOutcome, LiveClassError>>,
    },

    /// Leave the channel and release every local and remote resource.
    Leave {
        respond_to: oneshot::Sender<Result<(), LiveClassError>>,
    },

    /// Enable or disable a published local track.
    SetTrackEnabled {
        kind: MediaKind,
        enabled: bool,
        respond_to: oneshot::Sender<Result<(), LiveClassError>>,
    },

    /// Current view model, `None` when not joined.
    GetViewModel {
        respond_to: oneshot::Sender<Option<ViewModel>>,
    },

    /// Current remote participants in first-seen order.
    GetSnapshot {
        respond_to: oneshot::Sender<RegistrySnapshot>,
    },

    /// Full session state (for debugging/health).
    GetState {
        respond_to: oneshot::Sender<SessionState>,
    },
}

/// What to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// Channel to join.
    pub channel: ChannelName,
    /// Scheduled live session being started, if any.
    pub live_session_id: Option<String>,
}

impl JoinRequest {
    #[must_use]
    pub fn new(channel: ChannelName) -> Self {
        Self {
            channel,
            live_session_id: None,
        }
    }

    /// Attach the scheduled live session this join belongs to.
    #[must_use]
    pub fn with_live_session(mut self, id: impl Into<String>) -> Self {
        self.live_session_id = Some(id.into());
        self
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Id the transport assigned to the local party.
    pub local_id: ParticipantId,
    /// Channel that was joined.
    pub channel: ChannelName,
    /// Whether the user answered a permission prompt during this join.
    pub permission_prompted: bool,
}

/// Lifecycle of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Never joined.
    Idle,
    /// Waiting on the permission gate.
    CheckingPermissions,
    /// Waiting on the transport join.
    Joining,
    /// Creating and publishing local tracks.
    Publishing,
    /// In the channel with local tracks published.
    Joined {
        local_id: ParticipantId,
        channel: ChannelName,
    },
    /// Leave in progress.
    Leaving,
    /// Left; local state is fully cleared.
    Left,
    /// Last join attempt failed; local state is fully cleared.
    Failed(FailureKind),
}

impl SessionStatus {
    /// A join or leave is running and owns the session.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            SessionStatus::CheckingPermissions
                | SessionStatus::Joining
                | SessionStatus::Publishing
                | SessionStatus::Leaving
        )
    }

    #[must_use]
    pub fn is_joined(&self) -> bool {
        matches!(self, SessionStatus::Joined { .. })
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::CheckingPermissions => "checking_permissions",
            SessionStatus::Joining => "joining",
            SessionStatus::Publishing => "publishing",
            SessionStatus::Joined { .. } => "joined",
            SessionStatus::Leaving => "leaving",
            SessionStatus::Left => "left",
            SessionStatus::Failed(_) => "failed",
        }
    }
}

/// Current state of a session (for debugging/health).
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Local participant while joined.
    pub local: Option<Participant>,
    pub remote_count: usize,
    /// Scheduled live session started by this join, if any.
    pub live_session_id: Option<String>,
    /// Messages handled by the actor so far.
    pub messages_processed: u64,
}
