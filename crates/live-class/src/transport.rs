//! Real-time media transport contract.
//!
//! The video SDK owns media transport, NAT traversal and encoding. This module
//! only names the calls the session actor makes and the events it consumes.
//! Remote events are delivered over an `mpsc` channel handed out by `join`;
//! the SDK adapter must push events for one remote id in the order it
//! observed them.

use crate::participant::{MediaKind, TrackHandle};

use async_trait::async_trait;
use common::secret::SecretString;
use common::types::{ChannelName, ParticipantId};
use thiserror::Error;
use tokio::sync::mpsc;

/// Transport-level failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service refused the request (bad token, unknown app id, full channel).
    #[error("Rejected by transport: {0}")]
    Rejected(String),

    /// Network failure talking to the media service.
    #[error("Network error: {0}")]
    Network(String),

    /// Local device could not be opened.
    #[error("Device error: {0}")]
    Device(String),

    /// Operation did not complete in time.
    #[error("Transport operation timed out")]
    Timeout,

    /// Client already shut down.
    #[error("Transport client closed")]
    Closed,
}

/// Remote participant events emitted by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A remote party started sending a track.
    Published {
        remote_id: ParticipantId,
        kind: MediaKind,
        track: TrackHandle,
    },
    /// A remote party stopped sending a track.
    Unpublished {
        remote_id: ParticipantId,
        kind: MediaKind,
    },
    /// A remote party left the channel.
    Left { remote_id: ParticipantId },
}

impl TransportEvent {
    /// Id the event refers to.
    #[must_use]
    pub fn remote_id(&self) -> &ParticipantId {
        match self {
            TransportEvent::Published { remote_id, .. }
            | TransportEvent::Unpublished { remote_id, .. }
            | TransportEvent::Left { remote_id } => remote_id,
        }
    }

    /// Bounded label for metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            TransportEvent::Published { .. } => "published",
            TransportEvent::Unpublished { .. } => "unpublished",
            TransportEvent::Left { .. } => "left",
        }
    }
}

/// A successfully joined channel.
#[derive(Debug)]
pub struct JoinedTransport {
    /// Id the transport assigned to the local party.
    pub local_id: ParticipantId,
    /// Remote events for this channel, in transport order.
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Calls into the external real-time media SDK.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Join `channel` as `local_id`.
    async fn join(
        &self,
        app_id: &str,
        channel: &ChannelName,
        token: &SecretString,
        local_id: &ParticipantId,
    ) -> Result<JoinedTransport, TransportError>;

    /// Open the camera.
    async fn create_camera_video_track(&self) -> Result<TrackHandle, TransportError>;

    /// Open the microphone.
    async fn create_microphone_audio_track(&self) -> Result<TrackHandle, TransportError>;

    /// Publish local tracks to the joined channel.
    async fn publish(&self, tracks: &[TrackHandle]) -> Result<(), TransportError>;

    /// Pause or resume a local track without unpublishing it.
    async fn set_track_enabled(
        &self,
        track: &TrackHandle,
        enabled: bool,
    ) -> Result<(), TransportError>;

    /// Stop a track and release its device or decoder.
    async fn stop_track(&self, track: &TrackHandle) -> Result<(), TransportError>;

    /// Leave the joined channel.
    async fn leave(&self) -> Result<(), TransportError>;
}
