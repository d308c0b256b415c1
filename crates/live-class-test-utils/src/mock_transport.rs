//! Mock media transport for session tests.
//!
//! Records every call, hands out a remote event channel on join, and can be
//! configured to fail any step or to stall join/leave.
//!
//! # Example
//!
//! ```rust,ignore
//! use live_class_test_utils::MockTransport;
//!
//! let transport = MockTransport::builder()
//!     .fail_publish(TransportError::Network("ice failed".into()))
//!     .build();
//!
//! // After a join, push remote events:
//! transport.emit(published("teacher-1", MediaKind::Video)).await;
//! ```

use async_trait::async_trait;
use common::secret::SecretString;
use common::types::{ChannelName, ParticipantId};
use live_class::participant::{MediaKind, TrackHandle};
use live_class::transport::{JoinedTransport, MediaTransport, TransportError, TransportEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};

/// Event channel capacity handed out on join.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One call made against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Join { channel: String, local_id: String },
    CreateCamera,
    CreateMicrophone,
    Publish(Vec<String>),
    SetTrackEnabled { track_id: String, enabled: bool },
    StopTrack(String),
    Leave,
}

#[derive(Debug, Default, Clone)]
struct Failures {
    join: Option<TransportError>,
    camera: Option<TransportError>,
    microphone: Option<TransportError>,
    publish: Option<TransportError>,
    set_track_enabled: Option<TransportError>,
    stop_track: Option<TransportError>,
    leave: Option<TransportError>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    calls: Vec<TransportCall>,
    events_tx: Option<mpsc::Sender<TransportEvent>>,
    next_track: u32,
}

/// Mock `MediaTransport`.
#[derive(Debug)]
pub struct MockTransport {
    inner: Mutex<MockTransportInner>,
    failures: Failures,
    join_gate: Option<Arc<Notify>>,
    hang_leave: bool,
    assigned_id: Option<ParticipantId>,
}

impl Default for MockTransport {
    fn default() -> Self {
        MockTransportBuilder::default().build_inner()
    }
}

impl MockTransport {
    /// Transport where every call succeeds.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::default()
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Track ids passed to `stop_track`, in order.
    pub fn stopped_tracks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::StopTrack(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn leave_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Leave))
            .count()
    }

    pub fn join_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Join { .. }))
            .count()
    }

    /// Push a remote event to the joined session.
    ///
    /// Panics if no join has handed out an event channel.
    pub async fn emit(&self, event: TransportEvent) {
        let tx = self
            .inner
            .lock()
            .unwrap()
            .events_tx
            .clone()
            .expect("emit called before join");
        tx.send(event).await.expect("session dropped the event channel");
    }

    /// Close the remote event channel, as when the transport drops the session.
    pub fn close_events(&self) {
        self.inner.lock().unwrap().events_tx = None;
    }

    /// Release a join held by [`MockTransportBuilder::hold_join`].
    pub fn release_join(&self) {
        if let Some(gate) = &self.join_gate {
            gate.notify_one();
        }
    }

    fn record(&self, call: TransportCall) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn next_track(&self, kind: MediaKind) -> TrackHandle {
        let mut inner = self.inner.lock().unwrap();
        inner.next_track += 1;
        TrackHandle::new(format!("local-{}-{}", kind.as_str(), inner.next_track), kind)
    }
}

fn fail_or_ok(failure: &Option<TransportError>) -> Result<(), TransportError> {
    match failure {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

#[async_trait]
impl MediaTransport for MockTransport {
    async fn join(
        &self,
        _app_id: &str,
        channel: &ChannelName,
        _token: &SecretString,
        local_id: &ParticipantId,
    ) -> Result<JoinedTransport, TransportError> {
        self.record(TransportCall::Join {
            channel: channel.to_string(),
            local_id: local_id.to_string(),
        });
        if let Some(gate) = &self.join_gate {
            gate.notified().await;
        }
        fail_or_ok(&self.failures.join)?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.inner.lock().unwrap().events_tx = Some(tx);
        Ok(JoinedTransport {
            local_id: self.assigned_id.clone().unwrap_or_else(|| local_id.clone()),
            events: rx,
        })
    }

    async fn create_camera_video_track(&self) -> Result<TrackHandle, TransportError> {
        self.record(TransportCall::CreateCamera);
        fail_or_ok(&self.failures.camera)?;
        Ok(self.next_track(MediaKind::Video))
    }

    async fn create_microphone_audio_track(&self) -> Result<TrackHandle, TransportError> {
        self.record(TransportCall::CreateMicrophone);
        fail_or_ok(&self.failures.microphone)?;
        Ok(self.next_track(MediaKind::Audio))
    }

    async fn publish(&self, tracks: &[TrackHandle]) -> Result<(), TransportError> {
        self.record(TransportCall::Publish(
            tracks.iter().map(|t| t.track_id().to_string()).collect(),
        ));
        fail_or_ok(&self.failures.publish)
    }

    async fn set_track_enabled(
        &self,
        track: &TrackHandle,
        enabled: bool,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::SetTrackEnabled {
            track_id: track.track_id().to_string(),
            enabled,
        });
        fail_or_ok(&self.failures.set_track_enabled)
    }

    async fn stop_track(&self, track: &TrackHandle) -> Result<(), TransportError> {
        self.record(TransportCall::StopTrack(track.track_id().to_string()));
        fail_or_ok(&self.failures.stop_track)
    }

    async fn leave(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Leave);
        self.inner.lock().unwrap().events_tx = None;
        if self.hang_leave {
            std::future::pending::<()>().await;
        }
        fail_or_ok(&self.failures.leave)
    }
}

/// Builder for [`MockTransport`].
#[derive(Debug, Default)]
pub struct MockTransportBuilder {
    failures: Failures,
    hold_join: bool,
    hang_leave: bool,
    assigned_id: Option<ParticipantId>,
}

impl MockTransportBuilder {
    #[must_use]
    pub fn fail_join(mut self, err: TransportError) -> Self {
        self.failures.join = Some(err);
        self
    }

    #[must_use]
    pub fn fail_camera(mut self, err: TransportError) -> Self {
        self.failures.camera = Some(err);
        self
    }

    #[must_use]
    pub fn fail_microphone(mut self, err: TransportError) -> Self {
        self.failures.microphone = Some(err);
        self
    }

    #[must_use]
    pub fn fail_publish(mut self, err: TransportError) -> Self {
        self.failures.publish = Some(err);
        self
    }

    #[must_use]
    pub fn fail_set_track_enabled(mut self, err: TransportError) -> Self {
        self.failures.set_track_enabled = Some(err);
        self
    }

    #[must_use]
    pub fn fail_stop_track(mut self, err: TransportError) -> Self {
        self.failures.stop_track = Some(err);
        self
    }

    #[must_use]
    pub fn fail_leave(mut self, err: TransportError) -> Self {
        self.failures.leave = Some(err);
        self
    }

    /// Block `join` until [`MockTransport::release_join`] is called.
    #[must_use]
    pub fn hold_join(mut self) -> Self {
        self.hold_join = true;
        self
    }

    /// Never complete `leave`.
    #[must_use]
    pub fn hang_leave(mut self) -> Self {
        self.hang_leave = true;
        self
    }

    /// Return `id` from join instead of echoing the requested id.
    #[must_use]
    pub fn assign_local_id(mut self, id: &str) -> Self {
        self.assigned_id = Some(ParticipantId::from(id));
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<MockTransport> {
        Arc::new(self.build_inner())
    }

    fn build_inner(self) -> MockTransport {
        MockTransport {
            inner: Mutex::new(MockTransportInner::default()),
            failures: self.failures,
            join_gate: self.hold_join.then(|| Arc::new(Notify::new())),
            hang_leave: self.hang_leave,
            assigned_id: self.assigned_id,
        }
    }
}
