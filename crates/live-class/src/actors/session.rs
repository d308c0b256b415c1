//! `SessionActor` - owns one live-class session.
//!
//! Every mutation of session state goes through this actor: join, leave,
//! local track toggles, and remote transport events. The actor applies them
//! one at a time, so the registry and the local participant are never
//! observed half-updated.
//!
//! # Join
//!
//! 1. Permission gate (camera + microphone)
//! 2. Transport join
//! 3. Create camera and microphone tracks
//! 4. Publish both tracks
//!
//! A failure at any step closes whatever was created, leaves the transport
//! best-effort and reports `SessionStatus::Failed`. Nothing is retried.
//! Cancelling the actor interrupts a join at whichever step it is waiting on
//! and rolls it back the same way.
//!
//! Only one join or leave runs at a time across all clones of a handle; a
//! second one is rejected with `Busy` before it reaches the mailbox.
//!
//! # Leave
//!
//! Local state is cleared, `SessionStatus::Left` is published and the caller
//! is answered before the transport is asked to leave. The transport call is
//! bounded by `Config::leave_timeout` and its failures are only logged.

use crate::config::Config;
use crate::errors::LiveClassError;
use crate::live_session::LiveSessions;
use crate::observability;
use crate::participant::{MediaKind, Participant, Role, TrackHandle};
use crate::permissions::{PermissionGate, PermissionProvider};
use crate::registry::{ParticipantRegistry, RegistrySnapshot};
use crate::transport::{JoinedTransport, MediaTransport, TransportError, TransportEvent};
use crate::view_model::{build_view_model, ViewModel};

use super::messages::{
    JoinOutcome, JoinRequest, SessionMessage, SessionState, SessionStatus,
};
use super::metrics::{MailboxMonitor, SessionMetrics, SessionMetricsSnapshot};

use chrono::Utc;
use common::data_access::DataAccess;
use common::types::{ChannelName, ParticipantId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Handle to a `SessionActor`.
#[derive(Clone)]
pub struct SessionActorHandle {
    sender: mpsc::Sender<SessionMessage>,
    cancel_token: CancellationToken,
    status_rx: watch::Receiver<SessionStatus>,
    view_rx: watch::Receiver<Option<ViewModel>>,
    metrics: Arc<SessionMetrics>,
    mailbox: Arc<MailboxMonitor>,
    /// One permit, held by the join or leave in flight.
    lifecycle: Arc<Semaphore>,
}

impl SessionActorHandle {
    /// Join a channel and publish camera and microphone.
    ///
    /// # Errors
    ///
    /// - `Busy` while another join or leave is running
    /// - `AlreadyJoined` when already in a channel
    /// - `PermissionDenied`, `JoinFailed`, `PublishFailed` from the join steps
    pub async fn join(&self, request: JoinRequest) -> Result<JoinOutcome, LiveClassError> {
        let _permit = self.claim_lifecycle()?;
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::Join {
            request,
            respond_to: tx,
        })
        .await?;
        receive(rx).await?
    }

    /// Leave the channel. A no-op when not joined.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a join or leave is running. Transport failures
    /// during leave are logged, not returned.
    pub async fn leave(&self) -> Result<(), LiveClassError> {
        let _permit = self.claim_lifecycle()?;
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::Leave { respond_to: tx }).await?;
        receive(rx).await?
    }

    /// Enable or disable a local track.
    ///
    /// # Errors
    ///
    /// Returns `NotJoined` outside a session and `PublishFailed` when the
    /// transport rejects the toggle.
    pub async fn set_track_enabled(
        &self,
        kind: MediaKind,
        enabled: bool,
    ) -> Result<(), LiveClassError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::SetTrackEnabled {
            kind,
            enabled,
            respond_to: tx,
        })
        .await?;
        receive(rx).await?
    }

    /// Current view model, `None` when not joined.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the actor has stopped.
    pub async fn view_model(&self) -> Result<Option<ViewModel>, LiveClassError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::GetViewModel { respond_to: tx })
            .await?;
        receive(rx).await
    }

    /// Remote participants in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the actor has stopped.
    pub async fn snapshot(&self) -> Result<RegistrySnapshot, LiveClassError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::GetSnapshot { respond_to: tx })
            .await?;
        receive(rx).await
    }

    /// Full session state.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the actor has stopped.
    pub async fn get_state(&self) -> Result<SessionState, LiveClassError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::GetState { respond_to: tx }).await?;
        receive(rx).await
    }

    /// Latest published status. Does not wait on the actor.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }

    /// Status changes, for UI state.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// View model changes, for the render surface.
    #[must_use]
    pub fn subscribe_view(&self) -> watch::Receiver<Option<ViewModel>> {
        self.view_rx.clone()
    }

    #[must_use]
    pub fn metrics(&self) -> SessionMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Queue depth of the actor, counting the message being handled.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxMonitor {
        &self.mailbox
    }

    /// Cancel the actor. It leaves the channel before exiting.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    fn claim_lifecycle(&self) -> Result<OwnedSemaphorePermit, LiveClassError> {
        Arc::clone(&self.lifecycle).try_acquire_owned().map_err(|_| {
            LiveClassError::Busy(self.status_rx.borrow().as_str().to_string())
        })
    }

    async fn send(&self, message: SessionMessage) -> Result<(), LiveClassError> {
        self.mailbox.record_enqueue();
        self.sender.send(message).await.map_err(|e| {
            self.mailbox.record_rejected();
            LiveClassError::Internal(format!("channel send failed: {e}"))
        })
    }
}

async fn receive<T>(rx: oneshot::Receiver<T>) -> Result<T, LiveClassError> {
    rx.await
        .map_err(|e| LiveClassError::Internal(format!("response receive failed: {e}")))
}

/// Local side of a joined session.
struct LocalSession {
    /// Local participant; track fields hold only enabled tracks.
    participant: Participant,
    channel: ChannelName,
    live_session_id: Option<String>,
    camera: TrackHandle,
    microphone: TrackHandle,
}

impl LocalSession {
    fn published_track(&self, kind: MediaKind) -> &TrackHandle {
        match kind {
            MediaKind::Video => &self.camera,
            MediaKind::Audio => &self.microphone,
        }
    }
}

/// What a join in progress has acquired so far.
#[derive(Debug, Default)]
struct PendingJoin {
    /// Set once `MediaTransport::join` has been called and not rejected.
    transport_entered: bool,
    tracks: Vec<TrackHandle>,
}

/// The session actor implementation.
pub struct SessionActor {
    config: Config,
    receiver: mpsc::Receiver<SessionMessage>,
    cancel_token: CancellationToken,
    transport: Arc<dyn MediaTransport>,
    gate: PermissionGate,
    live_sessions: Option<LiveSessions>,
    registry: ParticipantRegistry,
    local: Option<LocalSession>,
    pending: Option<PendingJoin>,
    /// Remote events of the joined channel, `None` outside a session.
    events: Option<mpsc::Receiver<TransportEvent>>,
    status_tx: watch::Sender<SessionStatus>,
    view_tx: watch::Sender<Option<ViewModel>>,
    metrics: Arc<SessionMetrics>,
    mailbox: Arc<MailboxMonitor>,
}

impl SessionActor {
    /// Spawn a new session actor.
    ///
    /// Returns a handle and the task join handle.
    ///
    /// # Arguments
    ///
    /// * `config` - App id, token, local identity and timeouts
    /// * `transport` - Real-time media SDK adapter
    /// * `permissions` - Platform camera/microphone permission API
    /// * `data_access` - Backing store for live-session side calls; `None`
    ///   disables them
    /// * `cancel_token` - Cancellation token for shutdown
    pub fn spawn(
        config: Config,
        transport: Arc<dyn MediaTransport>,
        permissions: Arc<dyn PermissionProvider>,
        data_access: Option<Arc<dyn DataAccess>>,
        cancel_token: CancellationToken,
    ) -> (SessionActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.mailbox_size);
        let (status_tx, status_rx) = watch::channel(SessionStatus::Idle);
        let (view_tx, view_rx) = watch::channel(None);
        let metrics = SessionMetrics::new();
        let mailbox = Arc::new(MailboxMonitor::new(config.local_id.as_str()));

        let actor = Self {
            config,
            receiver,
            cancel_token: cancel_token.clone(),
            transport,
            gate: PermissionGate::new(permissions),
            live_sessions: data_access.map(LiveSessions::new),
            registry: ParticipantRegistry::new(),
            local: None,
            pending: None,
            events: None,
            status_tx,
            view_tx,
            metrics: Arc::clone(&metrics),
            mailbox: Arc::clone(&mailbox),
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionActorHandle {
            sender,
            cancel_token,
            status_rx,
            view_rx,
            metrics,
            mailbox,
            lifecycle: Arc::new(Semaphore::new(1)),
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "lc.actor.session", fields(local_id = %self.config.local_id))]
    async fn run(mut self) {
        info!(
            target: "lc.actor.session",
            local_id = %self.config.local_id,
            role = %self.config.local_role,
            "SessionActor started"
        );

        loop {
            tokio::select! {
                // Remote events are applied before later requests are answered.
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "lc.actor.session",
                        "SessionActor received cancellation signal"
                    );
                    self.end_session("cancelled").await;
                    break;
                }

                event = next_event(&mut self.events) => {
                    match event {
                        Some(event) => self.apply_event(event).await,
                        None => {
                            info!(
                                target: "lc.actor.session",
                                "Transport event stream closed, leaving"
                            );
                            self.events = None;
                            self.end_session("transport_closed").await;
                        }
                    }
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message).await;
                            self.mailbox.record_dequeue();
                        }
                        None => {
                            info!(
                                target: "lc.actor.session",
                                "SessionActor channel closed, exiting"
                            );
                            self.end_session("handles_dropped").await;
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "lc.actor.session",
            local_id = %self.config.local_id,
            messages_processed = self.mailbox.messages_processed(),
            "SessionActor stopped"
        );
    }

    /// Handle a single message.
    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join {
                request,
                respond_to,
            } => {
                let result = self.handle_join(request).await;
                let _ = respond_to.send(result);
            }
            SessionMessage::Leave { respond_to } => {
                let ended = self.handle_leave().await;
                let _ = respond_to.send(Ok(()));
                if let Some(local) = ended {
                    self.finish_leave(local).await;
                }
            }
            SessionMessage::SetTrackEnabled {
                kind,
                enabled,
                respond_to,
            } => {
                let result = self.handle_set_track_enabled(kind, enabled).await;
                let _ = respond_to.send(result);
            }
            SessionMessage::GetViewModel { respond_to } => {
                let _ = respond_to.send(self.view_tx.borrow().clone());
            }
            SessionMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.registry.snapshot());
            }
            SessionMessage::GetState { respond_to } => {
                let _ = respond_to.send(self.get_state());
            }
        }
    }

    #[instrument(skip_all, fields(channel = %request.channel))]
    async fn handle_join(&mut self, request: JoinRequest) -> Result<JoinOutcome, LiveClassError> {
        if let Some(local) = &self.local {
            return Err(LiveClassError::AlreadyJoined(local.channel.to_string()));
        }

        let started = Instant::now();
        self.metrics.join_attempted();
        observability::record_join_attempt();

        // Each attempt asks the platform again.
        self.gate.reset();

        let cancel_token = self.cancel_token.clone();
        let result = tokio::select! {
            biased;
            () = cancel_token.cancelled() => Err(LiveClassError::Cancelled),
            result = self.connect(&request) => result,
        };
        if result.is_err() {
            self.rollback_join().await;
        }

        match result {
            Ok(outcome) => {
                observability::record_join_duration(started.elapsed());
                self.set_status(SessionStatus::Joined {
                    local_id: outcome.local_id.clone(),
                    channel: outcome.channel.clone(),
                });
                self.publish_view();
                info!(
                    target: "lc.actor.session",
                    local_id = %outcome.local_id,
                    channel = %outcome.channel,
                    permission_prompted = outcome.permission_prompted,
                    "Joined live class"
                );

                if self.config.local_role == Role::Teacher {
                    if let Some(id) = &request.live_session_id {
                        self.start_live_session(id, &outcome.local_id).await;
                    }
                }

                Ok(outcome)
            }
            Err(LiveClassError::Cancelled) => {
                self.set_status(SessionStatus::Left);
                info!(
                    target: "lc.actor.session",
                    channel = %request.channel,
                    "Join interrupted by cancellation"
                );
                Err(LiveClassError::Cancelled)
            }
            Err(e) => {
                let kind = e.failure_kind();
                self.metrics.join_failed();
                observability::record_join_failure(kind.as_str());
                self.set_status(SessionStatus::Failed(kind));
                warn!(
                    target: "lc.actor.session",
                    channel = %request.channel,
                    error = %e,
                    "Join failed"
                );
                Err(e)
            }
        }
    }

    /// Run the join steps, recording every acquired resource in `pending`
    /// so an error or a cancellation can hand them to `rollback_join`.
    async fn connect(&mut self, request: &JoinRequest) -> Result<JoinOutcome, LiveClassError> {
        self.pending = Some(PendingJoin::default());

        self.set_status(SessionStatus::CheckingPermissions);
        let grant = self.gate.ensure_access().await?;

        self.set_status(SessionStatus::Joining);
        self.with_pending(|pending| pending.transport_entered = true);
        let joined = self
            .transport
            .join(
                &self.config.app_id,
                &request.channel,
                &self.config.transport_token,
                &self.config.local_id,
            )
            .await;
        let JoinedTransport { local_id, events } = joined.map_err(|e| {
            self.with_pending(|pending| pending.transport_entered = false);
            LiveClassError::join_failed(&e)
        })?;

        self.set_status(SessionStatus::Publishing);
        let camera = self
            .transport
            .create_camera_video_track()
            .await
            .map_err(|e| LiveClassError::join_failed(&e))?;
        self.with_pending(|pending| pending.tracks.push(camera.clone()));

        let microphone = self
            .transport
            .create_microphone_audio_track()
            .await
            .map_err(|e| LiveClassError::join_failed(&e))?;
        self.with_pending(|pending| pending.tracks.push(microphone.clone()));

        self.transport
            .publish(&[camera.clone(), microphone.clone()])
            .await
            .map_err(|e| LiveClassError::publish_failed(&e))?;

        let mut participant = Participant::local(local_id.clone(), self.config.local_role);
        participant.set_track(MediaKind::Video, camera.clone());
        participant.set_track(MediaKind::Audio, microphone.clone());

        self.pending = None;
        self.local = Some(LocalSession {
            participant,
            channel: request.channel.clone(),
            live_session_id: request.live_session_id.clone(),
            camera,
            microphone,
        });
        self.events = Some(events);

        Ok(JoinOutcome {
            local_id,
            channel: request.channel.clone(),
            permission_prompted: grant.was_prompted(),
        })
    }

    fn with_pending(&mut self, update: impl FnOnce(&mut PendingJoin)) {
        if let Some(pending) = self.pending.as_mut() {
            update(pending);
        }
    }

    /// Undo a join that failed or was cancelled part way.
    async fn rollback_join(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        for track in &pending.tracks {
            self.release_track(track, "local_track").await;
        }
        if pending.transport_entered {
            self.leave_transport().await;
        }
        debug!(
            target: "lc.actor.session",
            released = pending.tracks.len(),
            left_transport = pending.transport_entered,
            "Partial join rolled back"
        );
    }

    #[instrument(skip_all)]
    async fn handle_leave(&mut self) -> Option<LocalSession> {
        if self.local.is_none() {
            debug!(target: "lc.actor.session", "Leave while not joined ignored");
            return None;
        }
        self.teardown_local("requested").await
    }

    /// Tear down the joined session, if any, including the transport leave.
    async fn end_session(&mut self, reason: &'static str) {
        if let Some(local) = self.teardown_local(reason).await {
            self.finish_leave(local).await;
        }
    }

    /// Release local and remote tracks, clear state and publish `Left`.
    ///
    /// Returns the ended session for [`Self::finish_leave`].
    async fn teardown_local(&mut self, reason: &'static str) -> Option<LocalSession> {
        let local = self.local.take()?;
        self.set_status(SessionStatus::Leaving);

        self.events = None;
        let remotes = self.registry.drain();
        self.view_tx.send_replace(None);
        self.metrics.set_remote_participants(0);
        observability::set_remote_participants(0);

        self.release_track(&local.camera, "local_track").await;
        self.release_track(&local.microphone, "local_track").await;
        for mut remote in remotes {
            for track in remote.take_tracks() {
                self.release_track(&track, "remote_track").await;
            }
        }

        self.set_status(SessionStatus::Left);
        info!(
            target: "lc.actor.session",
            local_id = %local.participant.id,
            channel = %local.channel,
            reason,
            "Left live class"
        );
        Some(local)
    }

    /// Transport leave and live-session bookkeeping after local teardown.
    /// Failures and timeouts are logged, never reported.
    async fn finish_leave(&self, local: LocalSession) {
        self.leave_transport().await;

        if local.participant.is_teacher() {
            if let Some(id) = &local.live_session_id {
                self.end_live_session(id).await;
            }
        }
    }

    /// Ask the transport to leave, bounded by the configured timeout.
    async fn leave_transport(&self) {
        match tokio::time::timeout(self.config.leave_timeout, self.transport.leave()).await {
            Ok(Ok(())) => {
                debug!(target: "lc.actor.session", "Transport left channel");
            }
            Ok(Err(e)) => {
                self.cleanup_failed("transport_leave");
                warn!(
                    target: "lc.actor.session",
                    error = %e,
                    "Transport leave failed"
                );
            }
            Err(_) => {
                self.cleanup_failed("transport_leave");
                warn!(
                    target: "lc.actor.session",
                    timeout_ms = u64::try_from(self.config.leave_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Transport leave timed out"
                );
            }
        }
    }

    async fn release_track(&self, track: &TrackHandle, stage: &'static str) {
        if let Err(e) = self.transport.stop_track(track).await {
            self.cleanup_failed(stage);
            warn!(
                target: "lc.actor.session",
                track_id = %track.track_id(),
                kind = %track.kind(),
                error = %e,
                "Failed to stop track"
            );
        }
    }

    fn cleanup_failed(&self, stage: &'static str) {
        self.metrics.cleanup_failed();
        observability::record_cleanup_failure(stage);
    }

    #[instrument(skip_all, fields(kind = %kind, enabled = enabled))]
    async fn handle_set_track_enabled(
        &mut self,
        kind: MediaKind,
        enabled: bool,
    ) -> Result<(), LiveClassError> {
        let track = match &self.local {
            Some(local) => local.published_track(kind).clone(),
            None => return Err(LiveClassError::NotJoined),
        };

        self.transport
            .set_track_enabled(&track, enabled)
            .await
            .map_err(|e| LiveClassError::publish_failed(&e))?;

        // `local` cannot change across the await; only this actor writes it.
        if let Some(local) = self.local.as_mut() {
            if enabled {
                local.participant.set_track(kind, track);
            } else {
                local.participant.clear_track(kind);
            }
        }
        self.publish_view();

        debug!(
            target: "lc.actor.session",
            kind = %kind,
            enabled,
            "Local track toggled"
        );
        Ok(())
    }

    /// Apply one remote event to the registry.
    async fn apply_event(&mut self, event: TransportEvent) {
        let label = event.label();

        let is_local = self
            .local
            .as_ref()
            .is_some_and(|local| &local.participant.id == event.remote_id());
        if is_local {
            debug!(
                target: "lc.actor.session",
                event = label,
                "Ignoring transport event for the local participant"
            );
            return;
        }

        let applied = match event {
            TransportEvent::Published {
                remote_id,
                kind,
                track,
            } => {
                let incoming = track.clone();
                if let Some(displaced) = self.registry.on_published(&remote_id, kind, track) {
                    if displaced != incoming {
                        self.release_track(&displaced, "remote_track").await;
                    }
                }
                true
            }
            TransportEvent::Unpublished { remote_id, kind } => {
                if self.registry.contains(&remote_id) {
                    if let Some(cleared) = self.registry.on_unpublished(&remote_id, kind) {
                        self.release_track(&cleared, "remote_track").await;
                    }
                    true
                } else {
                    false
                }
            }
            TransportEvent::Left { remote_id } => match self.registry.on_left(&remote_id) {
                Some(mut removed) => {
                    for track in removed.take_tracks() {
                        self.release_track(&track, "remote_track").await;
                    }
                    true
                }
                None => false,
            },
        };

        if applied {
            self.metrics.event_applied();
            observability::record_transport_event(label);
        } else {
            self.metrics.stale_event();
            observability::record_stale_event(label);
            debug!(
                target: "lc.actor.session",
                event = label,
                "Stale transport event for unknown participant"
            );
        }

        let remote_count = self.registry.len();
        self.metrics.set_remote_participants(remote_count);
        observability::set_remote_participants(remote_count);
        self.publish_view();
    }

    /// Rebuild and publish the view model from current state.
    fn publish_view(&self) {
        let view = self
            .local
            .as_ref()
            .map(|local| build_view_model(&local.participant, &self.registry.snapshot()));
        self.view_tx.send_replace(view);
    }

    fn set_status(&self, status: SessionStatus) {
        debug!(
            target: "lc.actor.session",
            status = status.as_str(),
            "Session status changed"
        );
        self.status_tx.send_replace(status);
    }

    fn get_state(&self) -> SessionState {
        SessionState {
            status: self.status_tx.borrow().clone(),
            local: self.local.as_ref().map(|l| l.participant.clone()),
            remote_count: self.registry.len(),
            live_session_id: self
                .local
                .as_ref()
                .and_then(|l| l.live_session_id.clone()),
            messages_processed: self.mailbox.messages_processed(),
        }
    }

    /// Stamp the live session as started and announce it. Failures are logged.
    async fn start_live_session(&self, id: &str, teacher_id: &ParticipantId) {
        let Some(live_sessions) = &self.live_sessions else {
            return;
        };
        let now = Utc::now();

        if let Err(e) = live_sessions.mark_started(id, now).await {
            warn!(
                target: "lc.live_session",
                live_session_id = %id,
                error = %e,
                "Failed to mark live session started"
            );
        }

        if !self.config.announce_on_start {
            return;
        }
        let announced = match live_sessions.fetch(id).await {
            Ok(record) => live_sessions
                .announce_class_started(&record, teacher_id, now)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = announced {
            warn!(
                target: "lc.live_session",
                live_session_id = %id,
                error = %e,
                "Failed to announce live session"
            );
        }
    }

    async fn end_live_session(&self, id: &str) {
        let Some(live_sessions) = &self.live_sessions else {
            return;
        };
        if let Err(e) = live_sessions.mark_ended(id, Utc::now()).await {
            warn!(
                target: "lc.live_session",
                live_session_id = %id,
                error = %e,
                "Failed to mark live session ended"
            );
        }
    }
}

/// Next remote event, or pending forever outside a session.
async fn next_event(events: &mut Option<mpsc::Receiver<TransportEvent>>) -> Option<TransportEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::permissions::{MediaDevice, PermissionStatus};
    use async_trait::async_trait;
    use common::secret::SecretString;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct AllowAll;

    #[async_trait]
    impl PermissionProvider for AllowAll {
        async fn query(&self, _device: MediaDevice) -> PermissionStatus {
            PermissionStatus::Granted
        }

        async fn request(&self, _devices: &[MediaDevice]) -> PermissionStatus {
            PermissionStatus::Granted
        }
    }

    /// Minimal transport: joins succeed, events come from `events_tx`.
    #[derive(Default)]
    struct StubTransport {
        events_tx: Mutex<Option<mpsc::Sender<TransportEvent>>>,
        fail_publish: bool,
        stopped: Mutex<Vec<String>>,
        leaves: Mutex<usize>,
    }

    #[async_trait]
    impl MediaTransport for StubTransport {
        async fn join(
            &self,
            _app_id: &str,
            _channel: &ChannelName,
            _token: &SecretString,
            local_id: &ParticipantId,
        ) -> Result<JoinedTransport, TransportError> {
            let (tx, rx) = mpsc::channel(16);
            *self.events_tx.lock().unwrap() = Some(tx);
            Ok(JoinedTransport {
                local_id: local_id.clone(),
                events: rx,
            })
        }

        async fn create_camera_video_track(&self) -> Result<TrackHandle, TransportError> {
            Ok(TrackHandle::new("cam", MediaKind::Video))
        }

        async fn create_microphone_audio_track(&self) -> Result<TrackHandle, TransportError> {
            Ok(TrackHandle::new("mic", MediaKind::Audio))
        }

        async fn publish(&self, _tracks: &[TrackHandle]) -> Result<(), TransportError> {
            if self.fail_publish {
                Err(TransportError::Network("ice failed".to_string()))
            } else {
                Ok(())
            }
        }

        async fn set_track_enabled(
            &self,
            _track: &TrackHandle,
            _enabled: bool,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        async fn stop_track(&self, track: &TrackHandle) -> Result<(), TransportError> {
            self.stopped
                .lock()
                .unwrap()
                .push(track.track_id().to_string());
            Ok(())
        }

        async fn leave(&self) -> Result<(), TransportError> {
            *self.leaves.lock().unwrap() += 1;
            Ok(())
        }
    }

    impl StubTransport {
        async fn emit(&self, event: TransportEvent) {
            let tx = self.events_tx.lock().unwrap().clone().unwrap();
            tx.send(event).await.unwrap();
        }
    }

    fn test_config(local_id: &str, role: &str) -> Config {
        let vars = HashMap::from([
            ("LIVE_CLASS_APP_ID".to_string(), "app".to_string()),
            ("LIVE_CLASS_TOKEN".to_string(), "token".to_string()),
            ("LIVE_CLASS_LOCAL_ID".to_string(), local_id.to_string()),
            ("LIVE_CLASS_ROLE".to_string(), role.to_string()),
        ]);
        Config::from_vars(&vars).unwrap()
    }

    fn spawn(transport: Arc<StubTransport>, config: Config) -> SessionActorHandle {
        let (handle, _task) = SessionActor::spawn(
            config,
            transport,
            Arc::new(AllowAll),
            None,
            CancellationToken::new(),
        );
        handle
    }

    #[tokio::test]
    async fn test_session_actor_spawn() {
        let handle = spawn(
            Arc::new(StubTransport::default()),
            test_config("student-1", "student"),
        );

        assert_eq!(handle.status(), SessionStatus::Idle);
        assert!(handle.view_model().await.unwrap().is_none());
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_join_publishes_local_view() {
        let handle = spawn(
            Arc::new(StubTransport::default()),
            test_config("student-1", "student"),
        );

        let outcome = handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await
            .unwrap();
        assert_eq!(outcome.local_id.as_str(), "student-1");
        assert!(!outcome.permission_prompted);
        assert!(handle.status().is_joined());

        let view = handle.view_model().await.unwrap().unwrap();
        assert!(view.main.is_local);
        assert!(view.main.is_video_enabled);
        assert!(view.main.is_audio_enabled);
        assert!(view.thumbnails.is_empty());

        handle.cancel();
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected() {
        let handle = spawn(
            Arc::new(StubTransport::default()),
            test_config("student-1", "student"),
        );
        handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await
            .unwrap();

        let second = handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await;
        assert!(matches!(second, Err(LiveClassError::AlreadyJoined(_))));

        handle.cancel();
    }

    #[tokio::test]
    async fn test_publish_failure_rolls_back() {
        let transport = Arc::new(StubTransport {
            fail_publish: true,
            ..StubTransport::default()
        });
        let handle = spawn(Arc::clone(&transport), test_config("student-1", "student"));

        let result = handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await;
        assert!(matches!(result, Err(LiveClassError::PublishFailed(_))));
        assert_eq!(
            handle.status(),
            SessionStatus::Failed(crate::errors::FailureKind::ConnectionFailed)
        );
        assert_eq!(*transport.stopped.lock().unwrap(), vec!["cam", "mic"]);
        assert_eq!(*transport.leaves.lock().unwrap(), 1);
        assert!(handle.view_model().await.unwrap().is_none());

        handle.cancel();
    }

    #[tokio::test]
    async fn test_remote_teacher_promoted_to_main() {
        let transport = Arc::new(StubTransport::default());
        let handle = spawn(Arc::clone(&transport), test_config("student-1", "student"));
        handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await
            .unwrap();

        transport
            .emit(TransportEvent::Published {
                remote_id: ParticipantId::from("teacher-9"),
                kind: MediaKind::Video,
                track: TrackHandle::new("t9-video", MediaKind::Video),
            })
            .await;

        // The actor drains pending events before answering queries.
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        let view = handle.view_model().await.unwrap().unwrap();
        assert_eq!(view.main.id.as_str(), "teacher-9");
        assert_eq!(view.main.role, Role::Teacher);
        assert!(view.thumbnails.iter().any(|t| t.is_local));

        handle.cancel();
    }

    #[tokio::test]
    async fn test_toggle_clears_and_restores_track() {
        let handle = spawn(
            Arc::new(StubTransport::default()),
            test_config("student-1", "student"),
        );
        handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await
            .unwrap();

        handle
            .set_track_enabled(MediaKind::Video, false)
            .await
            .unwrap();
        let view = handle.view_model().await.unwrap().unwrap();
        assert!(!view.main.is_video_enabled);
        assert!(view.main.is_audio_enabled);

        handle
            .set_track_enabled(MediaKind::Video, true)
            .await
            .unwrap();
        let view = handle.view_model().await.unwrap().unwrap();
        assert!(view.main.is_video_enabled);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_toggle_requires_join() {
        let handle = spawn(
            Arc::new(StubTransport::default()),
            test_config("student-1", "student"),
        );
        let result = handle.set_track_enabled(MediaKind::Audio, false).await;
        assert!(matches!(result, Err(LiveClassError::NotJoined)));

        handle.cancel();
    }

    #[tokio::test]
    async fn test_cancel_leaves_session() {
        let transport = Arc::new(StubTransport::default());
        let cancel_token = CancellationToken::new();
        let (handle, task) = SessionActor::spawn(
            test_config("teacher-1", "teacher"),
            transport.clone(),
            Arc::new(AllowAll),
            None,
            cancel_token.clone(),
        );
        handle
            .join(JoinRequest::new(ChannelName::from("room")))
            .await
            .unwrap();

        cancel_token.cancel();
        task.await.unwrap();

        assert_eq!(handle.status(), SessionStatus::Left);
        assert_eq!(*transport.leaves.lock().unwrap(), 1);
        assert_eq!(*transport.stopped.lock().unwrap(), vec!["cam", "mic"]);
    }
}
