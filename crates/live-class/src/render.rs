//! Render surface bindings.
//!
//! The UI owns video elements and audio sinks; this module decides which
//! track belongs where. [`RenderBindings`] remembers what is attached and
//! turns each new [`ViewModel`] into the minimal set of attach/detach calls,
//! so re-rendering never duplicates or leaks an element.
//!
//! Local audio is never played back.

use crate::participant::TrackHandle;
use crate::view_model::{ParticipantView, ViewModel};

use common::types::ParticipantId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a video is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The large main area.
    Main,
    /// Thumbnail strip position, zero-based.
    Thumbnail(usize),
}

/// Video containers and audio sinks of the UI.
pub trait RenderSurface: Send {
    /// Show `track` for `id` at `placement`.
    fn attach_video(&mut self, id: &ParticipantId, placement: Placement, track: &TrackHandle);

    /// Remove the video element of `id`.
    fn detach_video(&mut self, id: &ParticipantId);

    /// Start audio playback for a remote party.
    fn play_audio(&mut self, id: &ParticipantId, track: &TrackHandle);

    /// Stop audio playback for `id`.
    fn stop_audio(&mut self, id: &ParticipantId);
}

/// Calls issued by one [`RenderBindings::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderDiff {
    pub videos_attached: usize,
    pub videos_detached: usize,
    pub audio_started: usize,
    pub audio_stopped: usize,
}

impl RenderDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == RenderDiff::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VideoBinding {
    id: ParticipantId,
    placement: Placement,
    track: TrackHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AudioBinding {
    id: ParticipantId,
    track: TrackHandle,
}

/// What is currently attached to a render surface.
#[derive(Debug, Default)]
pub struct RenderBindings {
    videos: Vec<VideoBinding>,
    audio: Vec<AudioBinding>,
}

impl RenderBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring `surface` in line with `view`. `None` detaches everything.
    ///
    /// Bindings whose id, placement and track are unchanged are left alone;
    /// reconciling the same view twice issues no calls the second time.
    pub fn reconcile<S: RenderSurface + ?Sized>(
        &mut self,
        view: Option<&ViewModel>,
        surface: &mut S,
    ) -> RenderDiff {
        let (videos, audio) = view.map(desired_bindings).unwrap_or_default();
        let mut diff = RenderDiff::default();

        for stale in self.videos.iter().filter(|b| !videos.contains(b)) {
            surface.detach_video(&stale.id);
            diff.videos_detached += 1;
        }
        for fresh in videos.iter().filter(|b| !self.videos.contains(b)) {
            surface.attach_video(&fresh.id, fresh.placement, &fresh.track);
            diff.videos_attached += 1;
        }

        for stale in self.audio.iter().filter(|b| !audio.contains(b)) {
            surface.stop_audio(&stale.id);
            diff.audio_stopped += 1;
        }
        for fresh in audio.iter().filter(|b| !self.audio.contains(b)) {
            surface.play_audio(&fresh.id, &fresh.track);
            diff.audio_started += 1;
        }

        self.videos = videos;
        self.audio = audio;
        diff
    }

    /// Detach everything.
    pub fn clear<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> RenderDiff {
        self.reconcile(None, surface)
    }

    /// Ids with an attached video, in display order.
    #[must_use]
    pub fn attached_videos(&self) -> Vec<(ParticipantId, Placement)> {
        self.videos
            .iter()
            .map(|b| (b.id.clone(), b.placement))
            .collect()
    }

    /// Ids with audio playing.
    #[must_use]
    pub fn playing_audio(&self) -> Vec<ParticipantId> {
        self.audio.iter().map(|b| b.id.clone()).collect()
    }
}

fn desired_bindings(view: &ViewModel) -> (Vec<VideoBinding>, Vec<AudioBinding>) {
    let placed = std::iter::once((Placement::Main, &view.main)).chain(
        view.thumbnails
            .iter()
            .enumerate()
            .map(|(index, entry)| (Placement::Thumbnail(index), entry)),
    );

    let mut videos = Vec::new();
    let mut audio = Vec::new();
    for (placement, entry) in placed {
        push_bindings(entry, placement, &mut videos, &mut audio);
    }
    (videos, audio)
}

fn push_bindings(
    entry: &ParticipantView,
    placement: Placement,
    videos: &mut Vec<VideoBinding>,
    audio: &mut Vec<AudioBinding>,
) {
    if let Some(track) = &entry.video_track {
        videos.push(VideoBinding {
            id: entry.id.clone(),
            placement,
            track: track.clone(),
        });
    }
    if entry.is_local {
        return;
    }
    if let Some(track) = &entry.audio_track {
        audio.push(AudioBinding {
            id: entry.id.clone(),
            track: track.clone(),
        });
    }
}

/// Drive `surface` from a view model channel until cancelled or the channel
/// closes, then detach everything and hand the surface back.
pub fn spawn_render_task<S>(
    mut view_rx: watch::Receiver<Option<ViewModel>>,
    mut surface: S,
    cancel_token: CancellationToken,
) -> JoinHandle<S>
where
    S: RenderSurface + 'static,
{
    tokio::spawn(async move {
        let mut bindings = RenderBindings::new();

        let initial = view_rx.borrow_and_update().clone();
        bindings.reconcile(initial.as_ref(), &mut surface);

        loop {
            tokio::select! {
                () = cancel_token.cancelled() => break,
                changed = view_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = view_rx.borrow_and_update().clone();
                    let diff = bindings.reconcile(view.as_ref(), &mut surface);
                    if !diff.is_empty() {
                        debug!(
                            target: "lc.render",
                            attached = diff.videos_attached,
                            detached = diff.videos_detached,
                            audio_started = diff.audio_started,
                            audio_stopped = diff.audio_stopped,
                            "Render surface reconciled"
                        );
                    }
                }
            }
        }

        let diff = bindings.clear(&mut surface);
        info!(
            target: "lc.render",
            detached = diff.videos_detached,
            audio_stopped = diff.audio_stopped,
            "Render task stopped"
        );
        surface
    })
}
