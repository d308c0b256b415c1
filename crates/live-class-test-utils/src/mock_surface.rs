//! Recording render surface.

use common::types::ParticipantId;
use live_class::participant::TrackHandle;
use live_class::render::{Placement, RenderSurface};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// One call made against the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    AttachVideo {
        id: String,
        placement: Placement,
        track_id: String,
    },
    DetachVideo(String),
    PlayAudio {
        id: String,
        track_id: String,
    },
    StopAudio(String),
}

#[derive(Debug, Default)]
struct SurfaceState {
    calls: Vec<SurfaceCall>,
    videos: BTreeMap<String, (Placement, String)>,
    audio: BTreeMap<String, String>,
}

/// Render surface that records calls and tracks what is on screen.
///
/// Clones share state, so a test can keep one clone while a render task owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Video currently shown for `id`: placement and track id.
    pub fn video(&self, id: &str) -> Option<(Placement, String)> {
        self.state.lock().unwrap().videos.get(id).cloned()
    }

    /// Ids with a video element, sorted.
    pub fn video_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().videos.keys().cloned().collect()
    }

    /// Ids with audio playing, sorted.
    pub fn audio_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().audio.keys().cloned().collect()
    }

    /// Id shown in the main area, if any.
    pub fn main_id(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .videos
            .iter()
            .find(|(_, (placement, _))| *placement == Placement::Main)
            .map(|(id, _)| id.clone())
    }
}

impl RenderSurface for RecordingSurface {
    fn attach_video(&mut self, id: &ParticipantId, placement: Placement, track: &TrackHandle) {
        let mut state = self.state.lock().unwrap();
        let previous = state.videos.insert(
            id.to_string(),
            (placement, track.track_id().to_string()),
        );
        assert!(previous.is_none(), "video for {id} attached twice");
        state.calls.push(SurfaceCall::AttachVideo {
            id: id.to_string(),
            placement,
            track_id: track.track_id().to_string(),
        });
    }

    fn detach_video(&mut self, id: &ParticipantId) {
        let mut state = self.state.lock().unwrap();
        state.videos.remove(id.as_str());
        state.calls.push(SurfaceCall::DetachVideo(id.to_string()));
    }

    fn play_audio(&mut self, id: &ParticipantId, track: &TrackHandle) {
        let mut state = self.state.lock().unwrap();
        let previous = state
            .audio
            .insert(id.to_string(), track.track_id().to_string());
        assert!(previous.is_none(), "audio for {id} started twice");
        state.calls.push(SurfaceCall::PlayAudio {
            id: id.to_string(),
            track_id: track.track_id().to_string(),
        });
    }

    fn stop_audio(&mut self, id: &ParticipantId) {
        let mut state = self.state.lock().unwrap();
        state.audio.remove(id.as_str());
        state.calls.push(SurfaceCall::StopAudio(id.to_string()));
    }
}
