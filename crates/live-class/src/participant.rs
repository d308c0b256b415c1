//! Participant, role and track types shared by the registry and view model.

use common::types::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id prefix that classifies a remote party as the teacher.
///
/// Presentation convention only; nothing authenticates it.
pub const TEACHER_ID_PREFIX: &str = "teacher-";

/// Id prefix used when minting a local student id.
pub const STUDENT_ID_PREFIX: &str = "student-";

/// Presentation role of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    /// Classify a remote id by naming convention.
    ///
    /// Called once when a remote entry is created; the result is stored on the
    /// participant and never re-derived.
    #[must_use]
    pub fn from_participant_id(id: &ParticipantId) -> Self {
        if id.as_str().starts_with(TEACHER_ID_PREFIX) {
            Role::Teacher
        } else {
            Role::Student
        }
    }

    /// Prefix used for ids minted for this role.
    #[must_use]
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Role::Teacher => TEACHER_ID_PREFIX,
            Role::Student => STUDENT_ID_PREFIX,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of media a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Label value for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a live media stream owned by the transport.
///
/// Cloning the handle does not duplicate the stream. Whoever drops the last
/// registry reference releases the stream through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackHandle {
    track_id: String,
    kind: MediaKind,
}

impl TrackHandle {
    #[must_use]
    pub fn new(track_id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            track_id: track_id.into(),
            kind,
        }
    }

    #[must_use]
    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// One party in a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub is_local: bool,
    pub role: Role,
    pub video_track: Option<TrackHandle>,
    pub audio_track: Option<TrackHandle>,
}

impl Participant {
    /// Create a remote participant with no tracks, role inferred from the id.
    #[must_use]
    pub fn remote(id: ParticipantId) -> Self {
        let role = Role::from_participant_id(&id);
        Self {
            id,
            is_local: false,
            role,
            video_track: None,
            audio_track: None,
        }
    }

    /// Create the local participant with an explicit role.
    #[must_use]
    pub fn local(id: ParticipantId, role: Role) -> Self {
        Self {
            id,
            is_local: true,
            role,
            video_track: None,
            audio_track: None,
        }
    }

    /// Track field for a media kind.
    #[must_use]
    pub fn track(&self, kind: MediaKind) -> Option<&TrackHandle> {
        match kind {
            MediaKind::Audio => self.audio_track.as_ref(),
            MediaKind::Video => self.video_track.as_ref(),
        }
    }

    /// Overwrite the track field for `kind`, returning the previous handle.
    pub fn set_track(&mut self, kind: MediaKind, track: TrackHandle) -> Option<TrackHandle> {
        self.slot_mut(kind).replace(track)
    }

    /// Clear the track field for `kind`, returning the cleared handle.
    pub fn clear_track(&mut self, kind: MediaKind) -> Option<TrackHandle> {
        self.slot_mut(kind).take()
    }

    /// Remove and return both tracks.
    pub fn take_tracks(&mut self) -> Vec<TrackHandle> {
        self.video_track
            .take()
            .into_iter()
            .chain(self.audio_track.take())
            .collect()
    }

    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut Option<TrackHandle> {
        match kind {
            MediaKind::Audio => &mut self.audio_track,
            MediaKind::Video => &mut self.video_track,
        }
    }
}
