//! View model builder: who is pinned in the main area and who sits in the
//! thumbnail strip.
//!
//! Pure function of `(local participant, registry snapshot)`. The local
//! participant carries the local role.
//!
//! Selection:
//! 1. `remote_teacher` = first remote with `role == Teacher`, in registry order
//! 2. Local is main when the local role is Teacher or no remote teacher exists
//! 3. Local main: thumbnails are every remote, in registry order
//! 4. Remote teacher main: thumbnails are `[local, remotes except that teacher]`
//!
//! When several remotes claim the teacher role the first one wins. That is a
//! known ambiguity of the id convention, not a resolution policy.

use crate::participant::{Participant, Role, TrackHandle};
use crate::registry::RegistrySnapshot;

use common::types::ParticipantId;

/// One tile of the layout, with presentation flags derived from track presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub is_local: bool,
    pub role: Role,
    pub is_teacher: bool,
    pub is_video_enabled: bool,
    pub is_audio_enabled: bool,
    pub video_track: Option<TrackHandle>,
    pub audio_track: Option<TrackHandle>,
}

impl ParticipantView {
    fn from_participant(participant: &Participant, is_teacher: bool) -> Self {
        Self {
            id: participant.id.clone(),
            is_local: participant.is_local,
            role: participant.role,
            is_teacher,
            is_video_enabled: participant.video_track.is_some(),
            is_audio_enabled: participant.audio_track.is_some(),
            video_track: participant.video_track.clone(),
            audio_track: participant.audio_track.clone(),
        }
    }
}

/// Layout for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub main: ParticipantView,
    pub thumbnails: Vec<ParticipantView>,
}

impl ViewModel {
    /// Main entry followed by the thumbnails, in display order.
    pub fn entries(&self) -> impl Iterator<Item = &ParticipantView> {
        std::iter::once(&self.main).chain(self.thumbnails.iter())
    }

    #[must_use]
    pub fn find(&self, id: &ParticipantId) -> Option<&ParticipantView> {
        self.entries().find(|entry| &entry.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.thumbnails.len()
    }

    /// Always false: a view model has a main entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Build the layout for the current session state.
#[must_use]
pub fn build_view_model(local: &Participant, remotes: &RegistrySnapshot) -> ViewModel {
    let local_is_teacher = local.role == Role::Teacher;
    let remote_teacher = remotes.iter().find(|p| p.role == Role::Teacher);

    match remote_teacher {
        Some(teacher) if !local_is_teacher => {
            let thumbnails = std::iter::once(ParticipantView::from_participant(
                local,
                local_is_teacher,
            ))
            .chain(
                remotes
                    .iter()
                    .filter(|p| p.id != teacher.id)
                    .map(|p| ParticipantView::from_participant(p, p.is_teacher())),
            )
            .collect();

            ViewModel {
                main: ParticipantView::from_participant(teacher, true),
                thumbnails,
            }
        }
        _ => ViewModel {
            main: ParticipantView::from_participant(local, local_is_teacher),
            thumbnails: remotes
                .iter()
                .map(|p| ParticipantView::from_participant(p, p.is_teacher()))
                .collect(),
        },
    }
}
