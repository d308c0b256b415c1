//! Participant registry - the reconciliation core.
//!
//! Keeps the remote participants of a session and their tracks as the
//! transport's publish/unpublish/left events arrive. The registry is a pure,
//! trusting projection of the event stream it is fed:
//!
//! - An unseen id on `published` creates the entry (role inferred once)
//! - `unpublished` only clears a field; it never removes or recreates
//! - Only `left` removes an entry, taking both tracks with it
//! - Unknown ids on `unpublished`/`left` are benign no-ops
//!
//! Handles displaced by an overwrite or removal are returned to the caller,
//! which owns releasing the underlying stream.
//!
//! Entries keep first-seen order; that order is the "registry order" the view
//! model iterates.

use crate::participant::{MediaKind, Participant, TrackHandle};

use common::types::ParticipantId;
use tracing::debug;

/// Remote participants of one live session.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `published` event.
    ///
    /// Upserts the participant and overwrites the track field matching `kind`.
    /// Returns the handle that was displaced, if any.
    pub fn on_published(
        &mut self,
        id: &ParticipantId,
        kind: MediaKind,
        track: TrackHandle,
    ) -> Option<TrackHandle> {
        let participant = match self.position(id) {
            Some(index) => self.participants.get_mut(index)?,
            None => {
                let participant = Participant::remote(id.clone());
                debug!(
                    target: "lc.registry",
                    participant_id = %id,
                    role = %participant.role,
                    "Remote participant added"
                );
                self.participants.push(participant);
                self.participants.last_mut()?
            }
        };

        participant.set_track(kind, track)
    }

    /// Apply an `unpublished` event.
    ///
    /// Returns the cleared handle. Unknown ids are ignored.
    pub fn on_unpublished(&mut self, id: &ParticipantId, kind: MediaKind) -> Option<TrackHandle> {
        let Some(participant) = self.participants.iter_mut().find(|p| &p.id == id) else {
            debug!(
                target: "lc.registry",
                participant_id = %id,
                kind = %kind,
                "Unpublish for unknown participant ignored"
            );
            return None;
        };

        participant.clear_track(kind)
    }

    /// Apply a `left` event.
    ///
    /// Removes the participant and returns it with whatever tracks it still
    /// held. Idempotent.
    pub fn on_left(&mut self, id: &ParticipantId) -> Option<Participant> {
        let Some(index) = self.position(id) else {
            debug!(
                target: "lc.registry",
                participant_id = %id,
                "Leave for unknown participant ignored"
            );
            return None;
        };

        let removed = self.participants.remove(index);
        debug!(
            target: "lc.registry",
            participant_id = %id,
            remaining = self.participants.len(),
            "Remote participant removed"
        );
        Some(removed)
    }

    /// Owned copy of the current remote participants, in registry order.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            participants: self.participants.clone(),
        }
    }

    /// Remove every participant, returning them for track release.
    pub fn drain(&mut self) -> Vec<Participant> {
        std::mem::take(&mut self.participants)
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| &p.id == id)
    }
}

/// Read-only view of the registry at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    participants: Vec<Participant>,
}

impl RegistrySnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.participants.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegistrySnapshot {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}

impl FromIterator<Participant> for RegistrySnapshot {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self {
            participants: iter.into_iter().collect(),
        }
    }
}
