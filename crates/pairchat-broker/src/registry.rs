//! Connection registry: the live set of participants.
//!
//! Pure bookkeeping. Partner references live here as plain ids, but only
//! the pairing engine (via the crate-private `link`/`unlink`) changes them.

use std::collections::HashMap;

use pairchat_common::ParticipantId;

use crate::event::{deliver, Outbox, ServerEvent};

/// One live connection as the broker sees it.
#[derive(Debug)]
pub struct Participant {
    id: ParticipantId,
    nickname: String,
    partner: Option<ParticipantId>,
    outbox: Outbox,
}

impl Participant {
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn partner(&self) -> Option<ParticipantId> {
        self.partner
    }

    pub fn is_paired(&self) -> bool {
        self.partner.is_some()
    }

    pub(crate) fn notify(&self, event: ServerEvent) -> bool {
        deliver(&self.outbox, self.id, event)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ParticipantId, Participant>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant. Returns false (and changes nothing) if `id` is
    /// already live.
    pub fn register(&mut self, id: ParticipantId, nickname: String, outbox: Outbox) -> bool {
        if self.participants.contains_key(&id) {
            return false;
        }
        self.participants.insert(
            id,
            Participant {
                id,
                nickname,
                partner: None,
                outbox,
            },
        );
        true
    }

    /// Remove a participant. Unknown ids are a no-op so duplicate
    /// disconnect signals are harmless.
    pub fn unregister(&mut self, id: ParticipantId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn partner_of(&self, id: ParticipantId) -> Option<ParticipantId> {
        self.participants.get(&id).and_then(|p| p.partner)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Set both partner references in one step.
    ///
    /// Refuses self-links, unknown ids, and ids that are already paired.
    pub(crate) fn link(&mut self, a: ParticipantId, b: ParticipantId) -> bool {
        if a == b {
            return false;
        }
        let free = |id: ParticipantId| matches!(self.participants.get(&id), Some(p) if p.partner.is_none());
        if !free(a) || !free(b) {
            return false;
        }
        if let Some(p) = self.participants.get_mut(&a) {
            p.partner = Some(b);
        }
        if let Some(p) = self.participants.get_mut(&b) {
            p.partner = Some(a);
        }
        true
    }

    /// Clear `id`'s partner reference and the back-reference in one step.
    /// Returns the former partner.
    pub(crate) fn unlink(&mut self, id: ParticipantId) -> Option<ParticipantId> {
        let partner = self.participants.get_mut(&id)?.partner.take()?;
        if let Some(p) = self.participants.get_mut(&partner) {
            if p.partner == Some(id) {
                p.partner = None;
            }
        }
        Some(partner)
    }
}
