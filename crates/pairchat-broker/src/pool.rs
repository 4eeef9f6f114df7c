//! Waiting pool: participants with no partner, oldest first.

use std::collections::VecDeque;

use pairchat_common::ParticipantId;

/// FIFO of unmatched participants.
///
/// Every call takes `&mut self`, and the engine owns the only instance, so
/// a take-then-assign sequence can never interleave with another one.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queue: VecDeque<ParticipantId>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `id`. Returns false if it was already waiting.
    pub fn offer(&mut self, id: ParticipantId) -> bool {
        if self.queue.contains(&id) {
            return false;
        }
        self.queue.push_back(id);
        true
    }

    /// Remove and return the longest-waiting participant.
    pub fn take(&mut self) -> Option<ParticipantId> {
        self.queue.pop_front()
    }

    /// Like [`take`](Self::take), but never hands back `exclude`. An
    /// `exclude` entry stays queued in its place.
    pub fn take_excluding(&mut self, exclude: ParticipantId) -> Option<ParticipantId> {
        let pos = self.queue.iter().position(|id| *id != exclude)?;
        self.queue.remove(pos)
    }

    /// Drop `id` from the pool if present.
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        match self.queue.iter().position(|queued| *queued == id) {
            Some(pos) => {
                self.queue.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.queue.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.queue.iter()
    }
}
