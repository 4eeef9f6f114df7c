//! Pairing engine: the only code that creates or dissolves pairings.
//!
//! Per-participant lifecycle:
//!
//! ```text
//! Connecting -> Waiting <-> Paired -> Waiting | Disconnected
//!                              \-> Idle (partner left) -> Waiting | Disconnected
//! ```
//!
//! A participant whose partner disconnects is left idle; it is not put back
//! in the pool until it asks for a new partner itself.

use pairchat_common::ParticipantId;
use tracing::{debug, info};

use crate::event::{Outbox, ServerEvent};
use crate::pool::WaitingPool;
use crate::registry::Registry;

/// Result of a match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Paired with the given participant.
    Matched(ParticipantId),
    /// No one else was waiting; the participant is now in the pool.
    Waiting,
}

#[derive(Debug, Default)]
pub struct PairingEngine {
    registry: Registry,
    pool: WaitingPool,
}

impl PairingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn pool(&self) -> &WaitingPool {
        &self.pool
    }

    /// Add a freshly connected participant to the registry without trying
    /// to match it yet.
    pub fn register(&mut self, id: ParticipantId, nickname: String, outbox: Outbox) -> bool {
        let added = self.registry.register(id, nickname, outbox);
        if !added {
            debug!(participant = %id.short(), "Duplicate register ignored");
        }
        added
    }

    /// First match attempt for a newly registered participant.
    ///
    /// Returns `None` for unknown ids.
    pub fn on_connect(&mut self, id: ParticipantId) -> Option<MatchOutcome> {
        let participant = self.registry.get(id)?;
        if let Some(partner) = participant.partner() {
            return Some(MatchOutcome::Matched(partner));
        }
        Some(self.try_match(id))
    }

    /// Leave the current partner (if any) and search again.
    ///
    /// The former partner is told `partner_left` and is not re-queued.
    pub fn request_new_partner(&mut self, id: ParticipantId) -> Option<MatchOutcome> {
        if !self.registry.contains(id) {
            debug!(participant = %id.short(), "Next from unknown participant ignored");
            return None;
        }
        if let Some(former) = self.dissolve(id) {
            info!(
                participant = %id.short(),
                former = %former.short(),
                "Participant requested a new partner"
            );
        }
        Some(self.try_match(id))
    }

    /// Tear down everything `id` holds and drop it from the registry.
    ///
    /// Returns false if `id` was already gone.
    pub fn on_disconnect(&mut self, id: ParticipantId) -> bool {
        if !self.registry.contains(id) {
            debug!(participant = %id.short(), "Disconnect for unknown participant ignored");
            return false;
        }

        if self.dissolve(id).is_none() && self.pool.remove(id) {
            debug!(participant = %id.short(), "Removed from waiting pool");
        }

        if let Some(p) = self.registry.unregister(id) {
            info!(participant = %id.short(), nickname = %p.nickname(), "Participant left");
        }
        true
    }

    /// Break `id`'s pairing and tell the other side. Returns the former
    /// partner.
    fn dissolve(&mut self, id: ParticipantId) -> Option<ParticipantId> {
        let former = self.registry.unlink(id)?;
        if let Some(p) = self.registry.get(former) {
            p.notify(ServerEvent::PartnerLeft);
        }
        Some(former)
    }

    /// Pair `id` with the longest-waiting other participant, or queue it.
    fn try_match(&mut self, id: ParticipantId) -> MatchOutcome {
        // `take_excluding` is the self-match guard: `id` may already be the
        // pool's only occupant.
        while let Some(candidate) = self.pool.take_excluding(id) {
            if !self.registry.link(id, candidate) {
                // Stale entry; the pool should never hold one, but a bad
                // entry must not block the queue.
                debug!(candidate = %candidate.short(), "Skipping unpairable pool entry");
                continue;
            }
            self.pool.remove(id);

            let (Some(me), Some(them)) = (self.registry.get(id), self.registry.get(candidate))
            else {
                continue;
            };
            me.notify(ServerEvent::Matched {
                partner: them.nickname().to_string(),
            });
            them.notify(ServerEvent::Matched {
                partner: me.nickname().to_string(),
            });
            info!(
                a = %id.short(),
                b = %candidate.short(),
                a_nick = %me.nickname(),
                b_nick = %them.nickname(),
                "Paired"
            );
            return MatchOutcome::Matched(candidate);
        }

        self.pool.offer(id);
        if let Some(me) = self.registry.get(id) {
            me.notify(ServerEvent::Waiting);
        }
        debug!(participant = %id.short(), waiting = self.pool.len(), "Waiting for partner");
        MatchOutcome::Waiting
    }
}
