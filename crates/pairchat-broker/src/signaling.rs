//! Signaling relay for WebRTC negotiation.
//!
//! Payloads are never parsed or stored. Whoever is the sender's partner at
//! forward time receives them; nothing is queued across a re-pairing.

use pairchat_common::ParticipantId;
use tracing::debug;

use crate::event::{ServerEvent, SignalKind, SignalPayload};
use crate::registry::Registry;
use crate::relay::pair_of;

pub fn forward_signal(
    registry: &Registry,
    from: ParticipantId,
    kind: SignalKind,
    payload: SignalPayload,
) -> bool {
    let Some((_, partner)) = pair_of(registry, from) else {
        debug!(participant = %from.short(), kind = %kind, "Dropping signal: no partner");
        return false;
    };
    partner.notify(ServerEvent::signal(kind, payload))
}
