//! Message and presence relay: chat text and typing indicators go to the
//! sender's current partner and nowhere else.

use pairchat_common::ParticipantId;
use tracing::debug;

use crate::event::ServerEvent;
use crate::registry::{Participant, Registry};

/// Sender and partner, if `from` is live and currently paired.
pub(crate) fn pair_of(registry: &Registry, from: ParticipantId) -> Option<(&Participant, &Participant)> {
    let sender = registry.get(from)?;
    let partner = registry.get(sender.partner()?)?;
    Some((sender, partner))
}

/// Forward `text` to `from`'s partner, tagged with the sender's nickname.
///
/// Dropped without error when there is no partner. Returns whether the
/// event was queued for the partner.
pub fn send_text(registry: &Registry, from: ParticipantId, text: String) -> bool {
    let Some((sender, partner)) = pair_of(registry, from) else {
        debug!(participant = %from.short(), "Dropping message: no partner");
        return false;
    };
    partner.notify(ServerEvent::Message {
        from: sender.nickname().to_string(),
        msg: text,
    })
}

/// Forward a typing start/stop indicator to `from`'s partner.
pub fn set_typing(registry: &Registry, from: ParticipantId, is_typing: bool) -> bool {
    let Some((_, partner)) = pair_of(registry, from) else {
        return false;
    };
    partner.notify(if is_typing {
        ServerEvent::Typing
    } else {
        ServerEvent::StopTyping
    })
}
