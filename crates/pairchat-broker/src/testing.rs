//! Helpers shared by the broker's unit tests.

use pairchat_common::ParticipantId;
use tokio::sync::mpsc;

use crate::event::{Outbox, ServerEvent};

/// A fake connection: an id plus the receiving end of its outbox.
pub(crate) struct Client {
    pub id: ParticipantId,
    pub nickname: String,
    pub outbox: Outbox,
    rx: mpsc::Receiver<ServerEvent>,
}

impl Client {
    pub fn new(nickname: &str) -> Self {
        let (outbox, rx) = mpsc::channel(64);
        Self {
            id: ParticipantId::new(),
            nickname: nickname.to_string(),
            outbox,
            rx,
        }
    }

    /// Everything delivered so far, oldest first.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub(crate) fn matched(partner: &Client) -> ServerEvent {
    ServerEvent::Matched {
        partner: partner.nickname.clone(),
    }
}
