//! Typed inbound commands and the dispatcher that routes them.

use pairchat_common::ParticipantId;
use tracing::debug;

use crate::engine::PairingEngine;
use crate::event::{Outbox, SignalKind, SignalPayload};
use crate::{relay, signaling};

/// One inbound event from a connection.
#[derive(Debug)]
pub enum Command {
    /// Connection established; `nickname` comes from the identity provider.
    Connect { nickname: String, outbox: Outbox },
    /// Chat text, already passed through the content policy.
    Text(String),
    Typing(bool),
    /// Drop the current partner and look for another.
    NextPartner,
    Signal(SignalKind, SignalPayload),
    Disconnect,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Connect { .. } => "connect",
            Command::Text(_) => "message",
            Command::Typing(true) => "typing",
            Command::Typing(false) => "stop_typing",
            Command::NextPartner => "next",
            Command::Signal(kind, _) => kind.as_str(),
            Command::Disconnect => "disconnect",
        }
    }
}

/// Point-in-time counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    pub participants: usize,
    pub waiting: usize,
    pub pairs: usize,
}

/// The pairing engine plus the relays, behind a single dispatch entry.
#[derive(Debug, Default)]
pub struct Broker {
    engine: PairingEngine,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &PairingEngine {
        &self.engine
    }

    /// Apply one command from `from`. Never blocks and never fails: events
    /// that have nowhere to go are dropped.
    pub fn dispatch(&mut self, from: ParticipantId, command: Command) {
        debug!(participant = %from.short(), command = command.name(), "Dispatch");

        match command {
            Command::Connect { nickname, outbox } => {
                if self.engine.register(from, nickname, outbox) {
                    self.engine.on_connect(from);
                }
            }
            Command::Text(text) => {
                relay::send_text(self.engine.registry(), from, text);
            }
            Command::Typing(is_typing) => {
                relay::set_typing(self.engine.registry(), from, is_typing);
            }
            Command::NextPartner => {
                self.engine.request_new_partner(from);
            }
            Command::Signal(kind, payload) => {
                signaling::forward_signal(self.engine.registry(), from, kind, payload);
            }
            Command::Disconnect => {
                self.engine.on_disconnect(from);
            }
        }

        debug_assert!(
            self.check_invariants().is_ok(),
            "broker invariant violated: {:?}",
            self.check_invariants()
        );
    }

    pub fn stats(&self) -> BrokerStats {
        let registry = self.engine.registry();
        BrokerStats {
            participants: registry.len(),
            waiting: self.engine.pool().len(),
            pairs: registry.iter().filter(|p| p.is_paired()).count() / 2,
        }
    }

    /// Verify the pairing invariants over the whole state.
    ///
    /// Partner links must be symmetric, never point at self or at a gone
    /// participant, and no waiting participant may hold a partner.
    pub fn check_invariants(&self) -> Result<(), String> {
        let registry = self.engine.registry();
        let pool = self.engine.pool();

        for p in registry.iter() {
            let Some(partner) = p.partner() else {
                continue;
            };
            if partner == p.id() {
                return Err(format!("{} is paired with itself", p.id()));
            }
            match registry.get(partner) {
                None => return Err(format!("{} is paired with gone {}", p.id(), partner)),
                Some(other) if other.partner() != Some(p.id()) => {
                    return Err(format!("{} -> {} is not symmetric", p.id(), partner));
                }
                Some(_) => {}
            }
            if pool.contains(p.id()) {
                return Err(format!("{} is paired and waiting", p.id()));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for id in pool.iter() {
            if !registry.contains(*id) {
                return Err(format!("{id} is waiting but not registered"));
            }
            if !seen.insert(*id) {
                return Err(format!("{id} is queued twice"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ServerEvent;
    use crate::testing::{matched, Client};

    fn connect(broker: &mut Broker, client: &Client) {
        broker.dispatch(
            client.id,
            Command::Connect {
                nickname: client.nickname.clone(),
                outbox: client.outbox.clone(),
            },
        );
    }

    fn paired_broker() -> (Broker, Client, Client) {
        let mut broker = Broker::new();
        let mut a = Client::new("alice");
        let mut b = Client::new("bob");
        connect(&mut broker, &a);
        connect(&mut broker, &b);
        a.drain();
        b.drain();
        (broker, a, b)
    }

    #[test]
    fn scenario_waiting_then_matched() {
        let mut broker = Broker::new();
        let mut a = Client::new("alice");
        let mut b = Client::new("bob");

        connect(&mut broker, &a);
        assert_eq!(a.drain(), vec![ServerEvent::Waiting]);

        connect(&mut broker, &b);
        assert_eq!(a.drain(), vec![matched(&b)]);
        assert_eq!(b.drain(), vec![matched(&a)]);
        assert_eq!(
            broker.stats(),
            BrokerStats {
                participants: 2,
                waiting: 0,
                pairs: 1
            }
        );
    }

    #[test]
    fn scenario_message_is_not_echoed() {
        let (mut broker, mut a, mut b) = paired_broker();
        broker.dispatch(a.id, Command::Text("hi".into()));
        assert_eq!(
            b.drain(),
            vec![ServerEvent::Message {
                from: "alice".into(),
                msg: "hi".into()
            }]
        );
        assert!(a.drain().is_empty());
    }

    #[test]
    fn scenario_next_without_third_party() {
        let (mut broker, mut a, mut b) = paired_broker();
        broker.dispatch(a.id, Command::NextPartner);
        assert_eq!(b.drain(), vec![ServerEvent::PartnerLeft]);
        assert_eq!(a.drain(), vec![ServerEvent::Waiting]);
        assert_eq!(broker.engine().registry().partner_of(a.id), None);
        assert_eq!(broker.engine().registry().partner_of(b.id), None);
    }

    #[test]
    fn scenario_disconnect_while_paired() {
        let (mut broker, a, mut b) = paired_broker();
        broker.dispatch(a.id, Command::Disconnect);
        assert_eq!(b.drain(), vec![ServerEvent::PartnerLeft]);
        assert_eq!(broker.engine().registry().partner_of(b.id), None);
        assert!(!broker.engine().pool().contains(b.id));
        assert!(broker.engine().registry().get(a.id).is_none());
    }

    #[test]
    fn scenario_disconnect_while_waiting() {
        let mut broker = Broker::new();
        let mut a = Client::new("alice");
        connect(&mut broker, &a);
        a.drain();
        broker.dispatch(a.id, Command::Disconnect);
        assert_eq!(broker.stats(), BrokerStats::default());
        assert!(a.drain().is_empty());
    }

    #[test]
    fn scenario_offer_is_forwarded_unchanged() {
        let (mut broker, a, mut b) = paired_broker();
        let raw = r#"{"sdp":"v=0\r\no=- 46117317 2 IN IP4 127.0.0.1","type":"offer"}"#;
        let payload = SignalPayload::from_json(raw).unwrap();
        broker.dispatch(a.id, Command::Signal(SignalKind::Offer, payload));
        match b.drain().as_slice() {
            [ServerEvent::WebrtcOffer { payload }] => assert_eq!(payload.as_str(), raw),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn typing_commands_map_to_events() {
        let (mut broker, a, mut b) = paired_broker();
        broker.dispatch(a.id, Command::Typing(true));
        broker.dispatch(a.id, Command::Typing(false));
        assert_eq!(b.drain(), vec![ServerEvent::Typing, ServerEvent::StopTyping]);
    }

    #[test]
    fn commands_from_unknown_participants_are_ignored() {
        let (mut broker, mut a, mut b) = paired_broker();
        let ghost = ParticipantId::new();
        broker.dispatch(ghost, Command::Text("boo".into()));
        broker.dispatch(ghost, Command::NextPartner);
        broker.dispatch(ghost, Command::Disconnect);
        assert!(a.drain().is_empty());
        assert!(b.drain().is_empty());
        assert_eq!(broker.stats().participants, 2);
    }

    #[test]
    fn duplicate_connect_does_not_rematch() {
        let (mut broker, mut a, mut b) = paired_broker();
        connect(&mut broker, &a);
        assert!(a.drain().is_empty());
        assert!(b.drain().is_empty());
        assert_eq!(broker.stats().pairs, 1);
    }

    #[test]
    fn invariants_hold_through_churn() {
        let mut broker = Broker::new();
        let mut clients: Vec<Client> = (0..8).map(|i| Client::new(&format!("u{i}"))).collect();

        for c in &clients {
            connect(&mut broker, c);
            broker.check_invariants().unwrap();
        }
        for (step, c) in clients.iter().enumerate() {
            let command = match step % 3 {
                0 => Command::NextPartner,
                1 => Command::Text("x".into()),
                _ => Command::Typing(true),
            };
            broker.dispatch(c.id, command);
            broker.check_invariants().unwrap();
        }
        for c in clients.iter().step_by(2) {
            broker.dispatch(c.id, Command::Disconnect);
            broker.check_invariants().unwrap();
        }
        for c in clients.iter().skip(1).step_by(2) {
            broker.dispatch(c.id, Command::NextPartner);
            broker.check_invariants().unwrap();
        }

        let stats = broker.stats();
        assert_eq!(stats.participants, 4);
        assert_eq!(stats.pairs, 2);
        assert_eq!(stats.waiting, 0);
        for c in &mut clients {
            c.drain();
        }
    }

    #[test]
    fn command_names_match_wire_tags() {
        assert_eq!(Command::Typing(true).name(), "typing");
        assert_eq!(Command::Typing(false).name(), "stop_typing");
        assert_eq!(Command::NextPartner.name(), "next");
        let p = SignalPayload::from_json("{}").unwrap();
        assert_eq!(Command::Signal(SignalKind::Candidate, p).name(), "webrtc_candidate");
    }
}
