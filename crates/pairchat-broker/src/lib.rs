//! Pairing broker for one-to-one stranger chat.
//!
//! The broker keeps every live participant in a [`Registry`], parks
//! unmatched participants in a [`WaitingPool`], and lets the
//! [`PairingEngine`] create and dissolve pairings. Chat text, typing
//! indicators and WebRTC negotiation payloads are forwarded only to the
//! sender's current partner.
//!
//! Nothing here touches the network. Inbound events arrive as typed
//! [`Command`]s, outbound events leave through each participant's
//! [`Outbox`]. [`BrokerService`] runs a [`Broker`] on a single tokio task so
//! every mutation is serialized.

pub mod command;
pub mod engine;
pub mod event;
pub mod pool;
pub mod registry;
pub mod relay;
pub mod service;
pub mod signaling;

#[cfg(test)]
mod testing;

pub use command::{Broker, BrokerStats, Command};
pub use engine::{MatchOutcome, PairingEngine};
pub use event::{Outbox, ServerEvent, SignalKind, SignalPayload};
pub use pool::WaitingPool;
pub use registry::{Participant, Registry};
pub use service::{BrokerHandle, BrokerService};
