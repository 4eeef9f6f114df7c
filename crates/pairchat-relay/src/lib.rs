//! pairchat-relay: WebSocket front end for the pairing broker.
//!
//! Accepts WebSocket connections, names each one through an
//! [`IdentityProvider`], and turns JSON frames into broker commands. Events
//! the broker emits for a connection are written back as JSON frames. The
//! relay never inspects WebRTC negotiation payloads.

pub mod connection;
pub mod nickname;
pub mod policy;
pub mod protocol;
pub mod server;

pub use nickname::{IdentityProvider, NicknameProvider};
pub use policy::{ContentPolicy, StandardPolicy};
pub use protocol::ClientMessage;
pub use server::RelayServer;
