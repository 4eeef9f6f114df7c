//! Client wire protocol: JSON text frames tagged by `"type"`.
//!
//! Server-to-client frames are [`ServerEvent`]s serialized as-is. Signaling
//! payloads stay raw JSON end to end.

use pairchat_broker::{ServerEvent, SignalKind, SignalPayload};
use pairchat_common::RelayError;
use serde::{Deserialize, Deserializer};

/// Flat shape every client frame is read into before it is classified.
///
/// A plain struct rather than a tagged enum: tagged enums buffer their
/// fields first, and a raw JSON `payload` cannot be read back from that
/// buffer.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, alias = "msg")]
    text: Option<String>,
    /// `None` only when the key is absent. An explicit `null` is a payload.
    #[serde(default, deserialize_with = "present")]
    payload: Option<SignalPayload>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<SignalPayload>, D::Error>
where
    D: Deserializer<'de>,
{
    SignalPayload::deserialize(deserializer).map(Some)
}

/// A parsed client frame.
#[derive(Debug, PartialEq)]
pub enum ClientMessage {
    Message(String),
    Typing,
    StopTyping,
    Next,
    Signal(SignalKind, SignalPayload),
}

impl ClientMessage {
    pub fn parse(frame: &str) -> Result<Self, RelayError> {
        let envelope: Envelope = serde_json::from_str(frame)
            .map_err(|e| RelayError::Protocol(format!("malformed frame: {e}")))?;

        let signal = |kind: SignalKind| {
            envelope
                .payload
                .clone()
                .map(|payload| ClientMessage::Signal(kind, payload))
                .ok_or_else(|| RelayError::Protocol(format!("{kind} without payload")))
        };

        match envelope.kind.as_str() {
            "message" => envelope
                .text
                .clone()
                .map(ClientMessage::Message)
                .ok_or_else(|| RelayError::Protocol("message without text".into())),
            "typing" => Ok(ClientMessage::Typing),
            "stop_typing" => Ok(ClientMessage::StopTyping),
            "next" | "request_new_partner" => Ok(ClientMessage::Next),
            "webrtc_offer" => signal(SignalKind::Offer),
            "webrtc_answer" => signal(SignalKind::Answer),
            "webrtc_candidate" => signal(SignalKind::Candidate),
            other => Err(RelayError::Protocol(format!("unknown message type {other:?}"))),
        }
    }
}

/// Serialize an outbound event as a text frame body.
pub fn encode(event: &ServerEvent) -> Result<String, RelayError> {
    event
        .to_json()
        .map_err(|e| RelayError::Protocol(format!("failed to encode {}: {e}", event.kind())))
}
