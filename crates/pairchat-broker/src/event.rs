//! Outbound events and the per-connection queue they travel through.

use std::fmt;

use pairchat_common::ParticipantId;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Sending half of a connection's outbound queue.
pub type Outbox = mpsc::Sender<ServerEvent>;

/// The three WebRTC negotiation message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "webrtc_offer",
            SignalKind::Answer => "webrtc_answer",
            SignalKind::Candidate => "webrtc_candidate",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque negotiation payload.
///
/// Holds the sender's JSON text untouched, so the partner receives exactly
/// the bytes that were sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalPayload(Box<RawValue>);

impl SignalPayload {
    /// Wrap a JSON document. Fails if `json` is not valid JSON.
    pub fn from_json(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for SignalPayload {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Everything the broker can tell a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Waiting,
    Matched { partner: String },
    PartnerLeft,
    Message { from: String, msg: String },
    Typing,
    StopTyping,
    WebrtcOffer { payload: SignalPayload },
    WebrtcAnswer { payload: SignalPayload },
    WebrtcCandidate { payload: SignalPayload },
}

impl ServerEvent {
    pub fn signal(kind: SignalKind, payload: SignalPayload) -> Self {
        match kind {
            SignalKind::Offer => ServerEvent::WebrtcOffer { payload },
            SignalKind::Answer => ServerEvent::WebrtcAnswer { payload },
            SignalKind::Candidate => ServerEvent::WebrtcCandidate { payload },
        }
    }

    /// Wire tag, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Waiting => "waiting",
            ServerEvent::Matched { .. } => "matched",
            ServerEvent::PartnerLeft => "partner_left",
            ServerEvent::Message { .. } => "message",
            ServerEvent::Typing => "typing",
            ServerEvent::StopTyping => "stop_typing",
            ServerEvent::WebrtcOffer { .. } => SignalKind::Offer.as_str(),
            ServerEvent::WebrtcAnswer { .. } => SignalKind::Answer.as_str(),
            ServerEvent::WebrtcCandidate { .. } => SignalKind::Candidate.as_str(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Hand an event to a connection without waiting.
///
/// Delivery is best-effort: a full or closed outbox drops the event so a
/// slow client can never stall the broker. Returns whether the event was
/// queued.
pub(crate) fn deliver(outbox: &Outbox, to: ParticipantId, event: ServerEvent) -> bool {
    match outbox.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            warn!(participant = %to.short(), event = event.kind(), "Outbox full, dropping event");
            false
        }
        Err(TrySendError::Closed(event)) => {
            debug!(participant = %to.short(), event = event.kind(), "Outbox closed, dropping event");
            false
        }
    }
}
