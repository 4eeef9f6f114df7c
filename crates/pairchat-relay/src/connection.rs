//! Per-connection handler: identify, register, then pump frames both ways.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pairchat_broker::{BrokerHandle, Command, ServerEvent};
use pairchat_common::ParticipantId;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::nickname::IdentityProvider;
use crate::policy::ContentPolicy;
use crate::protocol::{encode, ClientMessage};

/// Everything a connection task needs, shared by all of them.
pub struct ConnectionContext {
    pub broker: BrokerHandle,
    pub identity: Arc<dyn IdentityProvider>,
    pub policy: Arc<dyn ContentPolicy>,
    pub outbox_capacity: usize,
    pub handshake_timeout: Duration,
}

impl ConnectionContext {
    /// Turn a parsed client frame into a broker command. Chat text that the
    /// content policy rejects yields `None`.
    pub fn to_command(&self, message: ClientMessage) -> Option<Command> {
        match message {
            ClientMessage::Message(text) => self.policy.apply(text).map(Command::Text),
            ClientMessage::Typing => Some(Command::Typing(true)),
            ClientMessage::StopTyping => Some(Command::Typing(false)),
            ClientMessage::Next => Some(Command::NextPartner),
            ClientMessage::Signal(kind, payload) => Some(Command::Signal(kind, payload)),
        }
    }
}

/// Handle a single TCP connection from upgrade to cleanup.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, ctx: Arc<ConnectionContext>) {
    // 1. Upgrade, naming the participant from the request's query string.
    let mut nickname = None;
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        match ctx.identity.identify(request.uri().query()) {
            Ok(name) => {
                nickname = Some(name);
                Ok(response)
            }
            Err(e) => {
                warn!(peer = %addr, error = %e, "Rejecting connection");
                let mut rejection = ErrorResponse::new(Some(e.to_string()));
                *rejection.status_mut() = StatusCode::BAD_REQUEST;
                Err(rejection)
            }
        }
    };

    let ws = match tokio::time::timeout(ctx.handshake_timeout, accept_hdr_async(stream, callback))
        .await
    {
        Ok(Ok(ws)) => ws,
        Ok(Err(e)) => {
            warn!(peer = %addr, error = %e, "WS handshake failed");
            return;
        }
        Err(_) => {
            warn!(peer = %addr, timeout = ?ctx.handshake_timeout, "WS handshake timeout");
            return;
        }
    };
    let Some(nickname) = nickname else {
        return;
    };

    // 2. Register with the broker.
    let id = ParticipantId::new();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(ctx.outbox_capacity);
    if ctx.broker.connect(id, nickname.clone(), tx).await.is_err() {
        warn!(peer = %addr, "Broker unavailable, dropping connection");
        return;
    }

    info!(
        peer = %addr,
        participant = %id.short(),
        nickname = %nickname,
        "Client connected"
    );

    let (mut sink, mut stream) = ws.split();

    // 3. Forwarding loop.
    loop {
        tokio::select! {
            // Broker events for this client -> its WebSocket
            Some(event) = rx.recv() => {
                let json = match encode(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(participant = %id.short(), error = %e, "Dropping unencodable event");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            // Frames from this client -> broker commands
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let message = match ClientMessage::parse(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                debug!(participant = %id.short(), error = %e, "Ignoring frame");
                                continue;
                            }
                        };
                        let Some(command) = ctx.to_command(message) else {
                            debug!(participant = %id.short(), "Message dropped by content policy");
                            continue;
                        };
                        if ctx.broker.send(id, command).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 4. Cleanup. The broker tells the partner, if any.
    info!(
        peer = %addr,
        participant = %id.short(),
        nickname = %nickname,
        "Client disconnected"
    );
    let _ = ctx.broker.disconnect(id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nickname::NicknameProvider;
    use crate::policy::StandardPolicy;
    use pairchat_broker::{BrokerService, SignalKind, SignalPayload};
    use pairchat_config::PairchatConfig;

    fn context() -> ConnectionContext {
        let config = PairchatConfig::default();
        let (broker, _task) = BrokerService::spawn(&config.broker);
        ConnectionContext {
            broker,
            identity: Arc::new(NicknameProvider::from_config(&config.nickname).unwrap()),
            policy: Arc::new(StandardPolicy::from_config(&config.policy).unwrap()),
            outbox_capacity: 8,
            handshake_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn presence_messages_map_to_typing_commands() {
        let ctx = context();
        assert!(matches!(
            ctx.to_command(ClientMessage::Typing),
            Some(Command::Typing(true))
        ));
        assert!(matches!(
            ctx.to_command(ClientMessage::StopTyping),
            Some(Command::Typing(false))
        ));
        assert!(matches!(
            ctx.to_command(ClientMessage::Next),
            Some(Command::NextPartner)
        ));
    }

    #[tokio::test]
    async fn chat_text_goes_through_policy() {
        let ctx = context();
        assert!(ctx.to_command(ClientMessage::Message("  ".into())).is_none());
        match ctx.to_command(ClientMessage::Message("hey".into())) {
            Some(Command::Text(text)) => assert_eq!(text, "hey"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn signals_pass_through_untouched() {
        let ctx = context();
        let payload = SignalPayload::from_json(r#"{"sdp":"x"}"#).unwrap();
        match ctx.to_command(ClientMessage::Signal(SignalKind::Offer, payload.clone())) {
            Some(Command::Signal(SignalKind::Offer, p)) => assert_eq!(p, payload),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
