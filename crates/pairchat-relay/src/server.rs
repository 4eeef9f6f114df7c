//! Listener and accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pairchat_broker::{BrokerHandle, BrokerService};
use pairchat_common::RelayError;
use pairchat_config::PairchatConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::connection::{handle_connection, ConnectionContext};
use crate::nickname::NicknameProvider;
use crate::policy::StandardPolicy;

pub struct RelayServer {
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    broker_task: JoinHandle<()>,
}

impl RelayServer {
    /// Bind the configured address and start the broker task.
    pub async fn bind(config: &PairchatConfig) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(config.server.listen_addr()).await?;
        Self::from_listener(listener, config)
    }

    /// Serve on an already-bound listener.
    pub fn from_listener(listener: TcpListener, config: &PairchatConfig) -> Result<Self, RelayError> {
        let identity = NicknameProvider::from_config(&config.nickname)?;
        let policy = StandardPolicy::from_config(&config.policy)?;
        let (broker, broker_task) = BrokerService::spawn(&config.broker);

        let ctx = ConnectionContext {
            broker,
            identity: Arc::new(identity),
            policy: Arc::new(policy),
            outbox_capacity: config.broker.outbox_capacity.max(1) as usize,
            handshake_timeout: Duration::from_secs(config.server.handshake_timeout_secs.into()),
        };

        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
            broker_task,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn broker(&self) -> BrokerHandle {
        self.ctx.broker.clone()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        let addr = self.listener.local_addr().ok();
        tracing::info!(addr = ?addr, "pairchat-relay listening");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down listener");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            handle_connection(stream, addr, ctx).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "TCP accept error");
                    }
                }
            }
        }

        if self.broker_task.is_finished() {
            tracing::warn!("Broker task exited before the listener");
        }
    }
}
