//! Broker task: one tokio task owns the [`Broker`] and applies commands in
//! arrival order, so pairing changes never interleave.

use std::time::Duration;

use pairchat_common::{ParticipantId, RelayError};
use pairchat_config::BrokerConfig;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tracing::{debug, info};

use crate::command::{Broker, BrokerStats, Command};
use crate::event::Outbox;

enum Request {
    Command {
        from: ParticipantId,
        command: Command,
    },
    Stats(oneshot::Sender<BrokerStats>),
}

/// Cloneable sender side of the broker task.
#[derive(Clone)]
pub struct BrokerHandle {
    tx: mpsc::Sender<Request>,
}

impl BrokerHandle {
    /// Queue a command. Fails only once the broker task has stopped.
    pub async fn send(&self, from: ParticipantId, command: Command) -> Result<(), RelayError> {
        self.tx
            .send(Request::Command { from, command })
            .await
            .map_err(|_| RelayError::BrokerClosed)
    }

    pub async fn connect(
        &self,
        id: ParticipantId,
        nickname: String,
        outbox: Outbox,
    ) -> Result<(), RelayError> {
        self.send(id, Command::Connect { nickname, outbox }).await
    }

    pub async fn disconnect(&self, id: ParticipantId) -> Result<(), RelayError> {
        self.send(id, Command::Disconnect).await
    }

    /// Counts as of every command queued before this call.
    pub async fn stats(&self) -> Result<BrokerStats, RelayError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Stats(reply_tx))
            .await
            .map_err(|_| RelayError::BrokerClosed)?;
        reply_rx.await.map_err(|_| RelayError::BrokerClosed)
    }
}

pub struct BrokerService;

impl BrokerService {
    /// Start the broker task. It runs until every [`BrokerHandle`] is dropped.
    pub fn spawn(config: &BrokerConfig) -> (BrokerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.command_capacity.max(1) as usize);
        let stats_every = match config.stats_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs.into())),
        };
        let task = tokio::spawn(run(Broker::new(), rx, stats_every));
        (BrokerHandle { tx }, task)
    }
}

async fn run(mut broker: Broker, mut rx: mpsc::Receiver<Request>, stats_every: Option<Duration>) {
    let mut ticker = stats_every.map(tokio::time::interval);

    loop {
        tokio::select! {
            request = rx.recv() => match request {
                Some(Request::Command { from, command }) => broker.dispatch(from, command),
                Some(Request::Stats(reply)) => {
                    let _ = reply.send(broker.stats());
                }
                None => break,
            },
            _ = tick(&mut ticker) => {
                let stats = broker.stats();
                debug!(
                    participants = stats.participants,
                    waiting = stats.waiting,
                    pairs = stats.pairs,
                    "Broker tick"
                );
            }
        }
    }

    info!("Broker stopped");
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
