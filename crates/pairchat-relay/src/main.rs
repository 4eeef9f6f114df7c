//! pairchat-relay: random stranger chat relay.
//!
//! Pairs each WebSocket client with another waiting client, relays chat
//! text and typing indicators between partners, and forwards WebRTC
//! negotiation messages so partners can open a direct audio/video session.

use std::path::PathBuf;

use clap::Parser;
use pairchat_common::RelayError;
use pairchat_relay::RelayServer;

#[derive(Parser)]
#[command(name = "pairchat-relay", about = "Random stranger chat relay with WebRTC signaling")]
struct Args {
    /// Config file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind. Overrides the config file.
    #[arg(long)]
    bind: Option<String>,
}

/// Filter used while the config file is read, before `logging.filter` is known.
const BOOTSTRAP_FILTER: &str = "pairchat_config=info";

fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| BOOTSTRAP_FILTER.into()),
        )
        .finish()
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    let args = Args::parse();

    let mut config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        pairchat_config::load_config(args.config.as_deref())
    })?;
    if let Some(port) = args.port {
        config.server.port = port.into();
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .init();

    let server = RelayServer::bind(&config).await?;
    tracing::info!(addr = %server.local_addr()?, "Bound listener");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await;

    Ok(())
}
