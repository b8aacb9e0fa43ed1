//! roomcast-relay: WebSocket server that fans host audio out to listeners.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

use roomcast_config::RoomcastConfig;
use roomcast_relay::{handle_connection, SessionManager};

#[derive(Parser)]
#[command(name = "roomcast-relay", about = "Room-based audio relay server")]
struct Args {
    /// Config file to load instead of the platform default.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides `relay.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(args: &Args) -> RoomcastConfig {
    let loaded = match &args.config {
        Some(path) => roomcast_config::load_from_path(path),
        None => roomcast_config::load_default(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("roomcast-relay: {e}; using default config");
        RoomcastConfig::default()
    });
    if let Some(port) = args.port {
        config.relay.port = port;
    }
    config
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter_for("roomcast_relay").into()),
        )
        .init();

    let sessions = SessionManager::from_config(&config);

    let addr = config.relay.listen_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind TCP listener");
            std::process::exit(1);
        }
    };

    tracing::info!("roomcast-relay listening on {}", addr);

    // Accept loop.
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let sessions = sessions.clone();
                    tokio::spawn(async move {
                        match accept_async(stream).await {
                            Ok(ws) => handle_connection(ws, peer, sessions).await,
                            Err(e) => {
                                tracing::warn!(%peer, error = %e, "WS handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(
                    rooms = sessions.room_count().await,
                    "interrupt received, shutting down"
                );
                break;
            }
        }
    }
}
