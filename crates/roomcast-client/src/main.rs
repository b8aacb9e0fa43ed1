//! roomcast-listen: join a room and log what the playback scheduler does.

use std::path::PathBuf;

use clap::Parser;

use roomcast_client::{ListenOptions, ListenerClient, ListenerEvent, ListenerSession, ListenerUpdate};
use roomcast_config::RoomcastConfig;

#[derive(Parser)]
#[command(name = "roomcast-listen", about = "Listen to a roomcast room")]
struct Args {
    /// Relay URL.
    #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
    url: String,

    /// Room code, with or without hyphens.
    #[arg(short = 'C', long)]
    code: String,

    /// Output volume, 0-100. Overrides `playback.volume`.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Config file to load instead of the platform default.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> RoomcastConfig {
    let loaded = match &args.config {
        Some(path) => roomcast_config::load_from_path(path),
        None => roomcast_config::load_default(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("roomcast-listen: {e}; using default config");
        RoomcastConfig::default()
    });
    if let Some(volume) = args.volume {
        config.playback.volume = volume;
    }
    config
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    let default_filter = format!(
        "{},{}",
        config.logging.filter_for("roomcast_listen"),
        config.logging.filter_for("roomcast_client")
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let session = ListenerSession::from_config(&config.playback);
    let options = ListenOptions::from_config(args.url, args.code, &config.client);
    let (client, mut events) = match ListenerClient::connect(options, session) {
        Ok(connected) => connected,
        Err(e) => {
            tracing::error!(error = %e, "cannot start listener");
            std::process::exit(2);
        }
    };

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ListenerEvent::Connected) => tracing::info!("connected to relay"),
                Some(ListenerEvent::Disconnected) => tracing::warn!("disconnected from relay"),
                Some(ListenerEvent::Update(update)) => log_update(update),
                Some(ListenerEvent::Error(e)) => {
                    tracing::error!(error = %e, "listener stopped");
                    std::process::exit(1);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, leaving room");
                client.shutdown().await;
                break;
            }
        }
    }
}

fn log_update(update: ListenerUpdate) {
    match update {
        ListenerUpdate::Joined => tracing::info!("joined room, receiving"),
        ListenerUpdate::RoomNotFound => {
            tracing::error!("room not found, check the code and try again")
        }
        ListenerUpdate::Play(frame) => {
            let peak = frame.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            tracing::debug!(
                start_at = frame.start_at,
                timestamp = frame.timestamp,
                samples = frame.samples.len(),
                peak,
                "frame scheduled"
            );
        }
        ListenerUpdate::HostStopped => tracing::info!("host stopped streaming"),
        ListenerUpdate::Synced(sync) => tracing::info!(
            latency_ms = sync.latency,
            buffer_ms = sync.buffer_time,
            "time sync"
        ),
        ListenerUpdate::Ignored => {}
    }
}
