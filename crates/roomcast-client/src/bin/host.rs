//! roomcast-host: stream raw unsigned 8-bit mono PCM from stdin into a new
//! room, e.g. `arecord -f U8 -c 1 | roomcast-host`.

use std::path::PathBuf;

use clap::Parser;

use roomcast_client::{stream_source, HostSession, DEFAULT_FRAME_SAMPLES};
use roomcast_common::RoomCode;
use roomcast_config::RoomcastConfig;

#[derive(Parser)]
#[command(name = "roomcast-host", about = "Stream stdin audio into a roomcast room")]
struct Args {
    /// Relay URL.
    #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
    url: String,

    /// Reuse this room code instead of generating one.
    #[arg(short = 'C', long)]
    code: Option<String>,

    /// Samples per frame.
    #[arg(short, long, default_value_t = DEFAULT_FRAME_SAMPLES)]
    frame_samples: usize,

    /// Config file to load instead of the platform default.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> RoomcastConfig {
    let loaded = match &args.config {
        Some(path) => roomcast_config::load_from_path(path),
        None => roomcast_config::load_default(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("roomcast-host: {e}; using default config");
        RoomcastConfig::default()
    })
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    let default_filter = format!(
        "{},{}",
        config.logging.filter_for("roomcast_host"),
        config.logging.filter_for("roomcast_client")
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let host = match &args.code {
        Some(code) => match RoomCode::parse(code) {
            Ok(code) => HostSession::with_code(code),
            Err(e) => {
                tracing::error!(error = %e, "invalid room code");
                std::process::exit(2);
            }
        },
        None => HostSession::from_config(&config.rooms),
    };
    println!("room code: {}", host.share_code());

    tokio::select! {
        result = stream_source(&args.url, host, tokio::io::stdin(), args.frame_samples, &config.client) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "streaming failed");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, stopping");
        }
    }
}
