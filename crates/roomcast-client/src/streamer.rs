//! Host side of a stream: claim a room and push raw unsigned 8-bit frames
//! from a byte source until it ends.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use roomcast_common::{unix_millis, ServerEvent};
use roomcast_config::ClientConfig;

use crate::connection::send_event;
use crate::errors::ClientError;
use crate::host::HostSession;

/// Samples per frame when the caller has no preference.
pub const DEFAULT_FRAME_SAMPLES: usize = 128;

/// Stream `source` into a fresh room on the relay at `url`. Returns the host
/// session once the source hits EOF and `stop-streaming` has been sent.
pub async fn stream_source<R>(
    url: &str,
    mut host: HostSession,
    mut source: R,
    frame_samples: usize,
    config: &ClientConfig,
) -> Result<HostSession, ClientError>
where
    R: AsyncRead + Unpin,
{
    let (ws, _) = tokio::time::timeout(config.connect_timeout(), tokio_tungstenite::connect_async(url))
        .await
        .map_err(|_| ClientError::Connect(format!("timed out after {:?}", config.connect_timeout())))?
        .map_err(|e| ClientError::Connect(e.to_string()))?;
    let (mut sink, mut stream) = ws.split();

    send_event(&mut sink, &host.create_event()).await?;
    host.start_streaming();
    info!(room = %host.share_code(), "room created, streaming");

    let mut buf = vec![0u8; frame_samples.max(1)];
    loop {
        tokio::select! {
            read = source.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    break;
                }
                if let Some(frame) = host.audio_frame(buf[..n].to_vec(), unix_millis()) {
                    send_event(&mut sink, &frame).await?;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_json(&text) {
                    Ok(event) => {
                        if let Some(count) = host.handle(&event) {
                            info!(listeners = count, "listener count changed");
                        }
                    }
                    Err(e) => debug!(error = %e, "unrecognized relay message"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ClientError::Connect("relay closed connection".into()));
                }
                Some(Err(e)) => return Err(e.into()),
                _ => {}
            },
        }
    }

    send_event(&mut sink, &host.stop_streaming()).await?;
    if let Err(e) = sink.close().await {
        warn!(error = %e, "close after stop failed");
    }
    info!(room = %host.share_code(), "source ended, streaming stopped");
    Ok(host)
}
