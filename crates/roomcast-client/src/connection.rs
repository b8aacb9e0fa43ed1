//! Listener WebSocket client with reconnect.

use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, warn};

use roomcast_common::{unix_millis, ClientEvent, ServerEvent};
use roomcast_config::ClientConfig;

use crate::errors::ClientError;
use crate::listener::{ListenerSession, ListenerUpdate};
use crate::samples::Volume;
use crate::scheduler::MonotonicClock;

#[derive(Debug, Clone)]
pub struct ListenOptions {
    /// Relay URL, e.g. `ws://127.0.0.1:3000`.
    pub url: String,
    /// Room code as typed by the user.
    pub room_code: String,
    /// Start receiving as soon as the room is joined.
    pub auto_receive: bool,
    pub connect_timeout: Duration,
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
}

impl ListenOptions {
    pub fn new(url: impl Into<String>, room_code: impl Into<String>) -> Self {
        Self::from_config(url, room_code, &ClientConfig::default())
    }

    pub fn from_config(
        url: impl Into<String>,
        room_code: impl Into<String>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            url: url.into(),
            room_code: room_code.into(),
            auto_receive: true,
            connect_timeout: config.connect_timeout(),
            reconnect_attempts: config.reconnect_attempts,
            reconnect_delay: config.reconnect_delay(),
            max_reconnect_delay: config.max_reconnect_delay(),
        }
    }
}

/// Events published by the background connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    Connected,
    Update(ListenerUpdate),
    Disconnected,
    /// The task gave up; no further events follow.
    Error(String),
}

#[derive(Debug)]
enum ListenerCommand {
    StartReceiving,
    StopReceiving,
    SetVolume(Volume),
    Shutdown,
}

/// Handle to a running listener connection.
pub struct ListenerClient {
    command_tx: mpsc::Sender<ListenerCommand>,
}

impl ListenerClient {
    /// Validate the room code and start the background connection.
    pub fn connect(
        options: ListenOptions,
        mut session: ListenerSession,
    ) -> Result<(Self, mpsc::Receiver<ListenerEvent>), ClientError> {
        session.join(&options.room_code)?;

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(16);
        tokio::spawn(listener_loop(options, session, event_tx, command_rx));

        Ok((Self { command_tx }, event_rx))
    }

    pub async fn start_receiving(&self) {
        let _ = self.command_tx.send(ListenerCommand::StartReceiving).await;
    }

    pub async fn stop_receiving(&self) {
        let _ = self.command_tx.send(ListenerCommand::StopReceiving).await;
    }

    pub async fn set_volume(&self, volume: Volume) {
        let _ = self.command_tx.send(ListenerCommand::SetVolume(volume)).await;
    }

    /// Close the socket and stop the background task.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(ListenerCommand::Shutdown).await;
    }
}

enum Applied {
    Send(ClientEvent),
    Nothing,
    Shutdown,
}

fn apply_command(session: &mut ListenerSession, command: Option<ListenerCommand>) -> Applied {
    match command {
        Some(ListenerCommand::StartReceiving) => {
            match session.start_receiving(Box::new(MonotonicClock::start()), unix_millis()) {
                Some(probe) => Applied::Send(probe),
                None => Applied::Nothing,
            }
        }
        Some(ListenerCommand::StopReceiving) => {
            session.stop_receiving();
            Applied::Nothing
        }
        Some(ListenerCommand::SetVolume(volume)) => {
            session.set_volume(volume);
            Applied::Nothing
        }
        Some(ListenerCommand::Shutdown) | None => Applied::Shutdown,
    }
}

pub(crate) async fn send_event<S>(sink: &mut S, event: &ClientEvent) -> Result<(), ClientError>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    let text = event.to_json()?;
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}

enum Exit {
    Dropped,
    Shutdown,
}

async fn listener_loop(
    options: ListenOptions,
    mut session: ListenerSession,
    event_tx: mpsc::Sender<ListenerEvent>,
    mut command_rx: mpsc::Receiver<ListenerCommand>,
) {
    let mut failures = 0u32;
    let mut delay = options.reconnect_delay;

    loop {
        info!(url = %options.url, "connecting to relay");

        match tokio::time::timeout(
            options.connect_timeout,
            tokio_tungstenite::connect_async(options.url.as_str()),
        )
        .await
        {
            Ok(Ok((ws, _))) => {
                failures = 0;
                delay = options.reconnect_delay;
                let _ = event_tx.send(ListenerEvent::Connected).await;

                let (mut sink, mut stream) = ws.split();
                if let Some(join) = session.rejoin() {
                    if let Err(e) = send_event(&mut sink, &join).await {
                        warn!(error = %e, "failed to send join request");
                    }
                }

                let exit = loop {
                    tokio::select! {
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                let event = match ServerEvent::from_json(&text) {
                                    Ok(event) => event,
                                    Err(e) => {
                                        debug!(error = %e, "unrecognized relay message");
                                        continue;
                                    }
                                };
                                if options.auto_receive
                                    && matches!(event, ServerEvent::AudioData { .. })
                                    && session.needs_resume()
                                {
                                    info!("audio resumed after host stop, receiving again");
                                    if let Applied::Send(probe) =
                                        apply_command(&mut session, Some(ListenerCommand::StartReceiving))
                                    {
                                        if send_event(&mut sink, &probe).await.is_err() {
                                            break Exit::Dropped;
                                        }
                                    }
                                }
                                let update = session.handle(event);
                                if update == ListenerUpdate::Joined
                                    && options.auto_receive
                                    && !session.is_receiving()
                                {
                                    if let Applied::Send(probe) =
                                        apply_command(&mut session, Some(ListenerCommand::StartReceiving))
                                    {
                                        if send_event(&mut sink, &probe).await.is_err() {
                                            break Exit::Dropped;
                                        }
                                    }
                                }
                                if update != ListenerUpdate::Ignored {
                                    let _ = event_tx.send(ListenerEvent::Update(update)).await;
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                info!("relay closed connection");
                                break Exit::Dropped;
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "WebSocket error");
                                break Exit::Dropped;
                            }
                            _ => {}
                        },
                        command = command_rx.recv() => match apply_command(&mut session, command) {
                            Applied::Send(event) => {
                                if send_event(&mut sink, &event).await.is_err() {
                                    break Exit::Dropped;
                                }
                            }
                            Applied::Nothing => {}
                            Applied::Shutdown => {
                                let _ = sink.close().await;
                                break Exit::Shutdown;
                            }
                        },
                    }
                };

                let _ = event_tx.send(ListenerEvent::Disconnected).await;
                if let Exit::Shutdown = exit {
                    return;
                }
            }
            Ok(Err(e)) => {
                failures += 1;
                error!(error = %e, attempt = failures, "failed to connect to relay");
            }
            Err(_elapsed) => {
                failures += 1;
                error!(
                    attempt = failures,
                    "connection timed out after {:?}", options.connect_timeout
                );
            }
        }

        if failures > options.reconnect_attempts {
            let _ = event_tx
                .send(ListenerEvent::Error(format!(
                    "gave up after {} failed connection attempts",
                    failures
                )))
                .await;
            return;
        }

        info!(delay = ?delay, "reconnecting");
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                command = command_rx.recv() => match apply_command(&mut session, command) {
                    Applied::Shutdown => return,
                    Applied::Send(_) => debug!("sync probe dropped while disconnected"),
                    Applied::Nothing => {}
                },
            }
        }
        delay = (delay * 2).min(options.max_reconnect_delay);
    }
}
