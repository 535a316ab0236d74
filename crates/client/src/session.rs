//! Connection Manager
//!
//! A [`Session`] owns one persistent WebSocket connection to the coaching
//! server. A single driver task holds the authoritative [`ChatState`] and
//! publishes snapshots through a `watch` channel; front-ends never mutate
//! state directly but send commands instead.
//!
//! Lifecycle per attempt: `connecting` -> (`connected` -> frames ...) ->
//! `disconnected`, with `error` in between when the transport fails. After
//! every close exactly one reconnect is scheduled according to the
//! [`ReconnectPolicy`]; retries never stop until the session is shut down.

use crate::connector::{Connector, TungsteniteConnector, WsStream};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::{ops::ControlFlow, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_tungstenite::tungstenite::{self, protocol::Message as WsMessage};
use tracing::{debug, error, info, instrument, warn};
use train_r_core::{ChatState, Message, ReconnectPolicy, SendError, SocketEvent};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Something the athlete wants to send.
#[derive(Debug, Clone)]
enum Outgoing {
    UserMessage(String),
    ConfirmationResponse {
        confirmation_id: String,
        confirmed: bool,
    },
}

#[derive(Debug)]
enum Command {
    Send {
        message: Outgoing,
        reply: oneshot::Sender<Result<(), SendError>>,
    },
    Shutdown,
}

/// Handle to a running session.
///
/// Dropping the handle aborts the driver task; call [`Session::shutdown`]
/// to close the connection cleanly.
pub struct Session {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ChatState>,
    task: Option<JoinHandle<()>>,
}

impl Session {
    /// Starts a session against `url` using a real WebSocket connector.
    pub fn spawn(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self::spawn_with_connector(url, policy, Arc::new(TungsteniteConnector))
    }

    /// Starts a session with a custom connector. The first attempt is made
    /// immediately.
    pub fn spawn_with_connector(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ChatState::new());
        let driver = Driver {
            url: url.into(),
            policy,
            connector,
            commands: command_rx,
            state: state_tx,
        };
        let task = tokio::spawn(driver.run());

        Self {
            commands: command_tx,
            state: state_rx,
            task: Some(task),
        }
    }

    /// A receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.clone()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Sends a chat message. On success the message is already in the log
    /// when this returns.
    pub async fn send_user_message(&self, content: impl Into<String>) -> Result<(), SendError> {
        self.send(Outgoing::UserMessage(content.into())).await
    }

    /// Answers a pending confirmation request.
    pub async fn respond_to_confirmation(
        &self,
        confirmation_id: impl Into<String>,
        confirmed: bool,
    ) -> Result<(), SendError> {
        self.send(Outgoing::ConfirmationResponse {
            confirmation_id: confirmation_id.into(),
            confirmed,
        })
        .await
    }

    async fn send(&self, message: Outgoing) -> Result<(), SendError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Send {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SendError::SessionClosed)?;
        reply_rx.await.map_err(|_| SendError::SessionClosed)?
    }

    /// Cancels any pending reconnect, closes the live connection and waits
    /// for the driver to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = ?e, "Session driver ended abnormally");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The single task that owns the connection and the chat state.
struct Driver {
    url: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    commands: mpsc::Receiver<Command>,
    state: watch::Sender<ChatState>,
}

impl Driver {
    #[instrument(name = "coach_session", skip_all, fields(url = %self.url))]
    async fn run(mut self) {
        let mut attempt: u32 = 0;
        loop {
            self.publish(SocketEvent::Connecting);
            info!(attempt, "Connecting to coaching server");

            let Some(result) = self.connect().await else {
                info!("Session shut down while connecting");
                return;
            };

            match result {
                Ok(ws_stream) => {
                    attempt = 0;
                    self.publish(SocketEvent::Opened);
                    info!("Connected to coaching server");
                    if self.serve(ws_stream).await.is_break() {
                        info!("Session shut down");
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Connection attempt failed");
                    self.publish(SocketEvent::Errored);
                }
            }

            self.publish(SocketEvent::Closed);
            let delay = self.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            info!(delay_ms = delay.as_millis() as u64, "Connection closed, scheduling reconnect");

            if self.wait(delay).await.is_break() {
                info!("Session shut down before reconnecting");
                return;
            }
        }
    }

    /// Runs one connection attempt while still answering commands. Returns
    /// `None` if shut down first.
    async fn connect(&mut self) -> Option<Result<WsStream, tungstenite::Error>> {
        let connector = self.connector.clone();
        let url = self.url.clone();
        let connecting = async move { connector.connect(&url).await };
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => return Some(result),
                command = self.commands.recv() => {
                    if self.handle_offline(command).is_break() {
                        return None;
                    }
                }
            }
        }
    }

    /// Pumps frames and commands until the connection ends.
    async fn serve(&mut self, ws_stream: WsStream) -> ControlFlow<()> {
        let (mut sink, mut stream) = ws_stream.split();
        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        self.publish(SocketEvent::Frame(text.as_str().to_owned()));
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        warn!(len = data.len(), "Dropping binary frame");
                    }
                    Some(Ok(WsMessage::Close(close_frame))) => {
                        info!(?close_frame, "Server closed the connection");
                        return ControlFlow::Continue(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "Error reading from WebSocket");
                        self.publish(SocketEvent::Errored);
                        return ControlFlow::Continue(());
                    }
                    None => {
                        info!("WebSocket stream ended");
                        return ControlFlow::Continue(());
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send { message, reply }) => {
                        let outcome = self.record_send(message);
                        let written = match &outcome {
                            Ok(msg) => send_msg(&mut sink, msg).await,
                            Err(_) => Ok(()),
                        };
                        let _ = reply.send(outcome.map(|_| ()));
                        if let Err(e) = written {
                            error!(error = ?e, "Failed to write to WebSocket");
                            self.publish(SocketEvent::Errored);
                            return ControlFlow::Continue(());
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        if let Err(e) = sink.send(WsMessage::Close(None)).await {
                            debug!(error = %e, "Close frame not delivered");
                        }
                        self.publish(SocketEvent::Closed);
                        return ControlFlow::Break(());
                    }
                },
            }
        }
    }

    /// Sleeps out the reconnect delay. Shutdown cancels the timer.
    async fn wait(&mut self, delay: Duration) -> ControlFlow<()> {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return ControlFlow::Continue(()),
                command = self.commands.recv() => {
                    if self.handle_offline(command).is_break() {
                        return ControlFlow::Break(());
                    }
                }
            }
        }
    }

    /// Handles a command while there is no open connection.
    fn handle_offline(&mut self, command: Option<Command>) -> ControlFlow<()> {
        match command {
            Some(Command::Send { message, reply }) => {
                let outcome = self.record_send(message).map(|_| ());
                let _ = reply.send(outcome);
                ControlFlow::Continue(())
            }
            Some(Command::Shutdown) | None => ControlFlow::Break(()),
        }
    }

    /// Runs the send through the state so the echo (or the rejection) lands
    /// in the log before anything touches the socket.
    fn record_send(&mut self, message: Outgoing) -> Result<Message, SendError> {
        let mut outcome = Err(SendError::NotConnected);
        self.state.send_modify(|state| {
            outcome = match message {
                Outgoing::UserMessage(content) => state.send_user_message(content),
                Outgoing::ConfirmationResponse {
                    confirmation_id,
                    confirmed,
                } => state.respond_to_confirmation(confirmation_id, confirmed),
            };
        });
        outcome
    }

    fn publish(&mut self, event: SocketEvent) {
        self.state.send_modify(|state| {
            state.apply(event);
        });
    }
}

/// Serializes and writes a single message.
async fn send_msg(sink: &mut SplitSink<WsStream, WsMessage>, message: &Message) -> Result<()> {
    let serialized = message.to_json()?;
    sink.send(WsMessage::Text(serialized.into())).await?;
    Ok(())
}
