//! Chat State Container
//!
//! `ChatState` holds everything a front-end renders: connection status, the
//! last error string and the message log. It changes only through
//! [`ChatState::apply`] (socket lifecycle) and the two send operations; all
//! other views are derived from it on demand.

use crate::{
    chat,
    confirmation::{self, PendingConfirmation},
    display::DisplayState,
    error::SendError,
    log::MessageLog,
    protocol::Message,
    upload::UploadStatus,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Error string recorded when the transport fails.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Retrying shortly...";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// A socket lifecycle event, in the order the transport observed it.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// A connection attempt has started.
    Connecting,
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The transport failed. A `Closed` always follows.
    Errored,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    status: ConnectionStatus,
    error: Option<String>,
    log: MessageLog,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Applies a socket event. Returns the parsed message when the event was
    /// a well-formed frame.
    pub fn apply(&mut self, event: SocketEvent) -> Option<&Message> {
        match event {
            SocketEvent::Connecting => self.status = ConnectionStatus::Connecting,
            SocketEvent::Opened => {
                self.status = ConnectionStatus::Connected;
                self.error = None;
            }
            SocketEvent::Frame(text) => match Message::parse(&text) {
                Ok(message) => {
                    debug!(kind = message.tag(), "Received message");
                    self.log.push(message);
                    return self.log.last();
                }
                Err(e) => {
                    warn!(error = %e, frame = %text, "Dropping malformed frame");
                }
            },
            SocketEvent::Errored => {
                self.status = ConnectionStatus::Error;
                self.error = Some(CONNECTION_ERROR_MESSAGE.to_string());
            }
            SocketEvent::Closed => self.status = ConnectionStatus::Disconnected,
        }
        None
    }

    /// Echoes a user message into the log. The caller is responsible for
    /// writing the returned message to the socket.
    pub fn send_user_message(&mut self, content: impl Into<String>) -> Result<Message, SendError> {
        self.echo(Message::user(content))
    }

    /// Answers a confirmation request. Does not check that the id is pending.
    pub fn respond_to_confirmation(
        &mut self,
        confirmation_id: impl Into<String>,
        confirmed: bool,
    ) -> Result<Message, SendError> {
        self.echo(Message::confirmation_response(confirmation_id, confirmed))
    }

    /// Rejects a send that never reached the state, e.g. when the driver has
    /// already gone away.
    pub fn reject_send(&mut self, error: SendError) -> SendError {
        self.error = Some(error.to_string());
        error
    }

    fn echo(&mut self, message: Message) -> Result<Message, SendError> {
        if !self.is_connected() {
            warn!(kind = message.tag(), status = %self.status, "Rejecting send while not connected");
            return Err(self.reject_send(SendError::NotConnected));
        }
        self.log.push(message.clone());
        Ok(message)
    }

    pub fn display(&self) -> DisplayState {
        DisplayState::from_log(self.log.as_slice())
    }

    pub fn transcript(&self) -> Vec<&Message> {
        chat::transcript(self.log.as_slice())
    }

    pub fn visible_entries(&self) -> Vec<(usize, &Message)> {
        chat::visible_entries(self.log.as_slice())
    }

    pub fn is_waiting_for_response(&self) -> bool {
        chat::is_waiting_for_response(self.log.as_slice())
    }

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        confirmation::pending_confirmation(self.log.as_slice())
    }

    pub fn upload_status(&self) -> UploadStatus {
        UploadStatus::from_log(self.log.as_slice())
    }
}
