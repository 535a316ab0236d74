/// Why an outgoing message was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Not connected to the coaching server")]
    NotConnected,
    #[error("Session has been shut down")]
    SessionClosed,
}
