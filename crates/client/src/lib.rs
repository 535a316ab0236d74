//! Train-R Client
//!
//! Connects to the coaching server over WebSocket and keeps a
//! [`train_r_core::ChatState`] in sync with the message stream:
//!
//! - `config`: environment-driven settings (endpoint, reconnect policy, log level).
//! - `connector`: the transport seam used to open each connection.
//! - `session`: the connection manager and its command handle.
//! - `health`: the HTTP health probe.

pub mod config;
pub mod connector;
pub mod health;
pub mod session;

pub use config::ClientConfig;
pub use session::Session;
