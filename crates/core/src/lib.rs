//! Train-R Core
//!
//! Protocol types and pure reducers for the coaching chat. Nothing in this
//! crate performs I/O: a transport feeds [`state::SocketEvent`]s into a
//! [`state::ChatState`] and front-ends read the derived views.

pub mod chat;
pub mod confirmation;
pub mod display;
pub mod error;
pub mod log;
pub mod protocol;
pub mod reconnect;
pub mod state;
pub mod upload;

pub use confirmation::PendingConfirmation;
pub use display::DisplayState;
pub use error::SendError;
pub use log::MessageLog;
pub use protocol::{DisplayType, Message, MessageKind, UploadSummary};
pub use reconnect::ReconnectPolicy;
pub use state::{ChatState, ConnectionStatus, SocketEvent};
pub use upload::UploadStatus;
