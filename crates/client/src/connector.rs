//! Opens the WebSocket transport for a session.

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Establishes a single WebSocket connection.
///
/// The session calls this once per attempt and never retries on its own
/// inside a call; retry timing belongs to the reconnect policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<WsStream, tungstenite::Error>;
}

/// Connects with `tokio_tungstenite::connect_async`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<WsStream, tungstenite::Error> {
        let (ws_stream, response) = connect_async(url).await?;
        tracing::debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(ws_stream)
    }
}
