pub mod page;
pub mod protocol;
pub mod qa_task;
pub mod rest;
pub mod state;
pub mod upload_task;
pub mod ws_handler;

// Re-export the handlers the binary needs to build the web server router.
pub use page::index_handler;
pub use rest::extract_handler;
pub use ws_handler::ws_handler;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use legal_qa_core::ports::{PortError, PortResult};
use protocol::ServerMessage;

/// The sending half of a client's WebSocket.
pub type WsSender = SplitSink<WebSocket, Message>;

/// Anything that can carry server messages back to the client.
#[async_trait]
pub trait ClientSink: Send {
    async fn deliver(&mut self, msg: &ServerMessage) -> PortResult<()>;
}

#[async_trait]
impl ClientSink for WsSender {
    /// Serializes `msg` and sends it as a text frame.
    async fn deliver(&mut self, msg: &ServerMessage) -> PortResult<()> {
        let json = serde_json::to_string(msg).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.send(Message::Text(json.into()))
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to send message to client: {}", e)))
    }
}

/// Collects messages in order instead of sending them.
#[cfg(test)]
#[async_trait]
impl ClientSink for Vec<ServerMessage> {
    async fn deliver(&mut self, msg: &ServerMessage) -> PortResult<()> {
        self.push(msg.clone());
        Ok(())
    }
}

pub async fn send_message<S: ClientSink + ?Sized>(sink: &mut S, msg: &ServerMessage) -> PortResult<()> {
    sink.deliver(msg).await
}
