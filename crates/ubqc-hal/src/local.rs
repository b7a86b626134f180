//! In-process loopback channel.
//!
//! [`local_channel`] returns a connected pair: a [`LocalChannel`] implementing
//! [`ClassicalChannel`] for the client, and a [`ServerEnd`] for a server task
//! running in the same process (tests, embedded simulators).

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use crate::channel::{ClassicalChannel, ClientMessage, ServerMessage};
use crate::error::{HalError, HalResult};

/// Client half of a loopback channel.
#[derive(Debug)]
pub struct LocalChannel {
    to_server: mpsc::UnboundedSender<ClientMessage>,
    from_server: mpsc::UnboundedReceiver<ServerMessage>,
}

/// Server half of a loopback channel.
#[derive(Debug)]
pub struct ServerEnd {
    to_client: mpsc::UnboundedSender<ServerMessage>,
    from_client: mpsc::UnboundedReceiver<ClientMessage>,
}

/// Create a connected client/server pair.
pub fn local_channel() -> (LocalChannel, ServerEnd) {
    let (to_server, from_client) = mpsc::unbounded_channel();
    let (to_client, from_server) = mpsc::unbounded_channel();
    (
        LocalChannel {
            to_server,
            from_server,
        },
        ServerEnd {
            to_client,
            from_client,
        },
    )
}

#[async_trait]
impl ClassicalChannel for LocalChannel {
    async fn send(&mut self, message: ClientMessage) -> HalResult<()> {
        trace!(kind = message.kind(), "loopback client send");
        self.to_server
            .send(message)
            .map_err(|_| HalError::ChannelClosed)
    }

    async fn recv(&mut self) -> HalResult<ServerMessage> {
        self.from_server.recv().await.ok_or(HalError::ChannelClosed)
    }
}

impl ServerEnd {
    /// Send a message to the client.
    pub fn send(&self, message: ServerMessage) -> HalResult<()> {
        trace!(kind = message.kind(), "loopback server send");
        self.to_client
            .send(message)
            .map_err(|_| HalError::ChannelClosed)
    }

    /// Wait for the next client message; `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        self.from_client.recv().await
    }
}
