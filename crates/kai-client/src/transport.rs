//! Transport seam.
//!
//! The SDK core never opens a socket itself: the embedding process supplies
//! a [`Transport`] for outbound frames and calls
//! [`KaiSdk::handle_incoming`](crate::KaiSdk::handle_incoming) once per
//! complete inbound message. Reconnect and framing are the transport's
//! problem.

use async_trait::async_trait;
use tokio::sync::mpsc;

use kai_core::error::{KaiError, Result};

/// The one function a transport must implement: transmit one serialized
/// envelope. Sends are fire-and-forget from the SDK's perspective; no
/// acknowledgement is awaited before the next send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn transmit(&self, frame: String) -> Result<()>;
}

/// Channel-backed transport for tests and local harnesses: frames land in
/// an mpsc receiver instead of a socket.
pub struct ChannelTransport {
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn transmit(&self, frame: String) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|e| KaiError::Transport(format!("channel closed: {e}")))
    }
}
