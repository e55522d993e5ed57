//! Transports carry serialized envelopes between two execution contexts.
//!
//! `PostMessageTransport` is the in-process stand-in for `window.postMessage`
//! between the manager and the preview frame: each side owns one end of a
//! pair of queues and nothing else is shared.

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use tracing::debug;

use crate::error::{Result, StorybookError};

pub trait Transport: Send + Sync {
    /// Queue a frame for the peer. Never blocks.
    fn send(&self, event: &str, frame: String) -> Result<()>;
    /// Next pending frame, if any.
    fn try_recv(&self) -> Option<String>;
    /// Wait for the next frame. `None` once the peer is gone.
    fn recv_blocking(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct PostMessageTransport {
    outgoing: Sender<String>,
    incoming: Receiver<String>,
}

/// Two connected endpoints, one per execution context.
pub fn pair() -> (PostMessageTransport, PostMessageTransport) {
    let (to_preview, from_manager) = async_channel::unbounded();
    let (to_manager, from_preview) = async_channel::unbounded();
    (
        PostMessageTransport {
            outgoing: to_preview,
            incoming: from_preview,
        },
        PostMessageTransport {
            outgoing: to_manager,
            incoming: from_manager,
        },
    )
}

impl PostMessageTransport {
    /// Frames waiting to be pumped on this side.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    /// Drop this side's outgoing queue so the peer sees the connection close.
    pub fn close(&self) {
        self.outgoing.close();
    }
}

impl Transport for PostMessageTransport {
    fn send(&self, event: &str, frame: String) -> Result<()> {
        match self.outgoing.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => {
                debug!(event = %event, "Transport closed, frame dropped");
                Err(StorybookError::ChannelClosed {
                    event: event.to_string(),
                })
            }
        }
    }

    fn try_recv(&self) -> Option<String> {
        match self.incoming.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    fn recv_blocking(&self) -> Option<String> {
        self.incoming.recv_blocking().ok()
    }
}
