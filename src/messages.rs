//! Control messages from the page
//!
//! Payloads are JSON objects discriminated by a `type` field. Only the
//! known variants are acted on; anything else is dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tokio::sync::oneshot;
use tracing::debug;

/// A recognised control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate a waiting worker now
    SkipWaiting,
    /// Delete every bucket and reply when done
    ClearCache,
}

impl ControlMessage {
    /// Interpret a raw payload, `None` if it is not a known message
    pub fn parse(payload: &Value) -> Option<Self> {
        match serde_json::from_value(payload.clone()) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Ignoring control message {}: {}", payload, e);
                None
            }
        }
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipWaiting => f.write_str("SKIP_WAITING"),
            Self::ClearCache => f.write_str("CLEAR_CACHE"),
        }
    }
}

/// Body of a reply sent back to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
}

/// One-shot channel back to the sender of a message
#[derive(Debug)]
pub struct ReplyPort(oneshot::Sender<Reply>);

impl ReplyPort {
    /// Create a port and the receiving end the page listens on
    pub fn channel() -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Deliver `reply`; returns false if the receiver is gone
    pub fn send(self, reply: Reply) -> bool {
        self.0.send(reply).is_ok()
    }
}

/// A message as delivered to the proxy
#[derive(Debug)]
pub struct MessageEvent {
    pub data: Value,
    pub reply: Option<ReplyPort>,
}

impl MessageEvent {
    pub fn new(data: Value) -> Self {
        Self { data, reply: None }
    }

    pub fn with_reply(mut self, port: ReplyPort) -> Self {
        self.reply = Some(port);
        self
    }
}
