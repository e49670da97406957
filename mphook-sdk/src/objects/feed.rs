//! Feed protocol objects.
//!
//! The feed is a single websocket. After connecting, the client sends one
//! [`SubscribeRequest`] per event kind it is interested in:
//!
//! ```json
//! {"action":"want","data":["block"]}
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canonical event families a trigger rule can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A new block was mined.
    Block,
    /// Mempool state changed.
    Mempool,
    /// New transactions were seen.
    Tx,
}

impl EventKind {
    /// All event kinds, in feed key order.
    pub const ALL: [EventKind; 3] = [EventKind::Block, EventKind::Mempool, EventKind::Tx];

    /// The name used on the wire and in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Block => "block",
            EventKind::Mempool => "mempool",
            EventKind::Tx => "tx",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(EventKind::Block),
            "mempool" => Ok(EventKind::Mempool),
            "tx" => Ok(EventKind::Tx),
            other => Err(ParseEventKindError(other.to_string())),
        }
    }
}

/// Outbound subscription control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub action: String,
    pub data: Vec<EventKind>,
}

impl SubscribeRequest {
    pub const WANT: &'static str = "want";

    /// A `want` request for a single event kind.
    pub fn want(kind: EventKind) -> Self {
        Self {
            action: Self::WANT.to_string(),
            data: vec![kind],
        }
    }
}
