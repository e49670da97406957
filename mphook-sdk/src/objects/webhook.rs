//! Webhook payload sent for every rule match.

use serde::{Deserialize, Serialize};

use super::feed::EventKind;

/// Dispatch envelope posted to a webhook when a trigger rule matches.
///
/// ```json
/// {"event":"block","rule":"new-block","data":{"blocks":[...]},"timestamp":1700000000000}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Event kind the rule listens to.
    pub event: EventKind,
    /// Name of the rule that matched.
    pub rule: String,
    /// The canonical event payload the rule was evaluated against.
    pub data: serde_json::Value,
    /// Unix epoch milliseconds, captured at dispatch time.
    pub timestamp: i64,
}
