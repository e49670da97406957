//! Event type definitions.

use mphook_sdk::objects::{EventKind, WebhookEnvelope};
use serde_json::Value;

/// A canonical event derived from one feed message.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl FeedEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// A request to deliver one envelope to one named webhook.
#[derive(Debug, Clone)]
pub struct WebhookJob {
    /// Webhook name as referenced by the matching rule.
    pub webhook: String,
    pub envelope: WebhookEnvelope,
}
