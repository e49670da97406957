//! Event channel factories and handles.

use super::types::WebhookJob;
use tokio::sync::mpsc;

/// Sender handle for WebhookJob events.
pub type WebhookJobSender = mpsc::UnboundedSender<WebhookJob>;
/// Receiver handle for WebhookJob events.
pub type WebhookJobReceiver = mpsc::UnboundedReceiver<WebhookJob>;

/// Create a new WebhookJob channel.
///
/// The channel is unbounded so that the feed receive loop never waits on
/// webhook delivery.
pub fn webhook_job_channel() -> (WebhookJobSender, WebhookJobReceiver) {
    mpsc::unbounded_channel()
}
