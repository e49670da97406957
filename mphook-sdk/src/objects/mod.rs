pub mod feed;
pub mod webhook;

pub use feed::{EventKind, ParseEventKindError, SubscribeRequest};
pub use webhook::WebhookEnvelope;
