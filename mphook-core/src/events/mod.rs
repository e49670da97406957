//! Event system for the monitor pipeline.
//!
//! # Event Flow
//!
//! 1. `ConnectionManager` decodes a feed frame and hands it to [`classify`]
//! 2. Each resulting [`FeedEvent`] -> `TriggerEngine`
//! 3. `TriggerEngine` emits a [`WebhookJob`] per matching rule -> `WebhookSender`
//!
//! Events are ephemeral: they are built per message and dropped once the
//! trigger engine has evaluated them.

pub mod channels;
pub mod classifier;
pub mod types;

pub use channels::{WebhookJobReceiver, WebhookJobSender, webhook_job_channel};
pub use classifier::{FeedKey, classify};
pub use types::{FeedEvent, WebhookJob};
