//! Processors of the monitor pipeline.
//!
//! - `ConnectionManager`: owns the feed socket, emits `FeedEvent`s to the engine
//! - `TriggerEngine`: receives `FeedEvent`, emits `WebhookJob`
//! - `WebhookSender`: receives `WebhookJob`, delivers webhooks

pub mod connection_manager;
pub mod trigger_engine;
pub mod webhook_sender;

pub use connection_manager::{ConnectionManager, ConnectionState};
pub use trigger_engine::TriggerEngine;
pub use webhook_sender::{WebhookError, WebhookSender};
