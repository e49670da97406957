//! Configuration types for the mempool monitor.
//!
//! These types represent the validated runtime configuration. The actual
//! file loading/parsing is handled by the monitor binary, which falls back
//! to [`MonitorConfig::default`] when the file is missing or invalid.

mod trigger;
mod webhook;

pub use trigger::{Operator, TriggerRule};
pub use webhook::WebhookConfig;

use mphook_sdk::objects::EventKind;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Feed endpoint used when the configuration does not name one.
pub const DEFAULT_FEED_URL: &str = "wss://mempool.space/api/v1/ws";

/// Delay between a feed disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Complete runtime configuration. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Websocket endpoint of the feed.
    pub feed_url: Url,
    /// Fixed delay before every reconnect attempt.
    pub reconnect_delay: Duration,
    /// Webhook descriptors indexed by name.
    pub webhooks: HashMap<String, WebhookConfig>,
    /// Trigger rules in declaration order.
    pub triggers: Vec<TriggerRule>,
}

impl MonitorConfig {
    /// Distinct event kinds referenced by the trigger rules, in order of
    /// first appearance.
    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        let mut kinds = Vec::with_capacity(EventKind::ALL.len());
        for rule in &self.triggers {
            if !kinds.contains(&rule.event) {
                kinds.push(rule.event);
            }
        }
        kinds
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            webhooks: HashMap::new(),
            triggers: Vec::new(),
        }
    }
}

/// Parsed [`DEFAULT_FEED_URL`].
#[allow(clippy::expect_used)]
pub fn default_feed_url() -> Url {
    Url::parse(DEFAULT_FEED_URL).expect("valid default feed url")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, event: EventKind) -> TriggerRule {
        TriggerRule {
            name: name.to_string(),
            event,
            field: String::new(),
            operator: Operator::Exists,
            value: None,
            webhook: "hook".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.feed_url.as_str(), DEFAULT_FEED_URL);
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert!(config.webhooks.is_empty());
        assert!(config.triggers.is_empty());
        assert!(config.subscribed_kinds().is_empty());
    }

    #[test]
    fn test_subscribed_kinds_are_distinct_in_first_appearance_order() {
        let config = MonitorConfig {
            triggers: vec![
                rule("a", EventKind::Tx),
                rule("b", EventKind::Block),
                rule("c", EventKind::Tx),
                rule("d", EventKind::Block),
            ],
            ..MonitorConfig::default()
        };
        assert_eq!(config.subscribed_kinds(), vec![EventKind::Tx, EventKind::Block]);
    }
}
