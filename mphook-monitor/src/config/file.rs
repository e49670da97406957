//! Configuration file structures.
//!
//! These structs map directly to the monitor's config file, which is JSON by
//! default and TOML when the file name ends in `.toml`. Durations are given
//! in seconds and may be fractional.

use mphook_core::config::DEFAULT_FEED_URL;
use mphook_sdk::objects::EventKind;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Root configuration structure as read from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// Websocket endpoint of the feed.
    #[serde(default = "default_mempool_url")]
    pub mempool_url: String,
    /// Seconds to wait before reconnecting after a disconnect.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: f64,
    #[serde(default)]
    pub webhooks: BTreeMap<String, WebhookConfig>,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            mempool_url: default_mempool_url(),
            reconnect_delay: default_reconnect_delay(),
            webhooks: BTreeMap::new(),
            triggers: Vec::new(),
        }
    }
}

fn default_mempool_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_reconnect_delay() -> f64 {
    5.0
}

/// Webhook section, keyed by webhook name.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_timeout() -> f64 {
    10.0
}

/// One trigger rule.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// Defaults to `trigger-<index>`.
    #[serde(default)]
    pub name: Option<String>,
    pub event: EventKind,
    #[serde(default)]
    pub field: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    pub webhook: String,
}

fn default_operator() -> String {
    "==".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_config_parsing() {
        let json_str = r#"{
            "mempool_url": "wss://mempool.example/api/v1/ws",
            "reconnect_delay": 2,
            "webhooks": {
                "discord": {
                    "url": "https://discord.example/hook",
                    "headers": {"X-Token": "abc"}
                }
            },
            "triggers": [
                {
                    "name": "new-block",
                    "event": "block",
                    "field": "blocks.0.height",
                    "operator": "exists",
                    "webhook": "discord"
                },
                {
                    "event": "tx",
                    "field": "txs.0.value",
                    "operator": ">",
                    "value": 100000000,
                    "webhook": "discord"
                }
            ]
        }"#;
        let config: FileConfig = serde_json::from_str(json_str).unwrap();
        assert_eq!(config.mempool_url, "wss://mempool.example/api/v1/ws");
        assert_eq!(config.reconnect_delay, 2.0);

        let discord = &config.webhooks["discord"];
        assert_eq!(discord.method, "POST");
        assert_eq!(discord.timeout, 10.0);
        assert_eq!(discord.headers["X-Token"], "abc");

        assert_eq!(config.triggers.len(), 2);
        assert_eq!(config.triggers[0].name.as_deref(), Some("new-block"));
        assert_eq!(config.triggers[0].value, None);
        assert_eq!(config.triggers[1].name, None);
        assert_eq!(config.triggers[1].event, EventKind::Tx);
        assert_eq!(config.triggers[1].value, Some(json!(100000000)));
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_str = r#"
mempool_url = "wss://mempool.space/api/v1/ws"
reconnect_delay = 0.5

[webhooks.ops]
url = "https://ops.example/alert"
method = "put"
timeout = 3

[[triggers]]
name = "big-mempool"
event = "mempool"
field = "count"
operator = ">="
value = 50000
webhook = "ops"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.reconnect_delay, 0.5);
        assert_eq!(config.webhooks["ops"].method, "put");
        assert_eq!(config.webhooks["ops"].timeout, 3.0);
        assert_eq!(config.triggers[0].event, EventKind::Mempool);
        assert_eq!(config.triggers[0].value, Some(json!(50000)));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mempool_url, DEFAULT_FEED_URL);
        assert_eq!(config.reconnect_delay, 5.0);
        assert!(config.webhooks.is_empty());
        assert!(config.triggers.is_empty());
    }

    #[test]
    fn test_unknown_event_kind_is_rejected() {
        let result = serde_json::from_str::<FileConfig>(
            r#"{"triggers":[{"event":"blocks","webhook":"x"}]}"#,
        );
        assert!(result.is_err());
    }
}
