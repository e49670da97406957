//! Configuration module for mphook-monitor.
//!
//! Handles loading the config file (JSON or TOML), applying CLI overrides,
//! validating values and converting them into the runtime
//! [`MonitorConfig`]. A missing or invalid file never aborts the monitor:
//! [`ConfigLoader::load_or_default`] falls back to the built-in defaults.

pub mod file;

use crate::config::file::{FileConfig, TriggerConfig, WebhookConfig as FileWebhookConfig};
use mphook_core::config::{MonitorConfig, Operator, TriggerRule, WebhookConfig};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse JSON config file: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to parse TOML config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    feed_url_override: Option<Url>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, feed_url_override: Option<Url>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            feed_url_override,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the file and parse it as TOML (`.toml`) or JSON (anything else)
    /// 2. Validate and convert it into a [`MonitorConfig`]
    /// 3. Apply the CLI feed URL override
    pub fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let content = std::fs::read_to_string(&self.config_path)?;
        let file_config = self.parse(&content)?;
        let mut config = build_monitor_config(file_config)?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load_or_default(&self) -> MonitorConfig {
        if !self.config_path.exists() {
            tracing::warn!(path = ?self.config_path, "Config file not found, using defaults");
            return self.defaults();
        }

        match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    path = ?self.config_path,
                    error = %e,
                    "Failed to load config, using defaults"
                );
                self.defaults()
            }
        }
    }

    fn defaults(&self) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        self.apply_overrides(&mut config);
        config
    }

    fn parse(&self, content: &str) -> Result<FileConfig, ConfigError> {
        let is_toml = self
            .config_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }

    fn apply_overrides(&self, config: &mut MonitorConfig) {
        if let Some(url) = &self.feed_url_override {
            config.feed_url = url.clone();
        }
    }
}

/// Validate a file configuration and convert it into the runtime form.
pub fn build_monitor_config(file_config: FileConfig) -> Result<MonitorConfig, ConfigError> {
    let feed_url = parse_url("mempool_url", &file_config.mempool_url, &["ws", "wss"])?;
    let reconnect_delay = seconds("reconnect_delay", file_config.reconnect_delay)?;

    let webhooks = file_config
        .webhooks
        .into_iter()
        .map(|(name, webhook)| {
            let converted = convert_webhook(&name, webhook)?;
            Ok((name, converted))
        })
        .collect::<Result<HashMap<_, _>, ConfigError>>()?;

    let triggers: Vec<TriggerRule> = file_config
        .triggers
        .into_iter()
        .enumerate()
        .map(|(index, trigger)| convert_trigger(index, trigger))
        .collect();

    for rule in &triggers {
        if !rule.operator.is_recognized() {
            tracing::warn!(
                rule = %rule.name,
                operator = %rule.operator,
                "Unrecognized operator, rule will never match"
            );
        }
        if !webhooks.contains_key(&rule.webhook) {
            tracing::warn!(
                rule = %rule.name,
                webhook = %rule.webhook,
                "Rule references an unknown webhook"
            );
        }
    }

    Ok(MonitorConfig {
        feed_url,
        reconnect_delay,
        webhooks,
        triggers,
    })
}

fn convert_webhook(name: &str, webhook: FileWebhookConfig) -> Result<WebhookConfig, ConfigError> {
    let url = parse_url(&format!("webhooks.{name}.url"), &webhook.url, &["http", "https"])?;

    let method = Method::from_bytes(webhook.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| {
            ConfigError::ValidationError(format!(
                "webhook {name} has invalid method {:?}",
                webhook.method
            ))
        })?;

    let mut headers = HeaderMap::with_capacity(webhook.headers.len());
    for (key, value) in &webhook.headers {
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            ConfigError::ValidationError(format!("webhook {name} has invalid header name {key:?}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::ValidationError(format!(
                "webhook {name} has invalid value for header {key}"
            ))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(WebhookConfig {
        url,
        method,
        headers,
        timeout: seconds(&format!("webhooks.{name}.timeout"), webhook.timeout)?,
    })
}

fn convert_trigger(index: usize, trigger: TriggerConfig) -> TriggerRule {
    TriggerRule {
        name: trigger
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("trigger-{index}")),
        event: trigger.event,
        field: trigger.field,
        operator: Operator::from(trigger.operator.as_str()),
        value: trigger.value,
        webhook: trigger.webhook,
    }
}

fn parse_url(key: &str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::ValidationError(format!("{key} is not a valid URL: {e}")))?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::ValidationError(format!(
            "{key} must use one of the schemes {schemes:?}, got {}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn seconds(key: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::ValidationError(format!(
            "{key} must be a finite, non-negative number of seconds, got {value}"
        ))
    })
}
