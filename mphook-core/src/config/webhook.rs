//! Webhook descriptor configuration.

use reqwest::Method;
use reqwest::header::HeaderMap;
use std::time::Duration;
use url::Url;

/// Request timeout used when a webhook does not set one.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// A named outbound HTTP destination.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Url,
    /// Defaults to `POST`.
    pub method: Method,
    /// Extra headers. These override the default `Content-Type`.
    pub headers: HeaderMap,
    /// A request without a response within this duration counts as failed.
    pub timeout: Duration,
}

impl WebhookConfig {
    /// A `POST` webhook with no extra headers and the default timeout.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::POST,
            headers: HeaderMap::new(),
            timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }
}
