//! WebhookSender processor.
//!
//! The WebhookSender is responsible for:
//! - Receiving `WebhookJob`s from the queue
//! - Looking up the named webhook descriptor
//! - Sending one HTTP request per job with the descriptor's method, headers
//!   and timeout
//! - Logging the outcome
//!
//! Every job is delivered on its own detached task. Failed deliveries are
//! logged and never retried.

use crate::config::WebhookConfig;
use crate::events::{WebhookJob, WebhookJobReceiver};
use kanau::processor::Processor;
use mphook_sdk::objects::WebhookEnvelope;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that can occur during webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No webhook with this name is configured
    #[error("webhook '{0}' not found")]
    UnknownWebhook(String),

    /// HTTP request error, including timeouts
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("webhook delivery failed with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },

    /// Payload serialization error
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WebhookError {
    pub fn is_unknown_webhook(&self) -> bool {
        matches!(self, WebhookError::UnknownWebhook(_))
    }
}

/// WebhookSender delivers matched envelopes to the configured endpoints.
///
/// Cloning is cheap; clones share the descriptor map and HTTP client.
#[derive(Clone)]
pub struct WebhookSender {
    webhooks: Arc<HashMap<String, WebhookConfig>>,
    http_client: reqwest::Client,
}

impl WebhookSender {
    /// Create a new WebhookSender for the given webhook descriptors.
    pub fn new(webhooks: HashMap<String, WebhookConfig>) -> Self {
        Self {
            webhooks: Arc::new(webhooks),
            http_client: reqwest::Client::builder()
                .user_agent(concat!("mphook/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    /// Run the WebhookSender until shutdown or until every job sender is dropped.
    ///
    /// In-flight deliveries are not awaited on exit.
    pub async fn run(self, mut job_rx: WebhookJobReceiver, mut shutdown_rx: watch::Receiver<bool>) {
        info!(webhooks = self.webhooks.len(), "WebhookSender started");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("WebhookSender received shutdown signal");
                        break;
                    }
                }

                // Receive WebhookJob events
                Some(job) = job_rx.recv() => {
                    debug!(
                        webhook = %job.webhook,
                        rule = %job.envelope.rule,
                        "Received WebhookJob"
                    );
                    self.dispatch(job);
                }

                else => {
                    info!("WebhookJob channel closed");
                    break;
                }
            }
        }

        info!("WebhookSender shutdown complete");
    }

    /// Deliver `job` on a detached task and log the outcome.
    ///
    /// The returned handle may be dropped; the delivery still runs.
    pub fn dispatch(&self, job: WebhookJob) -> JoinHandle<Result<StatusCode, WebhookError>> {
        let sender = self.clone();
        tokio::spawn(async move {
            let result = sender.send(&job.webhook, &job.envelope).await;
            match &result {
                Ok(status) => {
                    info!(
                        webhook = %job.webhook,
                        rule = %job.envelope.rule,
                        status = status.as_u16(),
                        "Webhook delivered"
                    );
                }
                Err(WebhookError::UnknownWebhook(name)) => {
                    warn!(
                        webhook = %name,
                        rule = %job.envelope.rule,
                        "Webhook not found, skipping dispatch"
                    );
                }
                Err(e) => {
                    warn!(
                        webhook = %job.webhook,
                        rule = %job.envelope.rule,
                        error = %e,
                        "Webhook delivery failed"
                    );
                }
            }
            result
        })
    }

    /// Send `envelope` to the webhook called `name` and wait for the response.
    ///
    /// An unknown name fails with [`WebhookError::UnknownWebhook`] before any
    /// network I/O happens.
    pub async fn send(
        &self,
        name: &str,
        envelope: &WebhookEnvelope,
    ) -> Result<StatusCode, WebhookError> {
        let Some(webhook) = self.webhooks.get(name) else {
            return Err(WebhookError::UnknownWebhook(name.to_string()));
        };

        let body = serde_json::to_string(envelope)?;

        // Descriptor headers replace the default content type when they set one.
        let response = self
            .http_client
            .request(webhook.method.clone(), webhook.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .headers(webhook.headers.clone())
            .timeout(webhook.timeout)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WebhookError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Processor<WebhookJob> for WebhookSender {
    type Output = StatusCode;
    type Error = WebhookError;

    async fn process(&self, job: WebhookJob) -> Result<StatusCode, WebhookError> {
        self.send(&job.webhook, &job.envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, Method};
    use axum::routing::any;
    use mphook_sdk::objects::EventKind;
    use reqwest::header::{HeaderName, HeaderValue};
    use serde_json::json;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use url::Url;

    type Captured = (Method, HeaderMap, String);

    /// Spawn a receiver that records every request and answers with `status`
    /// after `delay`.
    async fn spawn_receiver(
        status: StatusCode,
        delay: Duration,
    ) -> (Url, mpsc::UnboundedReceiver<Captured>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/hook",
            any(move |method: Method, headers: HeaderMap, body: String| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((method, headers, body));
                    tokio::time::sleep(delay).await;
                    status
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (Url::parse(&format!("http://{addr}/hook")).unwrap(), rx)
    }

    fn single(name: &str, config: WebhookConfig) -> WebhookSender {
        WebhookSender::new(HashMap::from([(name.to_string(), config)]))
    }

    fn envelope() -> WebhookEnvelope {
        WebhookEnvelope {
            event: EventKind::Block,
            rule: "new-block".to_string(),
            data: json!({"blocks": [{"height": 800000}]}),
            timestamp: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_unknown_webhook_is_reported_without_request() {
        let sender = WebhookSender::new(HashMap::new());
        let err = sender.send("nope", &envelope()).await.unwrap_err();
        assert!(err.is_unknown_webhook());
        assert_eq!(err.to_string(), "webhook 'nope' not found");
    }

    #[tokio::test]
    async fn test_posts_json_envelope_with_default_content_type() {
        let (url, mut requests) = spawn_receiver(StatusCode::OK, Duration::ZERO).await;
        let sender = single("discord", WebhookConfig::new(url));

        let status = sender.send("discord", &envelope()).await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let (method, headers, body) = requests.recv().await.unwrap();
        assert_eq!(method, Method::POST);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        let received: WebhookEnvelope = serde_json::from_str(&body).unwrap();
        assert_eq!(received, envelope());
    }

    #[tokio::test]
    async fn test_descriptor_method_and_headers_override_defaults() {
        let (url, mut requests) = spawn_receiver(StatusCode::NO_CONTENT, Duration::ZERO).await;
        let mut config = WebhookConfig::new(url);
        config.method = Method::PUT;
        config.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        config.headers.insert(
            HeaderName::from_static("x-token"),
            HeaderValue::from_static("secret"),
        );
        let sender = single("hook", config);

        assert_eq!(sender.send("hook", &envelope()).await.unwrap(), StatusCode::NO_CONTENT);

        let (method, headers, _) = requests.recv().await.unwrap();
        assert_eq!(method, Method::PUT);
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-token").unwrap(), "secret");
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_delivery_failure() {
        let (url, _requests) =
            spawn_receiver(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let sender = single("hook", WebhookConfig::new(url));

        match sender.send("hook", &envelope()).await {
            Err(WebhookError::DeliveryFailed { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_a_request_error() {
        let (url, _requests) = spawn_receiver(StatusCode::OK, Duration::from_secs(5)).await;
        let mut config = WebhookConfig::new(url);
        config.timeout = Duration::from_millis(100);
        let sender = single("slow", config);

        match sender.send("slow", &envelope()).await {
            Err(WebhookError::Request(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_detached_and_reports_outcome() {
        let (url, mut requests) = spawn_receiver(StatusCode::OK, Duration::ZERO).await;
        let sender = single("discord", WebhookConfig::new(url));

        let unknown = sender.dispatch(WebhookJob {
            webhook: "missing".to_string(),
            envelope: envelope(),
        });
        let known = sender.dispatch(WebhookJob {
            webhook: "discord".to_string(),
            envelope: envelope(),
        });

        assert!(unknown.await.unwrap().unwrap_err().is_unknown_webhook());
        assert_eq!(known.await.unwrap().unwrap(), StatusCode::OK);
        assert!(requests.recv().await.is_some());
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_processor_delegates_to_send() {
        let sender = WebhookSender::new(HashMap::new());
        let job = WebhookJob {
            webhook: "absent".to_string(),
            envelope: envelope(),
        };
        assert!(sender.process(job).await.unwrap_err().is_unknown_webhook());
    }
}
