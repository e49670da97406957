//! TriggerEngine processor.
//!
//! The TriggerEngine is responsible for:
//! - Receiving canonical `FeedEvent`s via the `Processor` trait
//! - Evaluating every rule of the matching event kind, in declaration order
//! - Emitting one `WebhookJob` per matching rule
//!
//! Jobs go onto an unbounded channel, so a slow or failing webhook never
//! delays evaluation of the remaining rules or the next event.

use crate::config::TriggerRule;
use crate::events::{FeedEvent, WebhookJob, WebhookJobSender};
use crate::rules::evaluate;
use kanau::processor::Processor;
use mphook_sdk::objects::WebhookEnvelope;
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// Matches canonical events against the configured trigger rules.
pub struct TriggerEngine {
    rules: Vec<TriggerRule>,
    job_tx: WebhookJobSender,
}

impl TriggerEngine {
    /// Create a new TriggerEngine.
    ///
    /// # Arguments
    ///
    /// * `rules` - Trigger rules in declaration order
    /// * `job_tx` - Sender for matched `WebhookJob`s
    pub fn new(rules: Vec<TriggerRule>, job_tx: WebhookJobSender) -> Self {
        Self { rules, job_tx }
    }

    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    /// Evaluate `event` against all rules and enqueue a job per match.
    ///
    /// Returns the number of matching rules.
    pub fn handle(&self, event: &FeedEvent) -> usize {
        let mut matched = 0;

        for rule in self.rules.iter().filter(|r| r.event == event.kind) {
            if !evaluate(rule, &event.payload) {
                debug!(rule = %rule.name, event = %event.kind, "Rule did not match");
                continue;
            }

            matched += 1;
            info!(
                rule = %rule.name,
                event = %event.kind,
                webhook = %rule.webhook,
                "Trigger matched"
            );

            let job = WebhookJob {
                webhook: rule.webhook.clone(),
                envelope: WebhookEnvelope {
                    event: event.kind,
                    rule: rule.name.clone(),
                    data: event.payload.clone(),
                    timestamp: unix_millis(),
                },
            };

            if let Err(e) = self.job_tx.send(job) {
                warn!(
                    rule = %rule.name,
                    webhook = %e.0.webhook,
                    "Failed to enqueue WebhookJob, receiver dropped"
                );
            }
        }

        matched
    }
}

impl Processor<FeedEvent> for TriggerEngine {
    type Output = usize;
    type Error = Infallible;

    async fn process(&self, event: FeedEvent) -> Result<usize, Infallible> {
        Ok(self.handle(&event))
    }
}

/// Current time as Unix epoch milliseconds.
pub fn unix_millis() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}
