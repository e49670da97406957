//! Canonicalization of raw feed messages.
//!
//! The feed multiplexes several event families onto the top-level keys of a
//! single JSON object. Each known key becomes one [`FeedEvent`]:
//!
//! - array values are wrapped back under their key, so `blocks.0.height`
//!   still addresses the first block;
//! - any other value (object, scalar, `null`) is the payload as-is;
//! - `stats` is recognised but never routed to triggers.

use mphook_sdk::objects::EventKind;
use serde_json::{Map, Value};
use tracing::trace;

use super::types::FeedEvent;

/// Top-level feed keys the classifier understands, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKey {
    Blocks,
    Mempool,
    Txs,
    Transactions,
    Stats,
}

impl FeedKey {
    pub const ALL: [FeedKey; 5] = [
        FeedKey::Blocks,
        FeedKey::Mempool,
        FeedKey::Txs,
        FeedKey::Transactions,
        FeedKey::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKey::Blocks => "blocks",
            FeedKey::Mempool => "mempool",
            FeedKey::Txs => "txs",
            FeedKey::Transactions => "transactions",
            FeedKey::Stats => "stats",
        }
    }

    /// Event kind this key is routed as, or `None` for keys that are not
    /// routed to triggers.
    pub fn event_kind(&self) -> Option<EventKind> {
        match self {
            FeedKey::Blocks => Some(EventKind::Block),
            FeedKey::Mempool => Some(EventKind::Mempool),
            FeedKey::Txs | FeedKey::Transactions => Some(EventKind::Tx),
            FeedKey::Stats => None,
        }
    }
}

/// Classify one decoded feed message into zero or more canonical events.
pub fn classify(message: &Value) -> Vec<FeedEvent> {
    let Some(object) = message.as_object() else {
        trace!("Ignoring non-object feed message");
        return Vec::new();
    };

    FeedKey::ALL
        .iter()
        .filter_map(|key| {
            let value = object.get(key.as_str())?;
            let Some(kind) = key.event_kind() else {
                trace!(key = key.as_str(), "Skipping unrouted feed key");
                return None;
            };
            Some(FeedEvent::new(kind, canonical_payload(key.as_str(), value)))
        })
        .collect()
}

fn canonical_payload(key: &str, value: &Value) -> Value {
    match value {
        Value::Array(_) => {
            let mut wrapped = Map::with_capacity(1);
            wrapped.insert(key.to_string(), value.clone());
            Value::Object(wrapped)
        }
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_list_is_wrapped_under_its_key() {
        let events = classify(&json!({"blocks": [{"height": 100}]}));
        assert_eq!(
            events,
            vec![FeedEvent::new(EventKind::Block, json!({"blocks": [{"height": 100}]}))]
        );
    }

    #[test]
    fn test_object_value_is_used_directly() {
        let events = classify(&json!({"mempool": {"count": 42, "vsize": 1000}}));
        assert_eq!(
            events,
            vec![FeedEvent::new(EventKind::Mempool, json!({"count": 42, "vsize": 1000}))]
        );
    }

    #[test]
    fn test_scalar_and_null_values_pass_through() {
        assert_eq!(
            classify(&json!({"mempool": null})),
            vec![FeedEvent::new(EventKind::Mempool, Value::Null)]
        );
        assert_eq!(
            classify(&json!({"mempool": 5})),
            vec![FeedEvent::new(EventKind::Mempool, json!(5))]
        );
    }

    #[test]
    fn test_multiple_keys_yield_multiple_events() {
        let events = classify(&json!({
            "blocks": [{"height": 1}],
            "mempool": {"count": 3},
        }));
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Block, EventKind::Mempool]);
    }

    #[test]
    fn test_both_transaction_aliases_route_as_tx() {
        let events = classify(&json!({
            "txs": [{"txid": "a"}],
            "transactions": [{"txid": "b"}],
        }));
        assert_eq!(
            events,
            vec![
                FeedEvent::new(EventKind::Tx, json!({"txs": [{"txid": "a"}]})),
                FeedEvent::new(EventKind::Tx, json!({"transactions": [{"txid": "b"}]})),
            ]
        );
    }

    #[test]
    fn test_stats_does_not_break_siblings() {
        let events = classify(&json!({"stats": {"x": 1}, "txs": []}));
        assert_eq!(events, vec![FeedEvent::new(EventKind::Tx, json!({"txs": []}))]);
        assert!(classify(&json!({"stats": {"x": 1}})).is_empty());
    }

    #[test]
    fn test_unknown_or_non_object_messages_yield_nothing() {
        assert!(classify(&json!({"unknown": 1})).is_empty());
        assert!(classify(&json!([{"blocks": []}])).is_empty());
        assert!(classify(&json!("blocks")).is_empty());
    }
}
