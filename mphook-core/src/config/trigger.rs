//! Trigger rule configuration.

use mphook_sdk::objects::EventKind;
use serde_json::Value;

/// Comparison operator of a trigger rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `contains`
    Contains,
    /// `exists`
    Exists,
    /// Anything else. A rule with an unrecognized operator never matches.
    Unrecognized(String),
}

impl Operator {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Operator::Unrecognized(_))
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            "==" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "contains" => Operator::Contains,
            "exists" => Operator::Exists,
            other => Operator::Unrecognized(other.to_string()),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Contains => "contains",
            Operator::Exists => "exists",
            Operator::Unrecognized(op) => op,
        };
        f.write_str(s)
    }
}

/// A user-configured predicate over one event kind that fires a named webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRule {
    /// Used in logs and in the dispatch envelope.
    pub name: String,
    /// Only events of this kind are evaluated.
    pub event: EventKind,
    /// Dot-separated path into the event payload. Empty means the whole payload.
    pub field: String,
    pub operator: Operator,
    /// Comparison target. Not needed for `exists`.
    pub value: Option<Value>,
    /// Name of the webhook to fire on match.
    pub webhook: String,
}
