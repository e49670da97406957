//! Operator semantics for trigger rules.
//!
//! Comparisons are deliberately loose, since feed payloads mix numbers and
//! numeric strings:
//!
//! - A missing field and a stored `null` are both "absent". So is a `null`
//!   or missing comparison value.
//! - `==`/`!=` treat a number and a numeric string as equal when they denote
//!   the same number. A boolean compares as `1`/`0` against numbers and
//!   numeric strings. Absent equals absent.
//! - Ordering operators coerce both sides to `f64`: absent is `0`, booleans
//!   are `1`/`0`, strings are parsed (empty is `0`), anything else is NaN.
//!   NaN never compares.
//! - `contains` is a substring test on the textual forms. Strings are used
//!   verbatim, other values as compact JSON, absent as the empty string.

use serde_json::Value;

use super::field::resolve;
use crate::config::{Operator, TriggerRule};

/// Evaluate `rule` against an event payload.
pub fn evaluate(rule: &TriggerRule, payload: &Value) -> bool {
    let actual = present(resolve(payload, &rule.field));
    let target = present(rule.value.as_ref());

    match &rule.operator {
        Operator::Exists => actual.is_some(),
        Operator::Contains => match target {
            Some(target) => text_of(actual).contains(text_of(Some(target)).as_str()),
            None => false,
        },
        Operator::Eq => loose_eq(actual, target),
        Operator::Ne => !loose_eq(actual, target),
        Operator::Gt => to_number(actual) > to_number(target),
        Operator::Lt => to_number(actual) < to_number(target),
        Operator::Ge => to_number(actual) >= to_number(target),
        Operator::Le => to_number(actual) <= to_number(target),
        Operator::Unrecognized(_) => false,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Loose equality between two (already null-collapsed) values.
pub fn loose_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (None, _) | (_, None) => false,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(Value::Number(n)), Some(Value::String(s)))
        | (Some(Value::String(s)), Some(Value::Number(n))) => {
            match (n.as_f64(), parse_number(s)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Some(Value::Bool(b)), Some(other @ (Value::Number(_) | Value::String(_))))
        | (Some(other @ (Value::Number(_) | Value::String(_))), Some(Value::Bool(b))) => {
            match other {
                Value::Number(n) => n.as_f64() == Some(f64::from(u8::from(*b))),
                Value::String(s) => parse_number(s) == Some(f64::from(u8::from(*b))),
                _ => false,
            }
        }
        (Some(x), Some(y)) => x == y,
    }
}

/// Numeric coercion used by the ordering operators.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        Some(Value::String(s)) => parse_number(s).unwrap_or(f64::NAN),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}
