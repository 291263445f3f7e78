//! Permissive numeric deserializers for pricing input.
//!
//! The preview screen submits raw form values. Numbers pass through, numeric
//! strings are parsed, and anything else that is present but not a number
//! (text, booleans, arrays, objects) becomes `0`. `null`, empty strings and
//! missing fields stay absent so configuration defaults still apply.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().unwrap_or(0.0)),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().parse::<f64>().unwrap_or(0.0)),
        _ => Some(0.0),
    }
}

/// `Option<f64>` field, coerced.
pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce))
}

/// `Option<u32>` count field: truncated toward zero and clamped into range.
pub fn opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce).map(|n| {
        if n.is_finite() { n.trunc().clamp(0.0, u32::MAX as f64) as u32 } else { 0 }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "opt_f64")] amount: Option<f64>,
        #[serde(default, deserialize_with = "opt_count")] count: Option<u32>,
    }

    fn parse(json: &str) -> Form { serde_json::from_str(json).unwrap() }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let f = parse(r#"{"amount": 12.5, "count": 6}"#);
        assert_eq!(f.amount, Some(12.5));
        assert_eq!(f.count, Some(6));
        let f = parse(r#"{"amount": " 99.90 ", "count": "3"}"#);
        assert_eq!(f.amount, Some(99.9));
        assert_eq!(f.count, Some(3));
    }

    #[test]
    fn test_garbage_coerces_to_zero() {
        let f = parse(r#"{"amount": "abc", "count": true}"#);
        assert_eq!(f.amount, Some(0.0));
        assert_eq!(f.count, Some(0));
        let f = parse(r#"{"amount": [1, 2], "count": {"n": 1}}"#);
        assert_eq!(f.amount, Some(0.0));
        assert_eq!(f.count, Some(0));
    }

    #[test]
    fn test_absent_values() {
        let f = parse("{}");
        assert_eq!(f.amount, None);
        assert_eq!(f.count, None);
        let f = parse(r#"{"amount": null, "count": ""}"#);
        assert_eq!(f.amount, None);
        assert_eq!(f.count, None);
    }

    #[test]
    fn test_counts_truncate_and_clamp() {
        assert_eq!(parse(r#"{"count": 4.9}"#).count, Some(4));
        assert_eq!(parse(r#"{"count": -3}"#).count, Some(0));
        assert_eq!(parse(r#"{"count": 1e20}"#).count, Some(u32::MAX));
    }
}
