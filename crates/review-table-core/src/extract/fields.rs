//! Per-field extraction with a single, explicit missing-value policy.
//!
//! | kind    | missing / `null` | accepted                                  | rejected                     |
//! |---------|------------------|-------------------------------------------|------------------------------|
//! | text    | `""`             | strings as-is, other scalars rendered     | never                        |
//! | float   | `0.0`            | numbers, numeric strings                  | other types, non-finite      |
//! | count   | `0`              | non-negative integers, floats (truncated) | other types, negative values |
//! | rating  | `0`              | like float, truncated into `0..=5`        | anything outside `0..=5`     |

use serde_json::{Map, Value};

use crate::extract::{ExtractError, ExtractResult};

/// Highest star rating a review may carry.
pub const MAX_REVIEW_RATING: u8 = 5;

type Object = Map<String, Value>;

/// Short JSON type name for diagnostics.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn non_numeric(field: &str, value: &Value) -> ExtractError {
    ExtractError::NonNumeric {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(field: &str, value: &Value) -> ExtractError {
    ExtractError::OutOfRange {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Text field; missing or `null` becomes the empty string.
pub(crate) fn text(obj: &Object, key: &str) -> String {
    match present(obj, key) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Float field; missing or `null` becomes `0.0`.
///
/// `field` names the value in error messages (for example `reviews[2].rating`).
pub(crate) fn float(obj: &Object, key: &str, field: &str) -> ExtractResult<f64> {
    let Some(value) = present(obj, key) else {
        return Ok(0.0);
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| non_numeric(field, value))?;

    if !parsed.is_finite() {
        return Err(out_of_range(field, value));
    }
    Ok(parsed)
}

/// Non-negative integer field; missing or `null` becomes `0`.
pub(crate) fn count(obj: &Object, key: &str, field: &str) -> ExtractResult<u64> {
    let Some(value) = present(obj, key) else {
        return Ok(0);
    };

    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
            if n.as_i64().is_some() {
                // Representable as i64 but not u64: negative.
                return Err(out_of_range(field, value));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Ok(f.trunc() as u64),
                _ => Err(out_of_range(field, value)),
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<u64>() {
                Ok(v)
            } else if s.parse::<i64>().is_ok() {
                Err(out_of_range(field, value))
            } else {
                Err(non_numeric(field, value))
            }
        }
        _ => Err(non_numeric(field, value)),
    }
}

/// Review star rating narrowed to `u8`; values are truncated toward zero.
pub(crate) fn rating(obj: &Object, key: &str, field: &str) -> ExtractResult<u8> {
    let raw = float(obj, key, field)?.trunc();
    if !(0.0..=f64::from(MAX_REVIEW_RATING)).contains(&raw) {
        let value = present(obj, key).cloned().unwrap_or(Value::Null);
        return Err(out_of_range(field, &value));
    }
    Ok(raw as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn text_defaults_and_renders_scalars() {
        let o = obj(json!({"a": "x", "b": null, "c": 12, "d": true}));
        assert_eq!(text(&o, "a"), "x");
        assert_eq!(text(&o, "b"), "");
        assert_eq!(text(&o, "missing"), "");
        assert_eq!(text(&o, "c"), "12");
        assert_eq!(text(&o, "d"), "true");
    }

    #[test]
    fn float_accepts_numbers_and_numeric_strings() {
        let o = obj(json!({"i": 4, "f": 4.5, "s": " 3.25 ", "n": null, "bad": "bad", "arr": []}));
        assert_eq!(float(&o, "i", "i").unwrap(), 4.0);
        assert_eq!(float(&o, "f", "f").unwrap(), 4.5);
        assert_eq!(float(&o, "s", "s").unwrap(), 3.25);
        assert_eq!(float(&o, "n", "n").unwrap(), 0.0);
        assert_eq!(float(&o, "missing", "missing").unwrap(), 0.0);
        assert!(matches!(
            float(&o, "bad", "rating"),
            Err(ExtractError::NonNumeric { ref field, .. }) if field == "rating"
        ));
        assert!(matches!(float(&o, "arr", "arr"), Err(ExtractError::NonNumeric { .. })));
    }

    #[test]
    fn float_rejects_non_finite_strings() {
        let o = obj(json!({"x": "NaN", "y": "inf"}));
        assert!(matches!(float(&o, "x", "x"), Err(ExtractError::OutOfRange { .. })));
        assert!(matches!(float(&o, "y", "y"), Err(ExtractError::OutOfRange { .. })));
    }

    #[test]
    fn count_truncates_and_rejects_negatives() {
        let o = obj(json!({"u": 12, "f": 7.9, "s": "42", "neg": -1, "sneg": "-3", "frac": "4.5"}));
        assert_eq!(count(&o, "u", "u").unwrap(), 12);
        assert_eq!(count(&o, "f", "f").unwrap(), 7);
        assert_eq!(count(&o, "s", "s").unwrap(), 42);
        assert_eq!(count(&o, "missing", "missing").unwrap(), 0);
        assert!(matches!(count(&o, "neg", "neg"), Err(ExtractError::OutOfRange { .. })));
        assert!(matches!(count(&o, "sneg", "sneg"), Err(ExtractError::OutOfRange { .. })));
        assert!(matches!(count(&o, "frac", "frac"), Err(ExtractError::NonNumeric { .. })));
    }

    #[test]
    fn rating_is_bounded() {
        let o = obj(json!({"ok": 5, "frac": 4.7, "high": 6, "neg": -1, "huge": 300}));
        assert_eq!(rating(&o, "ok", "ok").unwrap(), 5);
        assert_eq!(rating(&o, "frac", "frac").unwrap(), 4);
        assert_eq!(rating(&o, "missing", "missing").unwrap(), 0);
        assert!(matches!(rating(&o, "high", "high"), Err(ExtractError::OutOfRange { .. })));
        assert!(matches!(rating(&o, "neg", "neg"), Err(ExtractError::OutOfRange { .. })));
        assert!(matches!(rating(&o, "huge", "huge"), Err(ExtractError::OutOfRange { .. })));
    }
}
