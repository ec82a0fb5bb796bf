//! Lenient coercions for hand-edited or UI-written configuration values.
//!
//! Config files are produced by a settings UI that is not strict about JSON
//! types: numbers arrive as strings, booleans as "yes"/"on", and so on. These
//! helpers turn whatever is there into a usable value or fall back to a
//! documented default. They never fail.

use serde_json::Value;

/// Parse an integer from a JSON value and clamp it into `[lo, hi]`.
///
/// Non-numeric input yields `default`.
pub fn clamp_int(value: Option<&Value>, lo: i64, hi: i64, default: i64) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Bool(b)) => Some(i64::from(*b)),
        _ => None,
    };
    match parsed {
        Some(v) => v.clamp(lo, hi),
        None => default,
    }
}

/// Interpret a JSON value as a boolean flag.
///
/// Accepts real booleans and the usual textual spellings; anything else
/// (including `null`) yields `default`.
pub fn normalize_bool(value: Option<&Value>, default: bool) -> bool {
    let text = match value {
        None | Some(Value::Null) => return default,
        Some(Value::Bool(b)) => return *b,
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(other) => other.to_string().to_lowercase(),
    };
    match text.as_str() {
        "1" | "true" | "yes" | "y" | "on" => true,
        "0" | "false" | "no" | "n" | "off" => false,
        _ => default,
    }
}

/// Render a scalar JSON value as a trimmed string. Empty results are `None`.
pub fn value_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
