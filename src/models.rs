//! Stored Records
//!
//! The three record kinds the API persists or reads:
//! - `QueryLog`: one recommendation request and its outcome
//! - `ContactMessage`: a contact form submission
//! - `CropReference`: externally seeded crop descriptions
//!
//! Inbound payloads are arbitrary JSON. Record fields are cast the way the
//! document mapper casts them (booleans become 1/0, numeric strings become
//! numbers, numbers become text); a value that cannot be cast is a `CastError`
//! and the record is never written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A payload field that cannot be cast to its record type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cast to {kind} failed for value {value} at path \"{path}\"")]
pub struct CastError {
    pub kind: &'static str,
    pub path: String,
    pub value: String,
}

impl CastError {
    fn new(kind: &'static str, path: &str, value: &Value) -> Self {
        Self {
            kind,
            path: path.to_string(),
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Query Log
// ============================================================================

/// Soil and climate readings plus the crops recommended for them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryLog {
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub nitrogen: Option<f64>,
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub phosphorus: Option<f64>,
    #[serde(rename = "K", default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,

    /// Recommendation order; a single crop in practice
    #[serde(default)]
    pub recommended: Vec<String>,
}

impl QueryLog {
    /// Build a log entry from the raw inbound payload.
    ///
    /// Keys outside the reading set are dropped, and a `recommended` key in the
    /// payload never overrides the list passed in.
    pub fn from_payload(payload: &Value, recommended: Vec<String>) -> Result<Self, CastError> {
        Ok(Self {
            nitrogen: cast_number(payload, "N")?,
            phosphorus: cast_number(payload, "P")?,
            potassium: cast_number(payload, "K")?,
            temperature: cast_number(payload, "temperature")?,
            humidity: cast_number(payload, "humidity")?,
            ph: cast_number(payload, "ph")?,
            rainfall: cast_number(payload, "rainfall")?,
            recommended,
        })
    }
}

// ============================================================================
// Contact Message
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactMessage {
    pub fn from_payload(payload: &Value) -> Result<Self, CastError> {
        Ok(Self {
            name: cast_text(payload, "name")?,
            email: cast_text(payload, "email")?,
            message: cast_text(payload, "message")?,
        })
    }
}

// ============================================================================
// Crop Reference
// ============================================================================

/// Read-only crop description; the API never writes these.
/// Store bookkeeping (`_id`, `__v`) is dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,
    #[serde(rename = "yield", default, skip_serializing_if = "Option::is_none")]
    pub yield_estimate: Option<String>,
}

impl CropReference {
    pub fn new(name: &str, soil: &str, climate: &str, yield_estimate: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            soil: Some(soil.to_string()),
            climate: Some(climate.to_string()),
            yield_estimate: Some(yield_estimate.to_string()),
        }
    }
}

// ============================================================================
// Casting (record fields)
// ============================================================================

/// Cast `key` for a numeric record field.
///
/// Missing, null and `""` are unset; booleans are 1/0; strings go through
/// `parse_js_number`. Unparsable strings, arrays and objects are cast errors.
pub fn cast_number(payload: &Value, key: &str) -> Result<Option<f64>, CastError> {
    let Some(value) = payload.get(key) else {
        return Ok(None);
    };

    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => {
            let parsed = parse_js_number(s);
            if parsed.is_nan() {
                Err(CastError::new("Number", key, value))
            } else {
                Ok(Some(parsed))
            }
        }
        Value::Array(_) | Value::Object(_) => Err(CastError::new("Number", key, value)),
    }
}

/// Cast `key` for a text record field: strings verbatim, numbers and booleans
/// in their script form. Arrays and objects are cast errors.
pub fn cast_text(payload: &Value, key: &str) -> Result<Option<String>, CastError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(n.as_f64().map(js_number_text)),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(CastError::new("string", key, other)),
    }
}

// ============================================================================
// Loose Numbers (comparisons)
// ============================================================================

/// Numeric value of `value` as a script comparison sees it: null, `""` and
/// `[]` are 0, booleans 1/0, junk is NaN (so every comparison with it fails).
pub fn loose_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_js_number(s),
        Value::Array(_) => parse_js_number(&loose_text(value)),
        Value::Object(_) => f64::NAN,
    }
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(js_number_text).unwrap_or_default(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(loose_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Script `Number(text)`: blank is 0, `0x`/`0o`/`0b` prefixes, `Infinity`,
/// anything else unparsable is NaN.
pub fn parse_js_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust also accepts "inf"/"nan" spellings; the script does not
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn js_number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
