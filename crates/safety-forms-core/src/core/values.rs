// crates/safety-forms-core/src/core/values.rs
// ============================================================================
// Module: Safety Forms Field Values
// Description: Column values bound into master and item inserts.
// Purpose: Carry typed parameters from submissions to any store backend.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`FieldValue`] is the backend-neutral parameter type. Submissions convert
//! into ordered vectors of field values that line up with the columns of a
//! [`crate::FormSchema`]. The lenient deserializers accept what browser forms
//! actually send: numbers where text is expected, numeric strings where
//! counters are expected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Field Value
// ============================================================================

/// Parameter bound to a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL NULL.
    Null,
    /// Text value.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
}

impl FieldValue {
    /// Returns true when the value counts as absent for required-field checks.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::Integer(_) | Self::Real(_) => false,
        }
    }

    /// Converts the value into JSON for read-back rows.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(text) => Value::String(text.clone()),
            Self::Integer(value) => Value::Number(Number::from(*value)),
            Self::Real(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

// ============================================================================
// SECTION: Lenient Deserializers
// ============================================================================

/// Deserializes an optional text field, stringifying JSON scalars.
///
/// # Errors
///
/// Returns a deserializer error when the input is not valid JSON.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Deserializes a counter that may arrive as a number, numeric string, or null.
///
/// # Errors
///
/// Returns a deserializer error when the value is not an integer.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => number
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("counter must be an integer: {number}"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(0),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("counter must be an integer: {text}"))),
        Some(other) => Err(D::Error::custom(format!("counter must be an integer: {other}"))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde::Deserialize;
    use serde_json::json;

    use super::FieldValue;
    use super::lenient_count;
    use super::lenient_text;

    #[derive(Debug, Deserialize)]
    struct Lenient {
        #[serde(default, deserialize_with = "lenient_text")]
        text: Option<String>,
        #[serde(default, deserialize_with = "lenient_count")]
        count: i64,
    }

    #[test]
    fn text_accepts_scalars() {
        let decoded: Lenient = serde_json::from_value(json!({"text": 12345678})).unwrap();
        assert_eq!(decoded.text.as_deref(), Some("12345678"));
        assert_eq!(decoded.count, 0);
        let decoded: Lenient = serde_json::from_value(json!({"text": null, "count": "4"})).unwrap();
        assert_eq!(decoded.text, None);
        assert_eq!(decoded.count, 4);
    }

    #[test]
    fn count_rejects_fractions_and_words() {
        assert!(serde_json::from_value::<Lenient>(json!({"count": 1.5})).is_err());
        assert!(serde_json::from_value::<Lenient>(json!({"count": "tres"})).is_err());
    }

    #[test]
    fn empty_text_counts_as_missing() {
        assert!(FieldValue::Text(String::new()).is_missing());
        assert!(FieldValue::Null.is_missing());
        assert!(!FieldValue::Text(" ".to_string()).is_missing());
        assert!(!FieldValue::Integer(0).is_missing());
    }
}
