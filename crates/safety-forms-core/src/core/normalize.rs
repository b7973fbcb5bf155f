// crates/safety-forms-core/src/core/normalize.rs
// ============================================================================
// Module: Row Aggregate Normalizer
// Description: Uniform `items` arrays for joined master/items rows.
// Purpose: Hide how a store backend represents its aggregate column.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! Filtered reads aggregate each master's children into an `items` column.
//! Depending on the backend that column arrives as JSON text, as an already
//! decoded array, or as NULL. [`normalize_rows`] rewrites every row so
//! `items` is always a JSON array. A malformed aggregate is logged and
//! replaced with an empty array; it never fails the read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A master row read back as a JSON object.
pub type FormRow = Map<String, Value>;

/// Name of the aggregated child-list column.
pub const ITEMS_FIELD: &str = "items";

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes the `items` column of every row.
#[must_use]
pub fn normalize_rows(rows: Vec<FormRow>) -> Vec<FormRow> {
    rows.into_iter().map(normalize_row).collect()
}

/// Normalizes the `items` column of a single row. A missing column is
/// treated as NULL.
#[must_use]
pub fn normalize_row(mut row: FormRow) -> FormRow {
    let raw = row.remove(ITEMS_FIELD).unwrap_or(Value::Null);
    row.insert(ITEMS_FIELD.to_string(), normalize_items(raw));
    row
}

/// Converts a raw aggregate value into a child list.
///
/// NULL becomes `[]`; text is parsed and must decode to an array (or
/// `null`, read as `[]`); anything already decoded is returned unchanged.
#[must_use]
pub fn normalize_items(raw: Value) -> Value {
    match raw {
        Value::Null => Value::Array(Vec::new()),
        Value::String(text) => parse_items(&text),
        structured => structured,
    }
}

/// Parses serialized aggregate text, falling back to an empty list.
fn parse_items(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Value::Array(items),
        Ok(Value::Null) => Value::Array(Vec::new()),
        Ok(other) => {
            tracing::error!(
                found = json_type(&other),
                "items aggregate did not decode to an array; using []"
            );
            Value::Array(Vec::new())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to parse items aggregate; using []");
            Value::Array(Vec::new())
        }
    }
}

/// Returns a JSON type label for log fields.
const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::Value;
    use serde_json::json;

    use super::FormRow;
    use super::normalize_items;
    use super::normalize_row;
    use super::normalize_rows;

    fn row(items: Value) -> FormRow {
        let Value::Object(map) = json!({"id": 1, "empresa": "Acme", "items": items}) else {
            unreachable!("literal is an object")
        };
        map
    }

    #[test]
    fn null_becomes_empty_list() {
        assert_eq!(normalize_items(Value::Null), json!([]));
    }

    #[test]
    fn serialized_text_is_parsed() {
        let raw = Value::String(r#"[{"elemento":"Gasa","mes":"Enero","estado":"ok"}]"#.into());
        assert_eq!(
            normalize_items(raw),
            json!([{"elemento": "Gasa", "mes": "Enero", "estado": "ok"}])
        );
    }

    #[test]
    fn malformed_text_becomes_empty_list() {
        assert_eq!(normalize_items(Value::String("[{\"valor\":".into())), json!([]));
        assert_eq!(normalize_items(Value::String("42".into())), json!([]));
        assert_eq!(normalize_items(Value::String("null".into())), json!([]));
    }

    #[test]
    fn structured_input_is_idempotent() {
        let items = json!([{"nombre_campo": "lugar", "valor": "bodega"}]);
        let once = normalize_items(items.clone());
        assert_eq!(once, items);
        assert_eq!(normalize_items(once), items);
        assert_eq!(normalize_items(json!([])), json!([]));
    }

    #[test]
    fn decoded_non_array_values_pass_through() {
        assert_eq!(normalize_items(json!({"valor": 1})), json!({"valor": 1}));
        assert_eq!(normalize_items(json!(7)), json!(7));
        assert_eq!(normalize_items(Value::String("{\"valor\":1}".into())), json!([]));
    }

    #[test]
    fn rows_keep_other_columns() {
        let rows = normalize_rows(vec![row(Value::Null), row(Value::String("[]".into()))]);
        assert_eq!(rows.len(), 2);
        for normalized in rows {
            assert_eq!(normalized.get("empresa"), Some(&json!("Acme")));
            assert_eq!(normalized.get("items"), Some(&json!([])));
        }
    }

    #[test]
    fn missing_column_is_treated_as_null() {
        let mut without = row(Value::Null);
        without.remove("items");
        assert_eq!(normalize_row(without).get("items"), Some(&json!([])));
    }
}
