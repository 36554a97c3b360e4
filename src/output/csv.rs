//! Delimited-text rendering
//!
//! One header row plus one row per record, CRLF-separated. The field list
//! is fixed before the first row is written: explicit `fields`, else the
//! first record's key order under `auto_fields`, else positional
//! `Column 1..N` sized to the first record. Every record is rendered
//! against that fixed list: missing keys come out empty, extra keys are
//! dropped, long rows are truncated, short rows are padded.
//!
//! Cells are JSON-encoded with embedded `\"` rewritten as doubled quotes,
//! so strings are quoted with standard delimited-text escaping and numbers
//! stay bare.

use crate::config::EffectiveConfig;
use crate::output::SerializationError;
use crate::suite::Record;
use serde_json::Value;

const ROW_DELIMITER: &str = "\r\n";

/// The fixed column layout for one rendering
enum FieldList {
    /// Columns identified by record keys
    Named(Vec<String>),

    /// Columns identified by position only
    Positional(usize),
}

impl FieldList {
    fn len(&self) -> usize {
        match self {
            Self::Named(names) => names.len(),
            Self::Positional(count) => *count,
        }
    }
}

pub(crate) fn render(
    records: &[Record],
    config: &EffectiveConfig,
) -> Result<Vec<u8>, SerializationError> {
    let fields = derive_fields(records, config);

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header_row(&fields));
    for record in records {
        rows.push(record_row(record, &fields));
    }

    Ok(rows.join(ROW_DELIMITER).into_bytes())
}

fn derive_fields(records: &[Record], config: &EffectiveConfig) -> FieldList {
    if let Some(fields) = &config.fields {
        return FieldList::Named(fields.clone());
    }

    let first = records.first();

    if config.auto_fields {
        if let Some(Value::Object(map)) = first {
            return FieldList::Named(map.keys().cloned().collect());
        }
    }

    let count = match first {
        Some(Value::Array(items)) => items.len().max(1),
        Some(Value::Object(map)) => map.len().max(1),
        _ => 1,
    };
    FieldList::Positional(count)
}

fn header_row(fields: &FieldList) -> String {
    let names: Vec<String> = match fields {
        FieldList::Named(names) => names.clone(),
        FieldList::Positional(count) => (1..=*count).map(|i| format!("Column {}", i)).collect(),
    };
    names
        .iter()
        .map(|name| cell(&Value::String(name.clone())))
        .collect::<Vec<_>>()
        .join(",")
}

fn record_row(record: &Record, fields: &FieldList) -> String {
    let values: Vec<Value> = match (fields, record) {
        (FieldList::Named(names), Value::Object(map)) => names
            .iter()
            .map(|name| map.get(name).cloned().unwrap_or_else(empty))
            .collect(),
        // arrays are always positional, whatever the columns are called
        (_, Value::Array(items)) => fit(items.clone(), fields.len()),
        (FieldList::Positional(_), Value::Object(map)) => {
            fit(map.values().cloned().collect(), fields.len())
        }
        // a scalar record fills the first column
        (_, scalar) => fit(vec![scalar.clone()], fields.len()),
    };

    values
        .iter()
        .map(cell)
        .collect::<Vec<_>>()
        .join(",")
}

fn empty() -> Value {
    Value::String(String::new())
}

/// Truncates or pads `values` to exactly `len` cells
fn fit(mut values: Vec<Value>, len: usize) -> Vec<Value> {
    values.truncate(len);
    while values.len() < len {
        values.push(empty());
    }
    values
}

fn cell(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .replace("\\\"", "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, ConfigLayer};
    use serde_json::json;

    fn config(fields: Option<Vec<&str>>, auto_fields: bool) -> EffectiveConfig {
        let layer = ConfigLayer {
            format: Some("csv".to_string()),
            fields: fields.map(|f| f.iter().map(|s| s.to_string()).collect()),
            auto_fields: Some(auto_fields),
            ..Default::default()
        };
        resolve(&layer, &ConfigLayer::new(), &ConfigLayer::new(), None, "test").unwrap()
    }

    fn render_str(records: &[Record], config: &EffectiveConfig) -> String {
        String::from_utf8(render(records, config).unwrap()).unwrap()
    }

    #[test]
    fn test_explicit_fields_with_object_records() {
        let records = vec![
            json!({"a": "x", "b": 1}),
            json!({"b": 2, "a": "y", "ignored": true}),
            json!({"a": "z"}),
        ];
        let out = render_str(&records, &config(Some(vec!["a", "b"]), false));

        assert_eq!(
            out,
            "\"a\",\"b\"\r\n\"x\",1\r\n\"y\",2\r\n\"z\",\"\""
        );
    }

    #[test]
    fn test_quote_doubling() {
        let records = vec![json!({"a": "say \"hi\""})];
        let out = render_str(&records, &config(Some(vec!["a"]), false));

        // the embedded quotes come out doubled inside one quoted field
        assert_eq!(out, "\"a\"\r\n\"say \"\"hi\"\"\"");
        for row in out.split("\r\n") {
            assert!(row.starts_with('"') && row.ends_with('"'));
        }
    }

    #[test]
    fn test_auto_fields_from_first_object() {
        let records = vec![
            json!({"title": "One", "n": 1}),
            json!({"n": 2, "title": "Two"}),
        ];
        let out = render_str(&records, &config(None, true));

        assert_eq!(
            out,
            "\"title\",\"n\"\r\n\"One\",1\r\n\"Two\",2"
        );
    }

    #[test]
    fn test_positional_columns_for_array_records() {
        let records = vec![
            json!(["a", "b", "c"]),
            json!(["d"]),
            json!(["e", "f", "g", "h"]),
        ];
        let out = render_str(&records, &config(None, false));

        assert_eq!(
            out,
            "\"Column 1\",\"Column 2\",\"Column 3\"\r\n\
             \"a\",\"b\",\"c\"\r\n\
             \"d\",\"\",\"\"\r\n\
             \"e\",\"f\",\"g\""
        );
    }

    #[test]
    fn test_scalar_records_fill_a_single_column() {
        let records = vec![json!("only"), json!(42)];
        let out = render_str(&records, &config(None, false));

        assert_eq!(out, "\"Column 1\"\r\n\"only\"\r\n42");
    }

    #[test]
    fn test_array_records_against_named_fields() {
        let records = vec![json!(["1", "2", "3"])];
        let out = render_str(&records, &config(Some(vec!["a", "b", "c", "d", "e"]), false));

        assert_eq!(
            out,
            "\"a\",\"b\",\"c\",\"d\",\"e\"\r\n\"1\",\"2\",\"3\",\"\",\"\""
        );
    }

    #[test]
    fn test_empty_result_set_is_header_only() {
        let out = render_str(&[], &config(Some(vec!["a", "b"]), false));
        assert_eq!(out, "\"a\",\"b\"");
    }
}
