//! JSON rendering: the whole result set as one array
//!
//! Records keep the field order they were produced with; nothing is
//! reordered or sorted.

use crate::output::SerializationError;
use crate::suite::Record;

pub(crate) fn render(records: &[Record]) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(records).map_err(|e| SerializationError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_result_set() {
        assert_eq!(render(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_field_order_is_preserved() {
        let records = vec![json!({"z": 1, "a": 2}), json!("plain")];
        let rendered = String::from_utf8(render(&records).unwrap()).unwrap();
        assert_eq!(rendered, r#"[{"z":1,"a":2},"plain"]"#);
    }
}
