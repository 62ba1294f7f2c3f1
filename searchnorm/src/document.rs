//! Document shaping helpers used alongside filter construction.

use crate::filter::{Document, Value};

/// Flatten nested objects and arrays into dotted keys (`address.city`, `tags.0`).
///
/// Identifiers become their string form. Dates and patterns stay leaves. Empty
/// objects and arrays contribute no keys.
pub fn flatten_document(document: &Document) -> Document {
    let mut flat = Document::new();
    for (key, value) in document {
        flatten_value(&mut flat, key.clone(), value);
    }
    flat
}

fn flatten_value(flat: &mut Document, key: String, value: &Value) {
    match value {
        Value::Identifier(id) => {
            flat.insert(key, Value::String(id.to_string()));
        }
        Value::Object(doc) => {
            for (child, value) in doc {
                flatten_value(flat, format!("{}.{}", key, child), value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_value(flat, format!("{}.{}", key, index), value);
            }
        }
        other => {
            flat.insert(key, other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_document;

    #[test]
    fn flattens_nested_objects_and_arrays() {
        let doc = parse_document(
            r#"{
                "name": "Ann",
                "address": {"city": "Oslo", "geo": {"lat": 59.9}},
                "tags": ["a", "b"],
                "owner": {"$oid": "507f1f77bcf86cd799439011"},
                "empty": {}
            }"#,
        )
        .unwrap();

        let flat = flatten_document(&doc);

        let expected = parse_document(
            r#"{
                "name": "Ann",
                "address.city": "Oslo",
                "address.geo.lat": 59.9,
                "tags.0": "a",
                "tags.1": "b",
                "owner": "507f1f77bcf86cd799439011"
            }"#,
        )
        .unwrap();
        assert_eq!(flat, expected);
    }

    #[test]
    fn dates_stay_leaves() {
        let doc = parse_document(r#"{"created": {"$date": "2024-01-02T03:04:05Z"}}"#).unwrap();
        let flat = flatten_document(&doc);
        assert!(matches!(flat.get("created"), Some(Value::Date(_))));
    }
}
