//! Sort specification parsing and in-memory ordering.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::filter::{Document, Value};
use crate::path::FieldPath;

const SORT_SEPARATOR: char = ',';
const DESCENDING_PREFIX: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// `1` for ascending, `-1` for descending.
    #[inline]
    pub const fn signum(self) -> i8 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }

    /// Split one sort token into field name and direction.
    fn parse_token(token: &str) -> (&str, Self) {
        match token.strip_prefix(DESCENDING_PREFIX) {
            Some(field) => (field, SortOrder::Desc),
            None => (token, SortOrder::Asc),
        }
    }
}

/// Per-field metadata relevant to query shaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
    /// The field stores one value per locale under `<field>.<locale>`.
    #[serde(alias = "langMap", alias = "isMultiLanguage")]
    pub multi_language: bool,
}

impl FieldMeta {
    pub fn multi_language() -> Self {
        Self { multi_language: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema {
    fields: IndexMap<String, FieldMeta>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_field(mut self, name: impl Into<String>, meta: FieldMeta) -> Self {
        self.fields.insert(name.into(), meta);
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.get(name)
    }

    #[inline]
    pub fn is_multi_language(&self, name: &str) -> bool {
        self.get(name).is_some_and(|meta| meta.multi_language)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldMeta)> for FieldSchema {
    fn from_iter<T: IntoIterator<Item = (K, FieldMeta)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(name, meta)| (name.into(), meta)).collect(),
        }
    }
}

/// Ordered sort keys, primary key first.
///
/// Behaves like a mapping: a repeated field overwrites the direction of its
/// earlier entry and keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: IndexMap<String, SortOrder>,
}

impl SortSpec {
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.keys.iter().map(|(field, order)| (field.as_str(), *order))
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<SortOrder> {
        self.keys.get(field).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(String, i8)> {
        self.iter().map(|(field, order)| (field.to_string(), order.signum())).collect()
    }

    /// `{"price": -1, "name.en": 1}`
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .iter()
            .map(|(field, order)| (field.to_string(), JsonValue::from(order.signum())))
            .collect();
        JsonValue::Object(map)
    }
}

/// Parse `"-price,name"` into sort keys, rewriting multi-language fields to `<field>.<locale>`.
///
/// Empty tokens are skipped. Only one leading `-` is consumed per token.
///
/// ```
/// use searchnorm::{FieldMeta, FieldSchema, SortOrder, normalize_sort};
///
/// let schema = FieldSchema::new().with_field("name", FieldMeta::multi_language());
/// let sort = normalize_sort("-price,name", &schema, "en");
///
/// assert_eq!(
///     sort.iter().collect::<Vec<_>>(),
///     [("price", SortOrder::Desc), ("name.en", SortOrder::Asc)]
/// );
/// ```
pub fn normalize_sort(sort: &str, schema: &FieldSchema, locale: &str) -> SortSpec {
    let mut keys = IndexMap::new();
    for token in sort.split(SORT_SEPARATOR).filter(|token| !token.is_empty()) {
        let (field, order) = SortOrder::parse_token(token);
        let field = if schema.is_multi_language(field) {
            format!("{}.{}", field, locale)
        } else {
            field.to_string()
        };
        keys.insert(field, order);
    }
    SortSpec { keys }
}

/// Stable in-memory sort of documents by a `"-price,name"` sort string.
///
/// Fields may be dotted paths. Missing values sort last in ascending order and
/// first in descending order.
pub fn sort_documents(mut items: Vec<Document>, sort: &str) -> Vec<Document> {
    let keys: Vec<(FieldPath, SortOrder)> = sort
        .split(SORT_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (field, order) = SortOrder::parse_token(token);
            (FieldPath::parse(field), order)
        })
        .collect();
    if keys.is_empty() {
        return items;
    }

    items.sort_by(|a, b| {
        keys.iter()
            .map(|(path, order)| {
                let ordering = compare_optional(path.resolve(a), path.resolve(b));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    items
}

fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            as_f64(a).partial_cmp(&as_f64(b)).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Identifier(x), Value::Identifier(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => *n as f64,
        Value::Float(n) => *n,
        _ => f64::NAN,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Integer(_) | Value::Float(_) => 1,
        Value::String(_) | Value::Pattern(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Identifier(_) => 5,
        Value::Bool(_) => 6,
        Value::Date(_) => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_document;

    fn schema() -> FieldSchema {
        FieldSchema::new()
            .with_field("price", FieldMeta::default())
            .with_field("name", FieldMeta::multi_language())
    }

    #[test]
    fn parses_directions_and_rewrites_locale_fields() {
        let sort = normalize_sort("-price,name", &schema(), "en");
        assert_eq!(sort.to_pairs(), [("price".to_string(), -1), ("name.en".to_string(), 1)]);
    }

    #[test]
    fn duplicate_fields_overwrite_in_place() {
        let sort = normalize_sort("price,name,-price", &schema(), "de");
        assert_eq!(
            sort.iter().collect::<Vec<_>>(),
            [("price", SortOrder::Desc), ("name.de", SortOrder::Asc)]
        );
    }

    #[test]
    fn skips_empty_tokens_and_strips_one_dash() {
        let sort = normalize_sort(",--weird,", &FieldSchema::new(), "en");
        assert_eq!(sort.iter().collect::<Vec<_>>(), [("-weird", SortOrder::Desc)]);
        assert!(normalize_sort("", &FieldSchema::new(), "en").is_empty());
    }

    #[test]
    fn schema_accepts_original_key_names() {
        let schema: FieldSchema = serde_json::from_str(r#"{"price": {}, "name": {"langMap": true}}"#).unwrap();
        assert!(schema.is_multi_language("name"));
        assert!(!schema.is_multi_language("price"));
        assert!(!schema.is_multi_language("missing"));
    }

    #[test]
    fn to_json_renders_signed_directions() {
        let sort = normalize_sort("-price,name", &schema(), "en");
        assert_eq!(sort.to_json().to_string(), r#"{"price":-1,"name.en":1}"#);
    }

    #[test]
    fn sort_documents_orders_by_multiple_keys() {
        let items = vec![
            parse_document(r#"{"name": "b", "price": 10}"#).unwrap(),
            parse_document(r#"{"name": "a", "price": 10}"#).unwrap(),
            parse_document(r#"{"name": "c", "price": 30}"#).unwrap(),
            parse_document(r#"{"name": "d"}"#).unwrap(),
        ];

        let sorted = sort_documents(items, "-price,name");
        let names: Vec<_> = sorted
            .iter()
            .map(|doc| doc.get("name").and_then(Value::as_str).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, ["d", "c", "a", "b"]);
    }

    #[test]
    fn sort_documents_follows_nested_paths() {
        let items = vec![
            parse_document(r#"{"id": 1, "meta": {"rank": 2.5}}"#).unwrap(),
            parse_document(r#"{"id": 2, "meta": {"rank": 1}}"#).unwrap(),
        ];
        let sorted = sort_documents(items, "meta.rank");
        assert_eq!(sorted[0].get("id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn empty_sort_keeps_order() {
        let items = vec![
            parse_document(r#"{"n": 2}"#).unwrap(),
            parse_document(r#"{"n": 1}"#).unwrap(),
        ];
        assert_eq!(sort_documents(items.clone(), ""), items);
    }
}
