//! # Filter expressions
//!
//! The store-agnostic representation of a search condition.
//!
//! A [`Filter`] holds a flat [`Conditions`] row (an implicit conjunction of
//! field predicates) and optionally a disjunction of further rows (`$or`).
//! Each row may also carry an explicit conjunction list (`$and`), which is how
//! free-text search expresses "every term must match this field".
//!
//! ```
//! use searchnorm::filter::{Conditions, Filter, Predicate};
//!
//! let filter = Filter::from_conditions(
//!     Conditions::new()
//!         .with("status", Predicate::eq(true))
//!         .with("age", Predicate::range(18, 25)),
//! );
//!
//! assert_eq!(
//!     filter.to_json().to_string(),
//!     r#"{"status":true,"age":{"$gte":18,"$lte":25}}"#
//! );
//! ```

mod value;

pub use value::*;

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue, json};
use url::form_urlencoded;

const AND_KEY: &str = "$and";
const OR_KEY: &str = "$or";

/// A predicate applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Literal match. A bare raw value is an equality on that value.
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    /// Closed interval, both bounds inclusive.
    Range { min: i64, max: i64 },
}

impl Predicate {
    #[inline]
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    #[inline]
    pub fn ne(value: impl Into<Value>) -> Self {
        Self::NotEquals(value.into())
    }

    #[inline]
    pub fn any_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn range(min: i64, max: i64) -> Self {
        Self::Range { min, max }
    }

    /// Case-insensitive partial match on `pattern`.
    #[inline]
    pub fn matches(pattern: impl Into<String>) -> Self {
        Self::Equals(Value::Pattern(PartialMatch::new(pattern)))
    }

    /// The raw string of an uncoerced value, if this predicate still holds one.
    #[inline]
    pub fn as_raw_str(&self) -> Option<&str> {
        match self {
            Self::Equals(Value::String(raw)) => Some(raw),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Equals(value) => value.to_json(),
            Self::NotEquals(value) => json!({ "$ne": value.to_json() }),
            Self::In(values) => json!({ "$in": values.iter().map(Value::to_json).collect::<Vec<_>>() }),
            Self::Range { min, max } => json!({ "$gte": min, "$lte": max }),
        }
    }
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

/// A predicate bound to the field it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub predicate: Predicate,
}

impl FieldPredicate {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert(self.field.clone(), self.predicate.to_json());
        JsonValue::Object(map)
    }
}

/// One conjunctive row: field predicates in mapping order plus an explicit `$and` list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    fields: IndexMap<String, Predicate>,
    all: Vec<FieldPredicate>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build raw parameters from field/value pairs. Every value enters as an equality.
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::from_predicates(
            params
                .into_iter()
                .map(|(field, value)| (field, Predicate::Equals(value.into()))),
        )
    }

    pub fn from_predicates<K: Into<String>>(predicates: impl IntoIterator<Item = (K, Predicate)>) -> Self {
        Self {
            fields: predicates
                .into_iter()
                .map(|(field, predicate)| (field.into(), predicate))
                .collect(),
            all: Vec::new(),
        }
    }

    /// Parse an URL query string (`a=1&b=x%7Cy`) into raw string parameters.
    /// A repeated key keeps its last value.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_params(form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    /// Builder-style insert.
    #[inline]
    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.insert(field, predicate);
        self
    }

    /// Builder-style replacement of the explicit `$and` list.
    #[inline]
    pub fn with_all(mut self, all: impl IntoIterator<Item = FieldPredicate>) -> Self {
        self.all = all.into_iter().collect();
        self
    }

    /// Insert or overwrite. An existing field keeps its position.
    pub fn insert(&mut self, field: impl Into<String>, predicate: Predicate) -> Option<Predicate> {
        self.fields.insert(field.into(), predicate)
    }

    /// Remove a field, preserving the order of the rest.
    pub fn remove(&mut self, field: &str) -> Option<Predicate> {
        self.fields.shift_remove(field)
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.fields.get(field)
    }

    #[inline]
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.fields.iter().map(|(field, predicate)| (field.as_str(), predicate))
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    #[inline]
    pub fn all(&self) -> &[FieldPredicate] {
        &self.all
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.all.is_empty()
    }

    /// Overlay `other` onto this row, object-spread style: its fields overwrite
    /// same-named ones and a non-empty `$and` list replaces this row's list.
    pub fn extend_from(&mut self, other: &Conditions) {
        for (field, predicate) in &other.fields {
            self.fields.insert(field.clone(), predicate.clone());
        }
        if !other.all.is_empty() {
            self.all = other.all.clone();
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map: Map<String, JsonValue> = self
            .fields
            .iter()
            .map(|(field, predicate)| (field.clone(), predicate.to_json()))
            .collect();
        if !self.all.is_empty() {
            map.insert(
                AND_KEY.to_string(),
                JsonValue::Array(self.all.iter().map(FieldPredicate::to_json).collect()),
            );
        }
        JsonValue::Object(map)
    }
}

/// A complete filter expression: flat conditions plus an optional disjunction of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Conditions,
    pub any: Option<Vec<Conditions>>,
}

impl Filter {
    /// The empty filter. Matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conditions(conditions: Conditions) -> Self {
        Self {
            conditions,
            any: None,
        }
    }

    pub fn disjunction(branches: impl IntoIterator<Item = Conditions>) -> Self {
        Self {
            conditions: Conditions::new(),
            any: Some(branches.into_iter().collect()),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.any.is_none()
    }

    #[inline]
    pub fn is_disjunctive(&self) -> bool {
        self.any.is_some()
    }

    /// Disjunctive branches, empty when the filter carries no `$or`.
    #[inline]
    pub fn branches(&self) -> &[Conditions] {
        self.any.as_deref().unwrap_or_default()
    }

    pub fn to_json(&self) -> JsonValue {
        let mut json = self.conditions.to_json();
        if let (Some(branches), JsonValue::Object(map)) = (&self.any, &mut json) {
            map.insert(
                OR_KEY.to_string(),
                JsonValue::Array(branches.iter().map(Conditions::to_json).collect()),
            );
        }
        json
    }
}

impl From<Conditions> for Filter {
    fn from(conditions: Conditions) -> Self {
        Self::from_conditions(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_position_of_existing_field() {
        let mut conditions = Conditions::from_params([("a", "1"), ("b", "2")]);
        conditions.insert("a", Predicate::eq(3));
        conditions.insert("c", Predicate::eq(4));
        assert_eq!(conditions.field_names(), ["a", "b", "c"]);
        assert_eq!(conditions.get("a"), Some(&Predicate::eq(3)));
    }

    #[test]
    fn remove_preserves_order() {
        let mut conditions = Conditions::from_params([("a", 1), ("b", 2), ("c", 3)]);
        conditions.remove("a");
        assert_eq!(conditions.field_names(), ["b", "c"]);
    }

    #[test]
    fn extend_from_overwrites_fields_and_replaces_and_list() {
        let mut base = Conditions::new()
            .with("a", Predicate::eq(1))
            .with_all([FieldPredicate::new("x", Predicate::matches("old"))]);
        let overlay = Conditions::new()
            .with("a", Predicate::eq(2))
            .with("b", Predicate::eq(3))
            .with_all([FieldPredicate::new("y", Predicate::matches("new"))]);

        base.extend_from(&overlay);

        assert_eq!(base.get("a"), Some(&Predicate::eq(2)));
        assert_eq!(base.get("b"), Some(&Predicate::eq(3)));
        assert_eq!(base.all(), overlay.all());
    }

    #[test]
    fn from_query_string_decodes_values() {
        let conditions = Conditions::from_query_string("?name=Bob%20Smith&tags=a%7Cb&age=18-25");
        assert_eq!(conditions.get("name").and_then(Predicate::as_raw_str), Some("Bob Smith"));
        assert_eq!(conditions.get("tags").and_then(Predicate::as_raw_str), Some("a|b"));
        assert_eq!(conditions.field_names(), ["name", "tags", "age"]);
    }

    #[test]
    fn predicates_render_store_operators() {
        assert_eq!(Predicate::ne(5).to_json(), json!({ "$ne": 5 }));
        assert_eq!(Predicate::any_of(["a", "b"]).to_json(), json!({ "$in": ["a", "b"] }));
        assert_eq!(Predicate::range(1, 2).to_json(), json!({ "$gte": 1, "$lte": 2 }));
    }

    #[test]
    fn disjunctive_filter_renders_or_with_and_rows() {
        let filter = Filter::disjunction([Conditions::new().with_all([
            FieldPredicate::new("title", Predicate::matches("red")),
            FieldPredicate::new("title", Predicate::matches("car")),
        ])]);

        assert_eq!(
            filter.to_json(),
            json!({
                "$or": [{
                    "$and": [
                        { "title": { "$regex": "red", "$options": "i" } },
                        { "title": { "$regex": "car", "$options": "i" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn empty_filter_renders_empty_object() {
        assert!(Filter::new().is_empty());
        assert_eq!(Filter::new().to_json(), json!({}));
        assert!(Filter::new().branches().is_empty());
    }
}
