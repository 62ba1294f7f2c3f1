//! Combining filters and documents.

use log::debug;

use crate::filter::{Conditions, Document, Filter, Value};
use crate::path::{FieldPath, pick};
use crate::text::text_search_filter;
use crate::validators::{IdentifierScheme, ObjectIdScheme};

/// Attach a free-text search to `filter` in place.
///
/// Without an existing disjunction the text disjunction is attached as is.
/// Otherwise the disjunction becomes the product of both: for each text
/// branch, every existing branch is copied and overlaid with it. A query with
/// no words, or an empty `fields`, leaves `filter` unchanged.
pub fn add_text_search_to_query<S: AsRef<str>>(filter: &mut Filter, q: &str, fields: &[S]) {
    let Some(text_branches) = text_search_filter(q, fields).any else {
        return;
    };

    let branches: Vec<Conditions> = match filter.any.take() {
        Some(existing) => text_branches
            .iter()
            .flat_map(|text| {
                existing.iter().map(move |branch| {
                    let mut merged = branch.clone();
                    merged.extend_from(text);
                    merged
                })
            })
            .collect(),
        None => text_branches,
    };
    debug!("attached text search, filter now has {} branches", branches.len());
    filter.any = Some(branches);
}

/// Deep-merge `source` over `object`, keeping only the values at `fields`.
///
/// Identifiers are recognized with [`ObjectIdScheme`].
///
/// ```
/// use searchnorm::{FieldPath, Value, merge_objects_by_fields};
/// use serde_json::json;
///
/// let merged = merge_objects_by_fields(
///     &FieldPath::parse_list(&["a", "b"]),
///     &Value::from_json(json!({"a": 1, "c": 9})),
///     &Value::from_json(json!({"b": 2, "c": 8})),
/// );
/// assert_eq!(merged.to_json(), json!({"a": 1, "b": 2}));
/// ```
pub fn merge_objects_by_fields(fields: &[FieldPath], object: &Value, source: &Value) -> Value {
    merge_objects_by_fields_with(fields, object, source, &ObjectIdScheme)
}

/// [`merge_objects_by_fields`] with a caller-supplied identifier scheme.
///
/// If either side is a scalar or an array, no merge happens: `source` is
/// returned when it is object-like, else `object` when it is, else an empty
/// document. Nested documents of `object` (other than identifiers and dates)
/// are merged recursively with the same-named value of `source` over the union
/// of their keys. Finally both sides are restricted to `fields`, falsy
/// top-level values are dropped, and `source` is merged over `object`.
pub fn merge_objects_by_fields_with(
    fields: &[FieldPath],
    object: &Value,
    source: &Value,
    scheme: &dyn IdentifierScheme,
) -> Value {
    let both_objects = object.is_object_like() && source.is_object_like();
    let any_array = matches!(object, Value::Array(_)) || matches!(source, Value::Array(_));
    if !both_objects || any_array {
        return if source.is_object_like() {
            source.clone()
        } else if object.is_object_like() {
            object.clone()
        } else {
            Value::Object(Document::new())
        };
    }

    let from = object.as_object().cloned().unwrap_or_default();
    let mut to = source.as_object().cloned().unwrap_or_default();

    for (key, value) in &from {
        if !is_mergeable(value, scheme) {
            continue;
        }
        let target = to.get(key).cloned().unwrap_or(Value::Null);
        let mut nested = key_paths(value);
        nested.extend(key_paths(&target));
        to.insert(key.clone(), merge_objects_by_fields_with(&nested, value, &target, scheme));
    }

    let mut merged = truthy(pick(&from, fields));
    merge_documents(&mut merged, truthy(pick(&to, fields)), scheme);
    Value::Object(merged)
}

fn is_mergeable(value: &Value, scheme: &dyn IdentifierScheme) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_)) && !scheme.is_identifier(value)
}

/// Own keys of a container as single-segment paths.
fn key_paths(value: &Value) -> Vec<FieldPath> {
    match value {
        Value::Object(doc) => doc.keys().map(|key| FieldPath::single(key.as_str())).collect(),
        Value::Array(items) => (0..items.len()).map(|index| FieldPath::single(index.to_string())).collect(),
        _ => Vec::new(),
    }
}

fn truthy(mut document: Document) -> Document {
    document.retain(|_, value| value.is_truthy());
    document
}

fn merge_documents(target: &mut Document, source: Document, scheme: &dyn IdentifierScheme) {
    for (key, incoming) in source {
        match target.get_mut(&key) {
            Some(slot) => merge_value(slot, incoming, scheme),
            None => {
                target.insert(key, incoming);
            }
        }
    }
}

fn merge_value(slot: &mut Value, incoming: Value, scheme: &dyn IdentifierScheme) {
    if scheme.is_identifier(slot) || scheme.is_identifier(&incoming) {
        *slot = incoming;
        return;
    }
    match (slot, incoming) {
        (Value::Object(target), Value::Object(source)) => merge_documents(target, source, scheme),
        (Value::Array(target), Value::Array(source)) => {
            for (index, item) in source.into_iter().enumerate() {
                if index < target.len() {
                    merge_value(&mut target[index], item, scheme);
                } else {
                    target.push(item);
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FieldPredicate, Identifier, Predicate};
    use serde_json::json;

    fn merge(fields: &[&str], object: serde_json::Value, source: serde_json::Value) -> serde_json::Value {
        merge_objects_by_fields(
            &FieldPath::parse_list(fields),
            &Value::from_json(object),
            &Value::from_json(source),
        )
        .to_json()
    }

    #[test]
    fn text_search_becomes_the_disjunction_when_none_exists() {
        let mut filter = Filter::from_conditions(Conditions::new().with("status", Predicate::eq(true)));
        add_text_search_to_query(&mut filter, "red", &["title", "desc"]);
        assert_eq!(filter.conditions.get("status"), Some(&Predicate::eq(true)));
        assert_eq!(filter.branches().len(), 2);
    }

    #[test]
    fn text_search_without_fields_leaves_filter_unchanged() {
        let mut filter = Filter::disjunction([
            Conditions::new().with("age", Predicate::range(1, 2)),
            Conditions::new().with("age", Predicate::range(3, 4)),
        ]);
        let before = filter.clone();
        let fields: [&str; 0] = [];
        add_text_search_to_query(&mut filter, "red car", &fields);
        assert_eq!(filter, before);
    }

    #[test]
    fn text_search_multiplies_existing_branches() {
        let mut filter = Filter::disjunction([
            Conditions::new().with("age", Predicate::range(1, 2)),
            Conditions::new().with("age", Predicate::range(3, 4)),
        ]);
        add_text_search_to_query(&mut filter, "red car", &["title", "desc"]);

        let rows: Vec<_> = filter
            .branches()
            .iter()
            .map(|branch| (branch.get("age").cloned(), branch.all()[0].field.clone()))
            .collect();
        assert_eq!(
            rows,
            [
                (Some(Predicate::range(1, 2)), "title".to_string()),
                (Some(Predicate::range(3, 4)), "title".to_string()),
                (Some(Predicate::range(1, 2)), "desc".to_string()),
                (Some(Predicate::range(3, 4)), "desc".to_string()),
            ]
        );
        assert_eq!(
            filter.branches()[0].all(),
            [
                FieldPredicate::new("title", Predicate::matches("red")),
                FieldPredicate::new("title", Predicate::matches("car")),
            ]
        );
    }

    #[test]
    fn wordless_query_leaves_filter_unchanged() {
        let mut filter = Filter::disjunction([Conditions::new().with("a", Predicate::eq(1))]);
        let before = filter.clone();
        add_text_search_to_query(&mut filter, "  !! ", &["title"]);
        assert_eq!(filter, before);
    }

    #[test]
    fn keeps_only_allowed_fields() {
        assert_eq!(
            merge(&["a", "b"], json!({"a": 1, "c": 9}), json!({"b": 2, "c": 8})),
            json!({"a": 1, "b": 2})
        );
    }

    #[test]
    fn source_wins_at_nested_leaves() {
        assert_eq!(
            merge(&["a"], json!({"a": {"x": 1, "y": 2}}), json!({"a": {"y": 3}})),
            json!({"a": {"x": 1, "y": 3}})
        );
    }

    #[test]
    fn deep_paths_restrict_nested_keys() {
        assert_eq!(
            merge(
                &["meta.title"],
                json!({"meta": {"title": "a", "secret": "s"}}),
                json!({"meta": {"title": "b"}})
            ),
            json!({"meta": {"title": "b"}})
        );
    }

    #[test]
    fn falsy_values_are_dropped() {
        assert_eq!(
            merge(&["a", "b", "c", "d"], json!({"a": 0, "b": "", "c": "keep"}), json!({"d": null, "c": false})),
            json!({"c": "keep"})
        );
    }

    #[test]
    fn arrays_merge_index_wise() {
        assert_eq!(
            merge(&["list"], json!({"list": [1, 2, 3]}), json!({"list": [9]})),
            json!({"list": [9, 2, 3]})
        );
    }

    #[test]
    fn identifiers_are_replaced_not_merged() {
        let old = "5f1d7a2b9c3e4f5a6b7c8d9e";
        let new = "6a1d7a2b9c3e4f5a6b7c8d9f";
        let merged = merge_objects_by_fields(
            &FieldPath::parse_list(&["owner"]),
            &Value::from_json(json!({"owner": {"$oid": old}})),
            &Value::from_json(json!({"owner": {"$oid": new}})),
        );
        assert_eq!(
            merged.as_object().and_then(|doc| doc.get("owner")),
            Some(&Value::Identifier(Identifier::object_id(new)))
        );
    }

    #[test]
    fn non_objects_fall_back_to_whichever_side_is_object_like() {
        let fields = FieldPath::parse_list(&["a"]);
        let doc = Value::from_json(json!({"a": 1}));
        let list = Value::from_json(json!([1]));

        assert_eq!(
            merge_objects_by_fields(&fields, &Value::Integer(1), &Value::from("x")),
            Value::Object(Document::new())
        );
        assert_eq!(merge_objects_by_fields(&fields, &doc, &Value::Integer(5)), doc);
        assert_eq!(merge_objects_by_fields(&fields, &doc, &list), list);
    }
}
