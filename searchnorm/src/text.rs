//! Free-text search helpers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::{Conditions, Document, FieldPredicate, Filter, PartialMatch, Predicate, Value};
use crate::normalize::sanitize_regex;
use crate::path::FieldPath;

static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("word boundary pattern is valid"));

/// Split text into letter/digit words. Runs of anything else separate words.
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_BOUNDARY.split(text).filter(|token| !token.is_empty()).collect()
}

/// Build a filter matching documents where at least one of `fields` contains
/// every word of `q`, case-insensitively.
///
/// Returns the empty filter when `q` has no words or no fields are given.
/// The empty filter matches every document, so a search over zero fields has
/// no effect rather than excluding everything.
///
/// ```
/// use searchnorm::text_search_filter;
///
/// let filter = text_search_filter("red car", &["title", "desc"]);
/// assert_eq!(filter.branches().len(), 2);
/// assert_eq!(filter.branches()[0].all().len(), 2);
///
/// assert!(text_search_filter(" -- ", &["title"]).is_empty());
/// ```
pub fn text_search_filter<S: AsRef<str>>(q: &str, fields: &[S]) -> Filter {
    let tokens = tokenize(q);
    if tokens.is_empty() || fields.is_empty() {
        return Filter::new();
    }

    Filter::disjunction(fields.iter().map(|field| {
        let field = field.as_ref();
        Conditions::new().with_all(
            tokens
                .iter()
                .map(|token| FieldPredicate::new(field, Predicate::matches(*token))),
        )
    }))
}

/// Predicate for keyword-array fields: any element partially matches `q`.
pub fn keywords_query(q: &str) -> Predicate {
    Predicate::any_of([Value::Pattern(PartialMatch::new(sanitize_regex(q)))])
}

/// Lowercased words of every string found at `fields`, in field order.
///
/// Arrays along a path are descended element-wise; a string element of such an
/// array counts even if the path continues past it. Missing paths and
/// non-string leaves contribute nothing.
pub fn extract_keywords<S: AsRef<str>>(document: &Document, fields: &[S]) -> Vec<String> {
    let mut keywords = Vec::new();
    for field in fields {
        let path = FieldPath::parse(field.as_ref());
        let Some((first, rest)) = path.segments().split_first() else {
            continue;
        };
        if let Some(value) = document.get(first) {
            collect_keywords(value, rest, &mut keywords);
        }
    }
    keywords
}

fn collect_keywords(value: &Value, rest: &[String], keywords: &mut Vec<String>) {
    match (value, rest.split_first()) {
        (Value::Array(items), _) => {
            for item in items {
                match item {
                    Value::String(_) => collect_keywords(item, &[], keywords),
                    _ => collect_keywords(item, rest, keywords),
                }
            }
        }
        (Value::Object(doc), Some((segment, rest))) => {
            if let Some(next) = doc.get(segment) {
                collect_keywords(next, rest, keywords);
            }
        }
        (Value::String(text), None) => {
            let lowered = text.to_lowercase();
            keywords.extend(tokenize(&lowered).into_iter().map(str::to_string));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_document;
    use serde_json::json;

    #[test]
    fn tokenize_is_unicode_aware() {
        assert_eq!(tokenize("Café, naïve--42!"), ["Café", "naïve", "42"]);
        assert_eq!(tokenize("Привет мир"), ["Привет", "мир"]);
        assert!(tokenize("  ... ").is_empty());
    }

    #[test]
    fn builds_one_conjunction_per_field() {
        let filter = text_search_filter("red car", &["title", "desc"]);
        assert_eq!(
            filter.to_json(),
            json!({
                "$or": [
                    { "$and": [
                        { "title": { "$regex": "red", "$options": "i" } },
                        { "title": { "$regex": "car", "$options": "i" } }
                    ] },
                    { "$and": [
                        { "desc": { "$regex": "red", "$options": "i" } },
                        { "desc": { "$regex": "car", "$options": "i" } }
                    ] }
                ]
            })
        );
    }

    #[test]
    fn no_fields_yields_empty_filter() {
        let fields: [&str; 0] = [];
        assert!(text_search_filter("red", &fields).is_empty());
    }

    #[test]
    fn keywords_query_escapes_the_term() {
        assert_eq!(
            keywords_query("c++").to_json(),
            json!({ "$in": [{ "$regex": "c\\+\\+", "$options": "i" }] })
        );
    }

    #[test]
    fn extract_keywords_walks_paths_and_arrays() {
        let doc = parse_document(
            r#"{
                "title": "Red Car",
                "tags": [{"name": "Fast-Cars"}, {"name": null}, "loose"],
                "count": 3
            }"#,
        )
        .unwrap();
        assert_eq!(
            extract_keywords(&doc, &["title", "tags.name", "count", "missing"]),
            ["red", "car", "fast", "cars", "loose"]
        );
    }
}
