use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use super::NormalizeOptions;
use super::alias::ALIAS_SEPARATOR;
use super::range::is_range_shaped;
use crate::errors::QueryError;
use crate::filter::{PartialMatch, Predicate, Value};
use crate::validators::IdentifierScheme;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("integer pattern is valid"));

const NEGATION_MARKER: char = '!';

/// Escape the regex metacharacters `+ . ) ( ] [` in user input.
///
/// # Examples
///
/// ```
/// use searchnorm::sanitize_regex;
///
/// assert_eq!(sanitize_regex("a.b"), "a\\.b");
/// assert_eq!(sanitize_regex("(c++)"), "\\(c\\+\\+\\)");
/// assert_eq!(sanitize_regex("[x]"), "\\[x\\]");
/// ```
pub fn sanitize_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '+' | '.' | ')' | '(' | ']' | '[' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Coerce one raw string value into a typed predicate.
///
/// Rules are tried in order and the first match wins:
///
/// | Rule        | Example          | Result                        |
/// |-------------|------------------|-------------------------------|
/// | multi-value | `"a\|b"`         | `In(["a", "b"])`              |
/// | negation    | `"!true"`        | `NotEquals(true)`             |
/// | integer     | `"42"`           | `Equals(42)`                  |
/// | range       | `"10-20"`        | left raw for range expansion  |
/// | boolean     | `"false"`        | `Equals(false)`               |
/// | identifier  | 24 hex digits    | `Equals(Identifier)`          |
/// | fallback    | `"bob"`          | `Equals(/bob/i)`              |
///
/// A value left raw comes back as `Equals(String)`.
pub(crate) fn coerce_value(
    field: &str,
    raw: &str,
    options: &NormalizeOptions,
    scheme: &dyn IdentifierScheme,
) -> Result<Predicate, QueryError> {
    if raw.contains(ALIAS_SEPARATOR) {
        let tokens = raw
            .split(ALIAS_SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(|token| match scheme.parse(token) {
                Some(id) => Value::Identifier(id),
                None => Value::from(token),
            })
            .collect();
        trace!("{}: multi-value", field);
        return Ok(Predicate::In(tokens));
    }

    if raw.contains(NEGATION_MARKER) {
        let literal = raw.replacen(NEGATION_MARKER, "", 1);
        let parsed: serde_json::Value =
            serde_json::from_str(&literal).map_err(|source| QueryError::MalformedNegation {
                field: field.to_string(),
                value: raw.to_string(),
                source,
            })?;
        trace!("{}: negation", field);
        return Ok(Predicate::NotEquals(Value::from_json(parsed)));
    }

    if INTEGER.is_match(raw) {
        trace!("{}: integer", field);
        // Digit strings past i64 degrade to a float rather than failing.
        let value = match raw.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(raw.parse::<f64>().unwrap_or(f64::INFINITY)),
        };
        return Ok(Predicate::Equals(value));
    }

    if is_range_shaped(raw) {
        trace!("{}: deferred to range expansion", field);
        return Ok(Predicate::eq(raw));
    }

    match raw {
        "true" => return Ok(Predicate::eq(true)),
        "false" => return Ok(Predicate::eq(false)),
        _ => {}
    }

    if let Some(id) = scheme.parse(raw) {
        trace!("{}: identifier", field);
        return Ok(Predicate::Equals(Value::Identifier(id)));
    }

    if options.no_regex {
        return Ok(Predicate::eq(raw));
    }

    let pattern = sanitize_regex(raw);
    let matcher = if options.match_from_start {
        PartialMatch::anchored(pattern)
    } else {
        PartialMatch::new(pattern)
    };
    trace!("{}: partial match {}", field, matcher);
    Ok(Predicate::Equals(Value::Pattern(matcher)))
}
