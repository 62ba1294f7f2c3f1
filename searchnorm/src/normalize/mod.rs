//! # Search parameter normalization
//!
//! Turns flat, string-valued search parameters into a [`Filter`]:
//!
//! 1. field aliases (`"name|title"`) are expanded ([`expand_field_aliases`]),
//! 2. every raw string is coerced into a typed predicate,
//! 3. range-shaped values (`"10-20,30-40"`) are expanded, possibly into a
//!    disjunction of rows.
//!
//! ```
//! use searchnorm::{Conditions, NormalizeOptions, Predicate, normalize_search};
//!
//! let params = Conditions::from_params([("status", "true"), ("age", "18-25")]);
//! let filter = normalize_search(&params, NormalizeOptions::default()).unwrap();
//!
//! assert_eq!(filter.conditions.get("status"), Some(&Predicate::eq(true)));
//! assert_eq!(filter.conditions.get("age"), Some(&Predicate::range(18, 25)));
//! ```

pub mod alias;
pub mod coerce;
pub mod range;

pub use alias::expand_field_aliases;
pub use coerce::sanitize_regex;
pub use range::{is_range_shaped, parse_ranges};

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::QueryResult;
use crate::filter::{Conditions, Filter, Predicate};
use crate::validators::{IdentifierScheme, ObjectIdScheme};

/// Caller switches for the fallback coercion rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Keep unmatched strings as plain equality instead of partial-match patterns.
    #[serde(alias = "noRegex")]
    pub no_regex: bool,
    /// Anchor partial-match patterns to the start of the value.
    #[serde(alias = "matchFromStart")]
    pub match_from_start: bool,
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_no_regex(mut self, no_regex: bool) -> Self {
        self.no_regex = no_regex;
        self
    }

    #[inline]
    pub fn with_match_from_start(mut self, match_from_start: bool) -> Self {
        self.match_from_start = match_from_start;
        self
    }
}

/// Normalizer bound to a set of options and an identifier scheme.
///
/// Holds no per-call state; share it freely across threads.
#[derive(Debug, Clone)]
pub struct SearchNormalizer {
    options: NormalizeOptions,
    scheme: Arc<dyn IdentifierScheme>,
}

impl Default for SearchNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchNormalizer {
    pub fn new() -> Self {
        Self {
            options: NormalizeOptions::default(),
            scheme: Arc::new(ObjectIdScheme),
        }
    }

    #[inline]
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Recognize identifiers with `scheme` instead of [`ObjectIdScheme`].
    ///
    /// Range-shaped values are claimed before identifiers, so a scheme whose
    /// identifiers can contain `digits-digits` (hyphenated UUIDs, see
    /// [`UuidScheme`](crate::UuidScheme)) only sees the values that escape that check.
    #[inline]
    pub fn with_identifier_scheme(mut self, scheme: impl IdentifierScheme + 'static) -> Self {
        self.scheme = Arc::new(scheme);
        self
    }

    #[inline]
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `params` into a filter. The input is left untouched.
    ///
    /// Only values that are still raw strings are coerced, so feeding an
    /// already-normalized flat filter back in returns it unchanged.
    pub fn normalize(&self, params: &Conditions) -> QueryResult<Filter> {
        let mut working = params.clone();
        expand_field_aliases(&mut working);

        for field in working.field_names() {
            let Some(raw) = working.get(&field).and_then(Predicate::as_raw_str) else {
                continue;
            };
            let predicate = coerce::coerce_value(&field, raw, &self.options, self.scheme.as_ref())?;
            working.insert(field, predicate);
        }

        let filter = range::expand_ranges(working);
        debug!(
            "normalized {} parameters into {} fields and {} branches",
            params.len(),
            filter.conditions.len(),
            filter.branches().len()
        );
        Ok(filter)
    }
}

/// Normalize search parameters with the default object-id scheme.
///
/// Fails with [`QueryError::MalformedNegation`](crate::QueryError::MalformedNegation)
/// when a `!`-prefixed value is not a JSON literal.
pub fn normalize_search(params: &Conditions, options: NormalizeOptions) -> QueryResult<Filter> {
    SearchNormalizer::new().with_options(options).normalize(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Identifier, PartialMatch, Value};
    use crate::validators::UuidScheme;

    #[test]
    fn aliases_expand_before_coercion() {
        let params = Conditions::from_params([("min|max", "5")]);
        let filter = normalize_search(&params, NormalizeOptions::default()).unwrap();
        assert_eq!(filter.conditions.get("min"), Some(&Predicate::eq(5)));
        assert_eq!(filter.conditions.get("max"), Some(&Predicate::eq(5)));
        assert!(!filter.conditions.contains_field("min|max"));
    }

    #[test]
    fn caller_params_are_not_mutated() {
        let params = Conditions::from_params([("a|b", "x"), ("age", "1-2,3-4")]);
        let before = params.clone();
        normalize_search(&params, NormalizeOptions::default()).unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn non_string_values_pass_through() {
        let params = Conditions::from_params([("flag", Value::Bool(true)), ("count", Value::Integer(3))]);
        let filter = normalize_search(&params, NormalizeOptions::default()).unwrap();
        assert_eq!(filter, Filter::from_conditions(params));
    }

    #[test]
    fn normalization_is_idempotent_on_flat_filters() {
        let params = Conditions::from_params([
            ("name", "bob"),
            ("age", "18-25"),
            ("tags", "a|b"),
            ("active", "false"),
            ("status", "!\"gone\""),
        ]);
        let once = normalize_search(&params, NormalizeOptions::default()).unwrap();
        let twice = normalize_search(&once.conditions, NormalizeOptions::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn options_deserialize_with_camel_case_aliases() {
        let options: NormalizeOptions = serde_json::from_str(r#"{"noRegex": true}"#).unwrap();
        assert_eq!(options, NormalizeOptions::new().with_no_regex(true));
    }

    #[test]
    fn match_from_start_anchors_fallback_patterns() {
        let params = Conditions::from_params([("name", "bo.b")]);
        let filter =
            normalize_search(&params, NormalizeOptions::new().with_match_from_start(true)).unwrap();
        assert_eq!(
            filter.conditions.get("name"),
            Some(&Predicate::Equals(Value::Pattern(PartialMatch::anchored("bo\\.b"))))
        );
    }

    #[test]
    fn custom_identifier_scheme_is_used() {
        let normalizer = SearchNormalizer::new().with_identifier_scheme(UuidScheme);
        let filter = normalizer
            .normalize(&Conditions::from_params([("owner", "550E8400E29B41D4A716446655440000")]))
            .unwrap();
        assert_eq!(
            filter.conditions.get("owner"),
            Some(&Predicate::Equals(Value::Identifier(Identifier::uuid(
                "550e8400-e29b-41d4-a716-446655440000"
            ))))
        );
    }

    #[test]
    fn range_check_claims_hyphenated_uuids_first() {
        let normalizer = SearchNormalizer::new().with_identifier_scheme(UuidScheme);
        let filter = normalizer
            .normalize(&Conditions::from_params([("owner", "550e8400-e29b-41d4-a716-446655440000")]))
            .unwrap();
        assert_eq!(filter.conditions.get("owner"), Some(&Predicate::range(716, 446_655_440_000)));
    }

    #[test]
    fn malformed_negation_propagates() {
        let params = Conditions::from_params([("ok", "1"), ("bad", "!oops")]);
        let err = normalize_search(&params, NormalizeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }
}
