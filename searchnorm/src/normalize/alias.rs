use log::debug;

use crate::filter::Conditions;

pub(crate) const ALIAS_SEPARATOR: char = '|';

/// Expand `a|b` field names into independent `a` and `b` entries holding the
/// same raw value, then drop the combined entry.
///
/// Existing fields are overwritten in place; new ones are appended in mapping
/// order. Empty segments (`|a`, `a||b`) are ignored.
pub fn expand_field_aliases(conditions: &mut Conditions) {
    for combined in conditions.field_names() {
        if !combined.contains(ALIAS_SEPARATOR) {
            continue;
        }
        let Some(predicate) = conditions.get(&combined).cloned() else {
            continue;
        };
        for field in combined.split(ALIAS_SEPARATOR).filter(|segment| !segment.is_empty()) {
            conditions.insert(field, predicate.clone());
        }
        conditions.remove(&combined);
        debug!("expanded field alias `{}`", combined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Predicate;

    #[test]
    fn expands_alias_into_independent_fields() {
        let mut conditions = Conditions::from_params([("name|title", "bob")]);
        expand_field_aliases(&mut conditions);
        assert_eq!(conditions.field_names(), ["name", "title"]);
        assert_eq!(conditions.get("name"), Some(&Predicate::eq("bob")));
        assert_eq!(conditions.get("title"), Some(&Predicate::eq("bob")));
        assert!(!conditions.contains_field("name|title"));
    }

    #[test]
    fn tolerates_empty_segments() {
        let mut conditions = Conditions::from_params([("|a||b|", "x")]);
        expand_field_aliases(&mut conditions);
        assert_eq!(conditions.field_names(), ["a", "b"]);
    }

    #[test]
    fn overwrites_existing_field_in_place() {
        let mut conditions = Conditions::from_params([("a", "first"), ("z", "keep"), ("b|a", "second")]);
        expand_field_aliases(&mut conditions);
        assert_eq!(conditions.field_names(), ["a", "z", "b"]);
        assert_eq!(conditions.get("a"), Some(&Predicate::eq("second")));
    }

    #[test]
    fn all_separators_drops_the_entry() {
        let mut conditions = Conditions::from_params([("||", "x"), ("keep", "y")]);
        expand_field_aliases(&mut conditions);
        assert_eq!(conditions.field_names(), ["keep"]);
    }
}
