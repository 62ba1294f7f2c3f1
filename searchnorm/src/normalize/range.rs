use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::{Conditions, Filter, Predicate};

static RANGE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+-[0-9]+").expect("range shape pattern is valid"));
static RANGE_BOUNDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)-([0-9]+)").expect("range bounds pattern is valid"));

const RANGE_SEPARATOR: char = ',';

/// Whether a raw value contains at least one `low-high` token.
#[inline]
pub fn is_range_shaped(raw: &str) -> bool {
    RANGE_SHAPE.is_match(raw)
}

/// Parse `"10-20,30-40,"` into `[(10, 20), (30, 40)]`.
///
/// One trailing comma is ignored. Tokens without a `low-high` pair, or whose
/// bounds overflow `i64`, are dropped.
pub fn parse_ranges(raw: &str) -> Vec<(i64, i64)> {
    let raw = raw.strip_suffix(RANGE_SEPARATOR).unwrap_or(raw);
    raw.split(RANGE_SEPARATOR)
        .filter_map(|token| {
            let captures = RANGE_BOUNDS.captures(token)?;
            let low = captures.get(1)?.as_str().parse::<i64>().ok()?;
            let high = captures.get(2)?.as_str().parse::<i64>().ok()?;
            Some((low, high))
        })
        .collect()
}

/// Disjunction accumulated while folding over ranged fields.
#[derive(Debug)]
enum Disjunction {
    None,
    Branches(Vec<Conditions>),
}

/// Expand every field still holding a range-shaped raw string.
///
/// Fields are visited in mapping order. A single range on a filter without a
/// disjunction is substituted in place. Several ranges seed a disjunction with
/// one copy of the current flat state per range. Once a disjunction exists,
/// each further ranged field multiplies the branch set by its range count.
pub(crate) fn expand_ranges(mut flat: Conditions) -> Filter {
    let mut state = Disjunction::None;

    for field in flat.field_names() {
        let Some(raw) = flat.get(&field).and_then(Predicate::as_raw_str) else {
            continue;
        };
        if !is_range_shaped(raw) {
            continue;
        }
        let ranges = parse_ranges(raw);
        state = expand_field(state, &mut flat, &field, &ranges);
    }

    match state {
        Disjunction::None => Filter::from_conditions(flat),
        Disjunction::Branches(branches) => {
            debug!("range expansion produced {} branches", branches.len());
            Filter::disjunction(branches)
        }
    }
}

fn expand_field(state: Disjunction, flat: &mut Conditions, field: &str, ranges: &[(i64, i64)]) -> Disjunction {
    match (state, ranges) {
        (state, []) => state,
        (Disjunction::None, [(min, max)]) => {
            flat.insert(field, Predicate::range(*min, *max));
            Disjunction::None
        }
        (Disjunction::None, ranges) => {
            debug!("seeding disjunction from `{}` with {} ranges", field, ranges.len());
            Disjunction::Branches(
                ranges
                    .iter()
                    .map(|&(min, max)| flat.clone().with(field, Predicate::range(min, max)))
                    .collect(),
            )
        }
        (Disjunction::Branches(branches), ranges) => Disjunction::Branches(
            ranges
                .iter()
                .flat_map(|&(min, max)| {
                    branches
                        .iter()
                        .map(move |branch| branch.clone().with(field, Predicate::range(min, max)))
                })
                .collect(),
        ),
    }
}
