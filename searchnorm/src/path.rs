use std::fmt;
use std::str::FromStr;

use crate::filter::{Document, Value};

const PATH_SEPARATOR: char = '.';

/// A dotted field path (`"address.city"`) parsed once into segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// A path made of exactly one key, even if the key contains a dot.
    pub fn single(key: impl Into<String>) -> Self {
        Self {
            segments: vec![key.into()],
        }
    }

    pub fn parse_list<S: AsRef<str>>(paths: &[S]) -> Vec<Self> {
        paths.iter().map(|path| Self::parse(path.as_ref())).collect()
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve the value at this path. Numeric segments index into arrays.
    pub fn resolve<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = document.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(doc) => doc.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate objects as needed.
    /// A non-object intermediate is replaced by an object.
    pub fn assign(&self, document: &mut Document, value: Value) {
        let Some((last, parents)) = self.segments.split_last() else {
            return;
        };
        let mut current = document;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Document::new()));
            if !matches!(slot, Value::Object(_)) {
                *slot = Value::Object(Document::new());
            }
            current = match slot {
                Value::Object(doc) => doc,
                _ => return,
            };
        }
        current.insert(last.clone(), value);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

/// Copy the values found at `paths` into a new document, keeping their nesting.
pub fn pick(document: &Document, paths: &[FieldPath]) -> Document {
    let mut picked = Document::new();
    for path in paths {
        if let Some(value) = path.resolve(document) {
            path.assign(&mut picked, value.clone());
        }
    }
    picked
}
