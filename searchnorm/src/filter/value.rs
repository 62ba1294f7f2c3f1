//! Typed operand values.
//!
//! Raw parameters are classified into a [`Value`] once, at ingestion. Every
//! later stage matches on the variant instead of probing the runtime shape of
//! the data.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Number, Value as JsonValue, json};

use crate::errors::{QueryError, QueryResult};
use crate::validators::{is_valid_object_id, is_valid_uuid};

/// Insertion-ordered string-keyed document.
pub type Document = IndexMap<String, Value>;

const OID_KEY: &str = "$oid";
const UUID_KEY: &str = "$uuid";
const DATE_KEY: &str = "$date";
const REGEX_KEY: &str = "$regex";
const OPTIONS_KEY: &str = "$options";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Identifier(Identifier),
    Date(DateTime<Utc>),
    Pattern(PartialMatch),
    Array(Vec<Value>),
    Object(Document),
}

impl Value {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Self::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(flag) => *flag,
            Self::Integer(n) => *n != 0,
            Self::Float(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Whether the value is a reference type rather than a primitive scalar.
    #[inline]
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_) | Self::Date(_) | Self::Pattern(_) | Self::Array(_) | Self::Object(_)
        )
    }

    /// Render the value the way the document store expects it.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(flag) => JsonValue::Bool(*flag),
            Self::Integer(n) => JsonValue::from(*n),
            Self::Float(n) => Number::from_f64(*n).map(JsonValue::Number).unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Identifier(id) => json!({ id.json_key(): id.as_str() }),
            Self::Date(date) => json!({ DATE_KEY: date.to_rfc3339_opts(SecondsFormat::Millis, true) }),
            Self::Pattern(pattern) => pattern.to_json(),
            Self::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(doc) => JsonValue::Object(document_to_json(doc)),
        }
    }

    /// Ingest a JSON value.
    ///
    /// Extended-JSON wrappers (`{"$oid": ..}`, `{"$uuid": ..}`, `{"$date": ..}` and
    /// `{"$regex": .., "$options": ..}`) become their typed variants when their payload is valid;
    /// otherwise they are kept as plain objects.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(flag) => Self::Bool(flag),
            JsonValue::Number(n) => match n.as_i64() {
                Some(int) => Self::Integer(int),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Array(items.into_iter().map(Value::from_json).collect()),
            JsonValue::Object(map) => extended_json(&map).unwrap_or_else(|| {
                Self::Object(map.into_iter().map(|(key, value)| (key, Value::from_json(value))).collect())
            }),
        }
    }
}

fn extended_json(map: &Map<String, JsonValue>) -> Option<Value> {
    if let Some(JsonValue::String(pattern)) = map.get(REGEX_KEY) {
        let options = map.get(OPTIONS_KEY).and_then(JsonValue::as_str).unwrap_or_default();
        if map.len() > 2 || (map.len() == 2 && !map.contains_key(OPTIONS_KEY)) {
            return None;
        }
        let (anchored, body) = match pattern.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        return Some(Value::Pattern(PartialMatch {
            pattern: body.to_string(),
            case_insensitive: options.contains('i'),
            anchored,
        }));
    }

    if map.len() != 1 {
        return None;
    }
    let (key, payload) = map.iter().next()?;
    let payload = payload.as_str()?;
    match key.as_str() {
        OID_KEY if is_valid_object_id(payload) => Some(Value::Identifier(Identifier::object_id(payload))),
        UUID_KEY if is_valid_uuid(payload) => Some(Value::Identifier(Identifier::uuid(payload))),
        DATE_KEY => DateTime::parse_from_rfc3339(payload)
            .ok()
            .map(|date| Value::Date(date.with_timezone(&Utc))),
        _ => None,
    }
}

pub(crate) fn document_to_json(doc: &Document) -> Map<String, JsonValue> {
    doc.iter().map(|(key, value)| (key.clone(), value.to_json())).collect()
}

/// Parse JSON text that must hold an object into a [`Document`].
pub fn parse_document(text: &str) -> QueryResult<Document> {
    let parsed: JsonValue = serde_json::from_str(text).map_err(|err| QueryError::InvalidRequest {
        message: format!("Invalid JSON document: {}", err),
    })?;
    match Value::from_json(parsed) {
        Value::Object(doc) => Ok(doc),
        other => Err(QueryError::InvalidRequest {
            message: format!("Expected a JSON object, got {}", other.to_json()),
        }),
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Identifier> for Value {
    fn from(value: Identifier) -> Self {
        Self::Identifier(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<PartialMatch> for Value {
    fn from(value: PartialMatch) -> Self {
        Self::Pattern(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Self::Object(value)
    }
}

/// An opaque store identifier, kept in canonical lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    /// 24 hex digit document key.
    ObjectId(String),
    /// Hyphenated UUID.
    Uuid(String),
}

impl Identifier {
    pub fn object_id(hex: &str) -> Self {
        Self::ObjectId(hex.to_ascii_lowercase())
    }

    pub fn uuid(value: &str) -> Self {
        Self::Uuid(value.to_ascii_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ObjectId(value) | Self::Uuid(value) => value,
        }
    }

    const fn json_key(&self) -> &'static str {
        match self {
            Self::ObjectId(_) => OID_KEY,
            Self::Uuid(_) => UUID_KEY,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial-match predicate over a string field.
///
/// The pattern is kept as regex source rather than a compiled object so each
/// consumer can match with whatever facility it has. `anchored` adds a leading
/// `^` to the effective source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialMatch {
    pub pattern: String,
    pub case_insensitive: bool,
    pub anchored: bool,
}

impl PartialMatch {
    /// Case-insensitive, unanchored match.
    #[inline]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_insensitive: true,
            anchored: false,
        }
    }

    /// Case-insensitive match anchored to the start of the value.
    #[inline]
    pub fn anchored(pattern: impl Into<String>) -> Self {
        Self {
            anchored: true,
            ..Self::new(pattern)
        }
    }

    /// Effective regex source, including the anchor.
    pub fn source(&self) -> String {
        if self.anchored {
            format!("^{}", self.pattern)
        } else {
            self.pattern.clone()
        }
    }

    pub fn compile(&self) -> QueryResult<Regex> {
        let source = self.source();
        RegexBuilder::new(&source)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|source_err| QueryError::InvalidPattern {
                pattern: source,
                source: source_err,
            })
    }

    pub fn to_json(&self) -> JsonValue {
        let options = if self.case_insensitive { "i" } else { "" };
        json!({ REGEX_KEY: self.source(), OPTIONS_KEY: options })
    }
}

impl fmt::Display for PartialMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source())?;
        if self.case_insensitive {
            f.write_str("i")?;
        }
        Ok(())
    }
}
