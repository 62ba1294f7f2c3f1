//! Identifier recognition.
//!
//! Which strings count as store identifiers depends on the store, so the
//! normalizer and the field-scoped merge take an [`IdentifierScheme`] instead
//! of hard-coding one format. [`ObjectIdScheme`] is the default.

use std::fmt;

use uuid::Uuid;

use crate::filter::{Identifier, Value};

const OBJECT_ID_HEX_LEN: usize = 24;

/// Returns `true` if the provided string is a 24 hex digit object identifier.
pub fn is_valid_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` if the provided string parses as a UUID.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Store-specific identifier recognizer.
pub trait IdentifierScheme: fmt::Debug + Send + Sync {
    /// Parse a raw string into an identifier if this scheme accepts it.
    fn parse(&self, candidate: &str) -> Option<Identifier>;

    /// Whether a value is an identifier that must be treated as an opaque scalar.
    fn is_identifier(&self, value: &Value) -> bool {
        matches!(value, Value::Identifier(_))
    }
}

/// 24 hex digit object identifiers. Also treats `{"$oid": "<hex>"}` documents as identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdScheme;

impl IdentifierScheme for ObjectIdScheme {
    fn parse(&self, candidate: &str) -> Option<Identifier> {
        is_valid_object_id(candidate).then(|| Identifier::object_id(candidate))
    }

    fn is_identifier(&self, value: &Value) -> bool {
        match value {
            Value::Identifier(Identifier::ObjectId(_)) => true,
            Value::Object(doc) if doc.len() == 1 => doc
                .get("$oid")
                .and_then(Value::as_str)
                .is_some_and(is_valid_object_id),
            _ => false,
        }
    }
}

/// UUID identifiers, stored hyphenated.
///
/// During search normalization the range check runs before identifier
/// recognition, so a hyphenated UUID with a digit on both sides of any hyphen
/// (`8400-e29b` does not, `a716-4466` does) is read as a `low-high` range.
/// Only UUIDs without such a pair, including the simple 32 digit form, come
/// out as identifiers there. The field-scoped merge has no such restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidScheme;

impl IdentifierScheme for UuidScheme {
    fn parse(&self, candidate: &str) -> Option<Identifier> {
        Uuid::parse_str(candidate)
            .ok()
            .map(|uuid| Identifier::uuid(&uuid.hyphenated().to_string()))
    }

    fn is_identifier(&self, value: &Value) -> bool {
        match value {
            Value::Identifier(Identifier::Uuid(_)) => true,
            Value::Object(doc) if doc.len() == 1 => {
                doc.get("$uuid").and_then(Value::as_str).is_some_and(is_valid_uuid)
            }
            _ => false,
        }
    }
}
