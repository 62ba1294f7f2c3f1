pub mod merge;
pub mod search;
pub mod sort;
pub mod text;

use clap::ValueEnum;

use searchnorm::{FieldPath, ObjectIdScheme, UuidScheme, Value, merge_objects_by_fields_with};

/// Identifier format treated as opaque when merging documents
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum IdScheme {
    /// 24 hex digit object ids
    #[default]
    ObjectId,
    /// Hyphenated UUIDs
    Uuid,
}

impl IdScheme {
    pub fn merge(self, fields: &[FieldPath], object: &Value, source: &Value) -> Value {
        match self {
            IdScheme::ObjectId => merge_objects_by_fields_with(fields, object, source, &ObjectIdScheme),
            IdScheme::Uuid => merge_objects_by_fields_with(fields, object, source, &UuidScheme),
        }
    }
}
