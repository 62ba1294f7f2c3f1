//! searchnorm core library.
//!
//! Normalizes loosely-typed search parameters (URL query strings, form
//! fields) into a typed, store-agnostic [`Filter`], and shapes sort specs,
//! free-text search clauses and field-scoped document merges alongside it.
//!
//! ```
//! use searchnorm::{Conditions, NormalizeOptions, add_text_search_to_query, normalize_search};
//!
//! let params = Conditions::from_query_string("age=18-25,30-40&active=true");
//! let mut filter = normalize_search(&params, NormalizeOptions::default()).unwrap();
//! add_text_search_to_query(&mut filter, "red car", &["title"]);
//!
//! assert_eq!(filter.branches().len(), 2);
//! ```

pub mod document;
pub mod errors;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod path;
pub mod sort;
pub mod text;
pub mod validators;

pub use document::flatten_document;
pub use errors::*;
pub use filter::{
    Conditions, Document, FieldPredicate, Filter, Identifier, PartialMatch, Predicate, Value, parse_document,
};
pub use merge::{add_text_search_to_query, merge_objects_by_fields, merge_objects_by_fields_with};
pub use normalize::{NormalizeOptions, SearchNormalizer, normalize_search, sanitize_regex};
pub use path::FieldPath;
pub use sort::{FieldMeta, FieldSchema, SortOrder, SortSpec, normalize_sort, sort_documents};
pub use text::{extract_keywords, keywords_query, text_search_filter};
pub use validators::{IdentifierScheme, ObjectIdScheme, UuidScheme};
