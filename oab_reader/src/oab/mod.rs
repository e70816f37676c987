//! OAB Details file decoder
//!
//! Whole-buffer, single pass: header and attribute table first, then
//! size-prefixed records until the data runs out or a bound is hit.

pub mod bitmap;
pub mod cursor;
pub mod document;
pub mod error;
pub mod metadata;
pub mod property;
pub mod record;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use bitmap::PresenceBitmap;
pub use cursor::{ByteCursor, VARINT_SENTINEL};
pub use document::{DecodeOptions, OabDocument, OabParser};
pub use error::{OabError, Result};
pub use metadata::MetadataReader;
pub use property::read_value;
pub use record::{PropertyOutcome, RecordDecoder, RecordOutcome, SkipReason, UnresolvedPolicy};
pub use schema::{PropertyLookup, PropertySchema};
pub use types::{
    format_prop_id, AttributeSchema, OabHeader, PropertyDef, PropertyType, Record, Value,
    DEFAULT_MAX_RECORDS, OAB_DETAILS_VERSION, TRUNCATED_PROPERTIES_FIELD,
};
