pub mod app;
pub mod oab;
pub mod output;

pub use oab::{
    DecodeOptions, OabDocument, OabError, OabParser, PropertyLookup, PropertySchema, Record,
    Result, UnresolvedPolicy, Value,
};
pub use output::OutputFormat;
