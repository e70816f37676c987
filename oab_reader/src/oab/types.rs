// Type definitions for the OAB Details file (version 4 "full details")

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Only "Details" files carry this version.
pub const OAB_DETAILS_VERSION: u32 = 32;

/// Header length: version, serial, record count.
pub const OAB_HEADER_SIZE: usize = 12;

/// Width of one entry in the header and record attribute tables.
pub const OAB_ATTRIBUTE_ENTRY_SIZE: usize = 8;

/// Field whose integers are property tags rather than plain numbers.
pub const TRUNCATED_PROPERTIES_FIELD: &str = "OfflineAddressBookTruncatedProperties";

/// Default upper bound on records decoded from one file.
pub const DEFAULT_MAX_RECORDS: usize = 200_000;

// MAPI property type words (low 16 bits of a property tag)
pub const PT_LONG: u16 = 0x0003;
pub const PT_BOOLEAN: u16 = 0x000B;
pub const PT_STRING8: u16 = 0x001E;
pub const PT_UNICODE: u16 = 0x001F;
pub const PT_BINARY: u16 = 0x0102;
pub const PT_MV_LONG: u16 = 0x1003;
pub const PT_MV_STRING8: u16 = 0x101E;
pub const PT_MV_UNICODE: u16 = 0x101F;
pub const PT_MV_BINARY: u16 = 0x1102;

/// OAB file header (12 bytes, little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OabHeader {
    pub version: u32,
    pub serial: u32,
    /// Writer's record count; informational only.
    pub total_records: u32,
}

/// Property IDs in record-bitmap order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    /// Header attributes are counted but their values are not kept.
    pub header_attribute_count: u32,
    pub prop_ids: Vec<u32>,
}

impl AttributeSchema {
    pub fn len(&self) -> usize {
        self.prop_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prop_ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.prop_ids.get(index).copied()
    }

    /// Bytes in each record's presence bitmap.
    pub fn bitmap_len(&self) -> usize {
        self.prop_ids.len().div_ceil(8)
    }
}

/// Wire type of a property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    String8,
    String,
    Boolean,
    Integer32,
    Binary,
    MultipleString8,
    MultipleString,
    MultipleInteger32,
    MultipleBinary,
    Unknown(std::string::String),
}

impl PropertyType {
    /// Type encoded in the low word of a property tag.
    pub fn from_tag(prop_id: u32) -> Self {
        match (prop_id & 0xFFFF) as u16 {
            PT_STRING8 => PropertyType::String8,
            PT_UNICODE => PropertyType::String,
            PT_BOOLEAN => PropertyType::Boolean,
            PT_LONG => PropertyType::Integer32,
            PT_BINARY => PropertyType::Binary,
            PT_MV_STRING8 => PropertyType::MultipleString8,
            PT_MV_UNICODE => PropertyType::MultipleString,
            PT_MV_LONG => PropertyType::MultipleInteger32,
            PT_MV_BINARY => PropertyType::MultipleBinary,
            other => PropertyType::Unknown(format!("0x{other:04X}")),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PropertyType::String8 => "PtypString8",
            PropertyType::String => "PtypString",
            PropertyType::Boolean => "PtypBoolean",
            PropertyType::Integer32 => "PtypInteger32",
            PropertyType::Binary => "PtypBinary",
            PropertyType::MultipleString8 => "PtypMultipleString8",
            PropertyType::MultipleString => "PtypMultipleString",
            PropertyType::MultipleInteger32 => "PtypMultipleInteger32",
            PropertyType::MultipleBinary => "PtypMultipleBinary",
            PropertyType::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(value: &str) -> Self {
        match value {
            "PtypString8" => PropertyType::String8,
            "PtypString" => PropertyType::String,
            "PtypBoolean" => PropertyType::Boolean,
            "PtypInteger32" => PropertyType::Integer32,
            "PtypBinary" => PropertyType::Binary,
            "PtypMultipleString8" => PropertyType::MultipleString8,
            "PtypMultipleString" => PropertyType::MultipleString,
            "PtypMultipleInteger32" => PropertyType::MultipleInteger32,
            "PtypMultipleBinary" => PropertyType::MultipleBinary,
            other => PropertyType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name and type bound to one property tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ptype: PropertyType,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ptype: PropertyType) -> Self {
        Self {
            name: name.into(),
            ptype,
        }
    }
}

/// One decoded property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    /// Lowercase hex of the raw bytes
    Binary(String),
    Multiple(Vec<Value>),
}

/// Field name to value, in attribute-table order.
pub type Record = IndexMap<String, Value>;

/// 8-digit uppercase hex form used as the schema key, e.g. `3001001F`.
pub fn format_prop_id(prop_id: u32) -> String {
    format!("{prop_id:08X}")
}
