//! Property tag dictionary.
//!
//! Maps 8-digit uppercase hex property tags to a field name and wire type.
//! The decoder only reads it; callers may use the built-in table, load one
//! from JSON, or implement [`PropertyLookup`] themselves.

use std::collections::HashMap;
use std::path::Path;

use super::error::{OabError, Result};
use super::types::{format_prop_id, PropertyDef, PropertyType};

/// Read-only property resolution used by the record decoder.
pub trait PropertyLookup {
    fn lookup(&self, prop_id: u32) -> Option<&PropertyDef>;
}

#[derive(Debug, Clone, Default)]
pub struct PropertySchema {
    entries: HashMap<String, PropertyDef>,
}

/// Common address-book properties.
const BUILTIN_PROPERTIES: &[(u32, &str)] = &[
    (0x0FFE_0003, "ObjectType"),
    (0x0FFF_0102, "EntryId"),
    (0x3001_001F, "DisplayName"),
    (0x3001_001E, "DisplayName"),
    (0x3002_001F, "AddressType"),
    (0x3003_001F, "EmailAddress"),
    (0x3004_001F, "Comment"),
    (0x3900_0003, "DisplayType"),
    (0x3905_0003, "DisplayTypeEx"),
    (0x39FE_001F, "SmtpAddress"),
    (0x39FF_001F, "AddressBookDisplayNamePrintable"),
    (0x3A00_001F, "Account"),
    (0x3A06_001F, "GivenName"),
    (0x3A08_001F, "BusinessTelephoneNumber"),
    (0x3A09_001F, "HomeTelephoneNumber"),
    (0x3A0A_001F, "Initials"),
    (0x3A11_001F, "Surname"),
    (0x3A16_001F, "CompanyName"),
    (0x3A17_001F, "Title"),
    (0x3A18_001F, "DepartmentName"),
    (0x3A19_001F, "OfficeLocation"),
    (0x3A1A_001F, "PrimaryTelephoneNumber"),
    (0x3A1C_001F, "MobileTelephoneNumber"),
    (0x3A21_001F, "PagerTelephoneNumber"),
    (0x3A23_001F, "PrimaryFaxNumber"),
    (0x3A24_001F, "BusinessFaxNumber"),
    (0x3A26_001F, "Country"),
    (0x3A27_001F, "Locality"),
    (0x3A28_001F, "StateOrProvince"),
    (0x3A29_001F, "StreetAddress"),
    (0x3A2A_001F, "PostalCode"),
    (0x3A40_000B, "SendRichInfo"),
    (0x6805_1003, "OfflineAddressBookTruncatedProperties"),
    (0x800F_101F, "AddressBookProxyAddresses"),
    (0x8C6A_1102, "AddressBookX509Certificate"),
    (0x8C6D_0102, "AddressBookObjectGuid"),
];

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of common properties, types taken from each tag's type word.
    pub fn builtin() -> Self {
        let mut schema = Self::new();
        for &(prop_id, name) in BUILTIN_PROPERTIES {
            schema.insert(prop_id, PropertyDef::new(name, PropertyType::from_tag(prop_id)));
        }
        schema
    }

    /// Parse `{ "3001001F": ["DisplayName", "PtypString"], ... }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, (String, String)> = serde_json::from_str(json)?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, (name, ptype)) in raw {
            let prop_id = u32::from_str_radix(&key, 16)
                .map_err(|err| OabError::schema(format!("bad property tag {key:?}: {err}")))?;
            entries.insert(
                format_prop_id(prop_id),
                PropertyDef::new(name, PropertyType::from(ptype.as_str())),
            );
        }
        Ok(Self { entries })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert(&mut self, prop_id: u32, def: PropertyDef) -> Option<PropertyDef> {
        self.entries.insert(format_prop_id(prop_id), def)
    }

    /// Merge `other` on top of this table.
    pub fn extend(&mut self, other: PropertySchema) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&PropertyDef> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyLookup for PropertySchema {
    fn lookup(&self, prop_id: u32) -> Option<&PropertyDef> {
        self.entries.get(&format_prop_id(prop_id))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn builtin__display_name__then_resolves_wide_string() {
        let schema = PropertySchema::builtin();
        let def = schema.lookup(0x3001_001F).expect("display name");
        assert_eq!(def.name, "DisplayName");
        assert_eq!(def.ptype, PropertyType::String);
        assert_eq!(
            schema.lookup(0x6805_1003).map(|d| d.ptype.clone()),
            Some(PropertyType::MultipleInteger32)
        );
        assert!(schema.lookup(0xDEAD_BEEF).is_none());
    }

    #[test]
    fn from_json_str__lowercase_key__then_normalized() {
        let schema =
            PropertySchema::from_json_str(r#"{"3a00001f": ["Account", "PtypString"]}"#).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("3A00001F").unwrap().name, "Account");
        assert_eq!(schema.lookup(0x3A00_001F).unwrap().name, "Account");
    }

    #[test]
    fn from_json_str__non_hex_key__then_schema_error() {
        let err = PropertySchema::from_json_str(r#"{"zz": ["A", "PtypString"]}"#).unwrap_err();
        assert!(matches!(err, OabError::Schema(_)));
    }

    #[test]
    fn from_json_str__malformed_json__then_schema_error() {
        let err = PropertySchema::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, OabError::Schema(_)));
    }

    #[test]
    fn from_json_file__missing_file__then_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PropertySchema::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, OabError::Io(_)));
    }

    #[test]
    fn extend__overlapping_tag__then_other_wins() {
        let mut schema = PropertySchema::builtin();
        let before = schema.len();
        let mut custom = PropertySchema::new();
        custom.insert(0x3001_001F, PropertyDef::new("Name", PropertyType::String));
        schema.extend(custom);
        assert_eq!(schema.len(), before);
        assert_eq!(schema.lookup(0x3001_001F).unwrap().name, "Name");
    }
}
