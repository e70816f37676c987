//! Header and attribute-table parsing.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ version | serial | recCount  │ 3 x u32
//! ├──────────────────────────────┤
//! │ cbSize                       │ u32, includes itself
//! │ hdrCount, hdrCount x (id,fl) │ header attributes, skipped
//! │ oabCount, oabCount x (id,fl) │ record attribute table
//! ├──────────────────────────────┤
//! │ cbSize, header record        │ skipped
//! ├──────────────────────────────┤
//! │ records ...                  │
//! └──────────────────────────────┘
//! ```

use tracing::debug;

use super::cursor::ByteCursor;
use super::error::{OabError, Result};
use super::types::{
    AttributeSchema, OabHeader, OAB_ATTRIBUTE_ENTRY_SIZE, OAB_DETAILS_VERSION, OAB_HEADER_SIZE,
};

pub struct MetadataReader;

impl MetadataReader {
    /// Parse and validate the 12-byte file header.
    pub fn read_header(cursor: &mut ByteCursor<'_>) -> Result<OabHeader> {
        if cursor.remaining() < OAB_HEADER_SIZE {
            return Err(OabError::truncated(
                "header",
                OAB_HEADER_SIZE,
                cursor.remaining(),
            ));
        }

        let header = OabHeader {
            version: cursor.read_u32_le("header")?,
            serial: cursor.read_u32_le("header")?,
            total_records: cursor.read_u32_le("header")?,
        };

        if header.version != OAB_DETAILS_VERSION {
            return Err(OabError::UnsupportedVersion(header.version));
        }

        Ok(header)
    }

    /// Parse the attribute tables, then skip the header-record block.
    pub fn read_schema(cursor: &mut ByteCursor<'_>) -> Result<AttributeSchema> {
        let block = Self::read_block(cursor, "metadata block")?;
        let mut meta = ByteCursor::new(block);

        let header_attribute_count = meta.read_u32_le("header attribute count")?;
        let skip = Self::table_len(header_attribute_count)?;
        meta.skip(skip, "header attribute table")?;

        let attribute_count = meta.read_u32_le("attribute count")?;
        let table_len = Self::table_len(attribute_count)?;
        if table_len > meta.remaining() {
            return Err(OabError::truncated(
                "attribute table",
                table_len,
                meta.remaining(),
            ));
        }

        let mut prop_ids = Vec::with_capacity(attribute_count as usize);
        for _ in 0..attribute_count {
            prop_ids.push(meta.read_u32_le("attribute table")?);
            meta.skip(4, "attribute flags")?;
        }

        Self::read_block(cursor, "header record")?;

        debug!(
            header_attributes = header_attribute_count,
            attributes = prop_ids.len(),
            "Parsed OAB attribute table"
        );

        Ok(AttributeSchema {
            header_attribute_count,
            prop_ids,
        })
    }

    /// Size-prefixed block; the size counts its own four bytes.
    fn read_block<'a>(cursor: &mut ByteCursor<'a>, context: &'static str) -> Result<&'a [u8]> {
        let size = cursor.read_u32_le(context)?;
        if size < 4 {
            return Err(OabError::InvalidBlockSize { context, size });
        }
        cursor.take(size as usize - 4, context)
    }

    fn table_len(count: u32) -> Result<usize> {
        (count as usize)
            .checked_mul(OAB_ATTRIBUTE_ENTRY_SIZE)
            .ok_or(OabError::InvalidBlockSize {
                context: "attribute table",
                size: count,
            })
    }
}
