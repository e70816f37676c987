use std::path::Path;

use tracing::{debug, info, warn};

use super::cursor::ByteCursor;
use super::error::{OabError, Result};
use super::metadata::MetadataReader;
use super::record::{RecordDecoder, RecordOutcome, UnresolvedPolicy};
use super::schema::{PropertyLookup, PropertySchema};
use super::types::{AttributeSchema, OabHeader, Record, DEFAULT_MAX_RECORDS};
use crate::output;

/// Knobs for one decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Records beyond this count are not read.
    pub max_records: usize,
    pub unresolved: UnresolvedPolicy,
    /// Keep reading after a record that decodes to no fields. Off by
    /// default: an empty record marks the end of the data.
    pub keep_empty_records: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            unresolved: UnresolvedPolicy::Skip,
            keep_empty_records: false,
        }
    }
}

/// A fully decoded Details file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OabDocument {
    header: OabHeader,
    schema: AttributeSchema,
    records: Vec<Record>,
}

impl OabDocument {
    /// Decode `data` in one pass.
    ///
    /// Header and metadata failures are returned. A record that fails to
    /// decode ends the record loop; everything before it is kept. So does a
    /// record with no fields unless `keep_empty_records` is set.
    pub fn parse<L>(data: &[u8], lookup: &L, options: DecodeOptions) -> Result<Self>
    where
        L: PropertyLookup + ?Sized,
    {
        let mut cursor = ByteCursor::new(data);
        let header = MetadataReader::read_header(&mut cursor)?;
        let schema = MetadataReader::read_schema(&mut cursor)?;

        debug!(
            serial = header.serial,
            total_records = header.total_records,
            attributes = schema.len(),
            "Parsed OAB header"
        );

        let decoder = RecordDecoder::new(&schema, lookup, options.unresolved);
        let mut records = Vec::new();
        loop {
            if records.len() >= options.max_records {
                info!(max_records = options.max_records, "Record limit reached");
                break;
            }
            match decoder.decode_next(&mut cursor) {
                Ok(RecordOutcome::Record(record))
                    if record.is_empty() && !options.keep_empty_records =>
                {
                    debug!(decoded = records.len(), "Empty record ends the stream");
                    break;
                }
                Ok(RecordOutcome::Record(record)) => records.push(record),
                Ok(RecordOutcome::EndOfStream) => break,
                Err(err) => {
                    warn!(
                        error = %err,
                        decoded = records.len(),
                        offset = cursor.position(),
                        "Stopping at undecodable record"
                    );
                    break;
                }
            }
        }

        Ok(Self {
            header,
            schema,
            records,
        })
    }

    pub fn header(&self) -> &OabHeader {
        &self.header
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Holds input bytes until parsed, then the decoded document.
pub struct OabParser {
    data: Vec<u8>,
    schema: PropertySchema,
    options: DecodeOptions,
    document: Option<OabDocument>,
}

impl OabParser {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::with_schema(data, PropertySchema::builtin())
    }

    pub fn with_schema(data: impl Into<Vec<u8>>, schema: PropertySchema) -> Self {
        Self {
            data: data.into(),
            schema,
            options: DecodeOptions::default(),
            document: None,
        }
    }

    pub fn options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(&mut self) -> Result<&OabDocument> {
        let document = OabDocument::parse(&self.data, &self.schema, self.options)?;
        Ok(self.document.insert(document))
    }

    pub fn is_parsed(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Result<&OabDocument> {
        self.document.as_ref().ok_or(OabError::NotParsed)
    }

    pub fn records(&self) -> Result<&[Record]> {
        self.document().map(OabDocument::records)
    }

    pub fn to_json(&self) -> Result<String> {
        output::to_json(self.records()?, output::DEFAULT_JSON_INDENT)
    }

    pub fn to_csv(&self) -> Result<String> {
        Ok(output::to_csv(self.records()?))
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_csv()?)?;
        Ok(())
    }
}
