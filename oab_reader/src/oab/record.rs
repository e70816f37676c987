use tracing::{debug, warn};

use super::bitmap::PresenceBitmap;
use super::cursor::ByteCursor;
use super::error::{OabError, Result};
use super::property::read_value;
use super::schema::PropertyLookup;
use super::types::{format_prop_id, AttributeSchema, PropertyType, Record, Value};

/// What to do with a present attribute whose value is not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Drop the field without consuming its bytes. Later fields in the same
    /// record are read from wherever the cursor happens to be.
    #[default]
    Skip,
    /// Consume the field's bytes using the type word of its property tag.
    /// If that is impossible the rest of the record is abandoned.
    Consume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unresolved,
    Failed(String),
}

/// Result of decoding one present attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyOutcome {
    Decoded(String, Value),
    Skipped { prop_id: u32, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Record(Record),
    EndOfStream,
}

/// Decodes size-prefixed record chunks against one attribute table.
pub struct RecordDecoder<'s, L: ?Sized> {
    schema: &'s AttributeSchema,
    lookup: &'s L,
    policy: UnresolvedPolicy,
}

impl<'s, L> RecordDecoder<'s, L>
where
    L: PropertyLookup + ?Sized,
{
    pub fn new(schema: &'s AttributeSchema, lookup: &'s L, policy: UnresolvedPolicy) -> Self {
        Self {
            schema,
            lookup,
            policy,
        }
    }

    /// Read the next record, or report the end of the stream.
    ///
    /// Errors cover a malformed chunk size, a chunk running past the end of
    /// the buffer, and a truncated presence bitmap.
    pub fn decode_next(&self, cursor: &mut ByteCursor<'_>) -> Result<RecordOutcome> {
        if cursor.remaining() < 4 {
            return Ok(RecordOutcome::EndOfStream);
        }

        let size = cursor.read_u32_le("record size")?;
        if size < 4 {
            return Err(OabError::InvalidBlockSize {
                context: "record",
                size,
            });
        }
        let region = cursor.take(size as usize - 4, "record")?;
        let mut chunk = ByteCursor::new(region);

        let bitmap = PresenceBitmap::read(&mut chunk, self.schema.len())?;

        let mut record = Record::new();
        for index in bitmap.present_indices() {
            // present_indices() is bounded by the schema length
            let Some(prop_id) = self.schema.get(index) else {
                break;
            };
            match self.decode_property(&mut chunk, prop_id) {
                PropertyOutcome::Decoded(name, value) => {
                    record.insert(name, value);
                }
                PropertyOutcome::Skipped { prop_id, reason } => {
                    if !self.recover(&mut chunk, prop_id, &reason) {
                        break;
                    }
                }
            }
        }

        // Unread bytes in the chunk are dropped with it.
        Ok(RecordOutcome::Record(record))
    }

    /// Resolve and decode the attribute bound to `prop_id`.
    pub fn decode_property(&self, chunk: &mut ByteCursor<'_>, prop_id: u32) -> PropertyOutcome {
        let Some(def) = self.lookup.lookup(prop_id) else {
            return PropertyOutcome::Skipped {
                prop_id,
                reason: SkipReason::Unresolved,
            };
        };

        match read_value(chunk, &def.name, &def.ptype, self.lookup) {
            Ok(value) => PropertyOutcome::Decoded(def.name.clone(), value),
            Err(err) => PropertyOutcome::Skipped {
                prop_id,
                reason: SkipReason::Failed(err.to_string()),
            },
        }
    }

    /// Apply the policy after a skipped attribute. Returns false when the
    /// rest of the record cannot be trusted.
    fn recover(&self, chunk: &mut ByteCursor<'_>, prop_id: u32, reason: &SkipReason) -> bool {
        let tag = format_prop_id(prop_id);
        match reason {
            SkipReason::Unresolved => debug!(prop_id = %tag, "Skipping unresolved property"),
            SkipReason::Failed(err) => {
                warn!(prop_id = %tag, error = %err, "Error reading property")
            }
        }

        match (self.policy, reason) {
            (UnresolvedPolicy::Skip, _) => true,
            (UnresolvedPolicy::Consume, SkipReason::Failed(_)) => false,
            (UnresolvedPolicy::Consume, SkipReason::Unresolved) => {
                let ptype = PropertyType::from_tag(prop_id);
                match read_value(chunk, "", &ptype, self.lookup) {
                    Ok(_) => true,
                    Err(err) => {
                        warn!(
                            prop_id = %tag,
                            error = %err,
                            "Cannot skip property, abandoning rest of record"
                        );
                        false
                    }
                }
            }
        }
    }
}
