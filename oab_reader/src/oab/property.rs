//! Typed property value decoding.

use super::cursor::ByteCursor;
use super::error::{OabError, Result};
use super::schema::PropertyLookup;
use super::types::{format_prop_id, PropertyType, Value, TRUNCATED_PROPERTIES_FIELD};

/// Decode one value of `ptype` for the field `name`.
///
/// `lookup` is only consulted for the truncated-properties list, whose
/// integers are property tags and are replaced by field names.
pub fn read_value<L>(
    cursor: &mut ByteCursor<'_>,
    name: &str,
    ptype: &PropertyType,
    lookup: &L,
) -> Result<Value>
where
    L: PropertyLookup + ?Sized,
{
    match ptype {
        PropertyType::String8 | PropertyType::String => Ok(Value::String(read_string(cursor))),
        PropertyType::Boolean => match cursor.read_u8("boolean")? {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            other => Err(OabError::InvalidBoolean(other)),
        },
        PropertyType::Integer32 => Ok(Value::Integer(cursor.read_varint_or_sentinel())),
        PropertyType::Binary => Ok(Value::Binary(read_binary(cursor)?)),
        PropertyType::MultipleString8 | PropertyType::MultipleString => {
            let count = read_count(cursor)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                if cursor.is_empty() {
                    return Err(OabError::truncated("multi-value string", 1, 0));
                }
                items.push(Value::String(read_string(cursor)));
            }
            Ok(Value::Multiple(items))
        }
        PropertyType::MultipleInteger32 => {
            let count = read_count(cursor)?;
            let resolve_tags = name == TRUNCATED_PROPERTIES_FIELD;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let value = cursor.read_varint_or_sentinel();
                items.push(if resolve_tags {
                    resolve_tag(value, lookup)
                } else {
                    Value::Integer(value)
                });
            }
            Ok(Value::Multiple(items))
        }
        PropertyType::MultipleBinary => {
            let count = read_count(cursor)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(Value::Binary(read_binary(cursor)?));
            }
            Ok(Value::Multiple(items))
        }
        PropertyType::Unknown(raw) => Err(OabError::UnknownType(raw.clone())),
    }
}

/// NUL-terminated text; UTF-8 with a Latin-1 fallback.
fn read_string(cursor: &mut ByteCursor<'_>) -> String {
    let bytes = cursor.read_until_nul();
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Element count of a multi-value property. Every element takes at least
/// one byte, so a count beyond the bytes left cannot be genuine.
fn read_count(cursor: &mut ByteCursor<'_>) -> Result<usize> {
    let count = cursor.read_varint()? as usize;
    if count > cursor.remaining() {
        return Err(OabError::truncated(
            "multi-value property",
            count,
            cursor.remaining(),
        ));
    }
    Ok(count)
}

/// Var-int length then raw bytes, hex encoded. A short read keeps what is there.
fn read_binary(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let len = cursor.read_varint()? as usize;
    Ok(hex::encode(cursor.take_up_to(len)))
}

fn resolve_tag<L>(value: i64, lookup: &L) -> Value
where
    L: PropertyLookup + ?Sized,
{
    let Ok(prop_id) = u32::try_from(value) else {
        return Value::Integer(value);
    };
    match lookup.lookup(prop_id) {
        Some(def) => Value::String(def.name.clone()),
        None => Value::String(format_prop_id(prop_id)),
    }
}
