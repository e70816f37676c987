//! Bounds-checked byte cursor over an in-memory OAB buffer.
//!
//! Every reader in this crate advances one of these. Fixed-width fields are
//! little-endian. The format's variable-length integer ("var-int") is decoded
//! here too:
//!
//! ```text
//! indicator 0x00..=0x7F   value is the indicator itself
//! indicator 0x81..=0x84   value is the next (indicator - 0x80) bytes, LE,
//!                         zero-padded to 32 bits
//! anything else           invalid
//! ```

use super::error::{OabError, Result};

/// Value substituted for an unreadable var-int integer.
pub const VARINT_SENTINEL: i64 = -1;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| OabError::truncated(context, 1, 0))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u32_le(&mut self, context: &'static str) -> Result<u32> {
        let bytes = self.take(4, context)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Take exactly `len` bytes or fail without moving.
    pub fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(OabError::truncated(context, len, self.remaining()));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Take up to `len` bytes; a short read returns whatever is left.
    pub fn take_up_to(&mut self, len: usize) -> &'a [u8] {
        let len = len.min(self.remaining());
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    pub fn skip(&mut self, len: usize, context: &'static str) -> Result<()> {
        self.take(len, context).map(|_| ())
    }

    /// Consume and return everything left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    /// Bytes up to the next NUL (consumed, not returned) or the end of data.
    pub fn read_until_nul(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => self.take_rest(),
        }
    }

    /// Decode one var-int.
    ///
    /// On failure the indicator byte stays consumed; at end of data nothing is.
    pub fn read_varint(&mut self) -> Result<u32> {
        let indicator = self.read_u8("var-int indicator")?;
        match indicator {
            0x00..=0x7F => Ok(u32::from(indicator)),
            0x81..=0x84 => {
                let extra = usize::from(indicator - 0x80);
                let bytes = self.take(extra, "var-int payload")?;
                let mut padded = [0u8; 4];
                padded[..extra].copy_from_slice(bytes);
                Ok(u32::from_le_bytes(padded))
            }
            other => Err(OabError::InvalidVarInt(other)),
        }
    }

    /// Var-int as a signed value, [`VARINT_SENTINEL`] when unreadable.
    pub fn read_varint_or_sentinel(&mut self) -> i64 {
        self.read_varint()
            .map(i64::from)
            .unwrap_or(VARINT_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn read_varint__literal_range__then_returns_indicator() {
        for b in 0u8..=127 {
            let data = [b];
            let mut cursor = ByteCursor::new(&data);
            assert_eq!(cursor.read_varint().unwrap(), u32::from(b));
            assert_eq!(cursor.position(), 1);
        }
    }

    #[test]
    fn read_varint__one_extra_byte__then_returns_payload() {
        let data = [0x81, 0x05];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_varint().unwrap(), 5);
        assert!(cursor.is_empty());
    }

    #[test]
    fn read_varint__four_extra_bytes__then_little_endian() {
        let data = [0x84, 0x01, 0x00, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_varint().unwrap(), 1);

        let data = [0x82, 0x34, 0x12, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_varint().unwrap(), 0x1234);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn read_varint__reserved_indicator__then_error_after_one_byte() {
        for indicator in [0x80u8, 0x85, 0xFF] {
            let data = [indicator, 0x01, 0x02];
            let mut cursor = ByteCursor::new(&data);
            assert!(matches!(
                cursor.read_varint(),
                Err(OabError::InvalidVarInt(b)) if b == indicator
            ));
            assert_eq!(cursor.position(), 1);
        }
    }

    #[test]
    fn read_varint__short_payload__then_truncated() {
        let data = [0x83, 0x01];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_varint(),
            Err(OabError::Truncated { .. })
        ));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn read_varint__end_of_data__then_nothing_consumed() {
        let mut cursor = ByteCursor::new(&[]);
        assert!(cursor.read_varint().is_err());
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_varint_or_sentinel(), VARINT_SENTINEL);
    }

    #[test]
    fn read_until_nul__terminated_and_unterminated__then_split_correctly() {
        let data = b"ab\0cd";
        let mut cursor = ByteCursor::new(data);
        assert_eq!(cursor.read_until_nul(), b"ab");
        assert_eq!(cursor.read_until_nul(), b"cd");
        assert!(cursor.is_empty());
        assert_eq!(cursor.read_until_nul(), b"");
    }

    #[test]
    fn take__past_end__then_error_and_position_unchanged() {
        let data = [1u8, 2, 3];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.take(4, "block").is_err());
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.take_up_to(4), &[1, 2, 3]);
    }

    #[test]
    fn read_u32_le__four_bytes__then_decoded() {
        let data = 0x2000_0001u32.to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32_le("size").unwrap(), 0x2000_0001);
    }
}
