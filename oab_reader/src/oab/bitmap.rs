use super::cursor::ByteCursor;
use super::error::Result;

/// Per-record presence bits, MSB-first within each byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceBitmap<'a> {
    bits: &'a [u8],
    attribute_count: usize,
}

impl<'a> PresenceBitmap<'a> {
    /// Consume exactly `ceil(attribute_count / 8)` bytes.
    pub fn read(cursor: &mut ByteCursor<'a>, attribute_count: usize) -> Result<Self> {
        let bits = cursor.take(attribute_count.div_ceil(8), "presence bitmap")?;
        Ok(Self {
            bits,
            attribute_count,
        })
    }

    pub fn is_present(&self, index: usize) -> bool {
        index < self.attribute_count && (self.bits[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Indices of set bits, ascending.
    pub fn present_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.attribute_count).filter(move |&i| self.is_present(i))
    }
}
