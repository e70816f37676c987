// Builders for OAB byte fixtures used across unit tests.

use super::types::OAB_DETAILS_VERSION;

/// Minimal var-int encoding for a value.
pub fn varint(value: u32) -> Vec<u8> {
    if value <= 0x7F {
        return vec![value as u8];
    }
    let bytes = value.to_le_bytes();
    let width = 4 - (value.leading_zeros() / 8) as usize;
    let mut out = vec![0x80 + width as u8];
    out.extend_from_slice(&bytes[..width]);
    out
}

pub fn cstr(value: &str) -> Vec<u8> {
    let mut out = value.as_bytes().to_vec();
    out.push(0);
    out
}

/// Presence bitmap bytes for `attribute_count` attributes.
pub fn bitmap(attribute_count: usize, present: &[usize]) -> Vec<u8> {
    let mut bits = vec![0u8; attribute_count.div_ceil(8)];
    for &index in present {
        bits[index / 8] |= 0x80 >> (index % 8);
    }
    bits
}

pub struct OabFileBuilder {
    version: u32,
    serial: u32,
    total_records: Option<u32>,
    header_attributes: Vec<u32>,
    attributes: Vec<u32>,
    header_record: Vec<u8>,
    records: Vec<Vec<u8>>,
}

impl OabFileBuilder {
    pub fn new() -> Self {
        Self {
            version: OAB_DETAILS_VERSION,
            serial: 1,
            total_records: None,
            header_attributes: Vec::new(),
            attributes: Vec::new(),
            header_record: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn serial(mut self, serial: u32) -> Self {
        self.serial = serial;
        self
    }

    pub fn total_records(mut self, total: u32) -> Self {
        self.total_records = Some(total);
        self
    }

    pub fn header_attributes(mut self, ids: &[u32]) -> Self {
        self.header_attributes = ids.to_vec();
        self
    }

    pub fn attributes(mut self, ids: &[u32]) -> Self {
        self.attributes = ids.to_vec();
        self
    }

    pub fn header_record(mut self, body: &[u8]) -> Self {
        self.header_record = body.to_vec();
        self
    }

    /// Record body: presence bitmap followed by encoded values.
    pub fn record(mut self, body: Vec<u8>) -> Self {
        self.records.push(body);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.serial.to_le_bytes());
        let total = self.total_records.unwrap_or(self.records.len() as u32);
        out.extend_from_slice(&total.to_le_bytes());

        let mut meta = Vec::new();
        meta.extend_from_slice(&(self.header_attributes.len() as u32).to_le_bytes());
        for id in &self.header_attributes {
            meta.extend_from_slice(&id.to_le_bytes());
            meta.extend_from_slice(&0u32.to_le_bytes());
        }
        meta.extend_from_slice(&(self.attributes.len() as u32).to_le_bytes());
        for id in &self.attributes {
            meta.extend_from_slice(&id.to_le_bytes());
            meta.extend_from_slice(&0u32.to_le_bytes());
        }
        push_block(&mut out, &meta);
        push_block(&mut out, &self.header_record);

        for record in &self.records {
            push_block(&mut out, record);
        }
        out
    }
}

fn push_block(out: &mut Vec<u8>, body: &[u8]) {
    out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    out.extend_from_slice(body);
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn varint__boundaries__then_minimal_width() {
        assert_eq!(varint(5), vec![5]);
        assert_eq!(varint(127), vec![127]);
        assert_eq!(varint(128), vec![0x81, 0x80]);
        assert_eq!(varint(0x1234), vec![0x82, 0x34, 0x12]);
        assert_eq!(varint(u32::MAX), vec![0x84, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn bitmap__indices__then_msb_first() {
        assert_eq!(bitmap(10, &[0, 2, 9]), vec![0b1010_0000, 0b0100_0000]);
    }
}
