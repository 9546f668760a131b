use byteorder::{BigEndian, WriteBytesExt};

use super::reader::NULL_STRING;

/// Big-endian writer producing Qt data stream bytes
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.write_u8(v as u8);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(if v { 1 } else { 0 });
    }

    // Writes into a Vec cannot fail; the io::Result is discarded.
    pub fn write_u16(&mut self, v: u16) {
        let _ = self.data.write_u16::<BigEndian>(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        let _ = self.data.write_i32::<BigEndian>(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        let _ = self.data.write_u32::<BigEndian>(v);
    }

    pub fn write_f64(&mut self, v: f64) {
        let _ = self.data.write_f64::<BigEndian>(v);
    }

    /// Write a QString as UTF-16BE with a byte-length prefix
    pub fn write_string(&mut self, s: &str) {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.write_u32((units.len() * 2) as u32);
        for unit in units {
            self.write_u16(unit);
        }
    }

    /// Write a null QString
    pub fn write_null_string(&mut self) {
        self.write_u32(NULL_STRING);
    }

    /// Write a single-byte length-prefixed UTF-8 string (legacy sub-format)
    pub fn write_short_string(&mut self, s: &str) {
        let bytes = &s.as_bytes()[..s.len().min(u8::MAX as usize)];
        self.write_u8(bytes.len() as u8);
        self.write_bytes(bytes);
    }

    /// Write a count prefix for a sequence or map
    pub fn write_count(&mut self, n: usize) {
        self.write_i32(n as i32);
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BinaryWriter> for Vec<u8> {
    fn from(writer: BinaryWriter) -> Self {
        writer.into_vec()
    }
}
