use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Largest QString payload accepted, in bytes.
pub const MAX_STRING_BYTES: u32 = 10_000_000;

/// Length prefix marking a null QString.
pub const NULL_STRING: u32 = 0xFFFF_FFFF;

/// Forward-only big-endian reader over a Qt data stream
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor over `data` starting at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos: pos.min(data.len()) }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Whether at least `n` more bytes are available.
    pub fn has(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::truncated(self.pos, n, self.remaining()));
        }
        Ok(())
    }

    /// Next `n` bytes without advancing.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        Ok(&self.data[self.pos..self.pos + n])
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(BigEndian::read_u64(self.read_bytes(8)?)))
    }

    /// Read a QString: u32 byte length (0xFFFFFFFF = null), then UTF-16BE code units.
    ///
    /// The length is validated before any payload byte is consumed.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u32()?;
        if len == NULL_STRING {
            return Ok(String::new());
        }
        if len % 2 != 0 {
            return Err(Error::malformed(start, format!("odd UTF-16 byte length {len}")));
        }
        if len > MAX_STRING_BYTES {
            return Err(Error::malformed(
                start,
                format!("string length {len} exceeds {MAX_STRING_BYTES}"),
            ));
        }
        let bytes = self.read_bytes(len as usize)?;
        let units = bytes.chunks_exact(2).map(BigEndian::read_u16);
        Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    }

    /// Read a single-byte length-prefixed UTF-8 string (legacy sub-format).
    pub fn read_short_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
