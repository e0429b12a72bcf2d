//! Little-endian binary reader/writer with CompactSize variable-length
//! integers.
//!
//! Var-int encoding: values below `0xfd` take one byte; otherwise a marker
//! byte (`0xfd`, `0xfe`, `0xff`) is followed by a 2, 4 or 8 byte
//! little-endian integer. The reader rejects non-minimal encodings.

use crate::error::TransactionError;

#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_var_int(&mut self, v: u64) {
        if v < 0xfd {
            self.write_u8(v as u8);
        } else if v <= 0xffff {
            self.write_u8(0xfd);
            self.write_u16(v as u16);
        } else if v <= 0xffff_ffff {
            self.write_u8(0xfe);
            self.write_u32(v as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64(v);
        }
    }

    /// Var-int length prefix followed by the bytes.
    pub fn write_var_bytes(&mut self, data: &[u8]) {
        self.write_var_int(data.len() as u64);
        self.write_bytes(data);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed byte slice. Every read is bounds checked.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], TransactionError> {
        if n > self.remaining() {
            return Err(TransactionError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, TransactionError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, TransactionError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, TransactionError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, TransactionError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_var_int(&mut self) -> Result<u64, TransactionError> {
        let (value, min) = match self.read_u8()? {
            0xfd => (self.read_u16()? as u64, 0xfd),
            0xfe => (self.read_u32()? as u64, 0x1_0000),
            0xff => (self.read_u64()?, 0x1_0000_0000),
            b => return Ok(b as u64),
        };
        if value < min {
            return Err(TransactionError::NonCanonicalVarInt);
        }
        Ok(value)
    }

    /// Var-int length followed by that many bytes. The length is checked
    /// against the remaining input before allocating.
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, TransactionError> {
        let len = self.read_var_int()?;
        if len > self.remaining() as u64 {
            return Err(TransactionError::LengthTooLarge(len));
        }
        Ok(self.read_bytes(len as usize)?.to_vec())
    }

    /// Read a var-int element count, rejecting counts that could not fit in
    /// the remaining input at `min_item_len` bytes per element.
    pub fn read_count(&mut self, min_item_len: usize) -> Result<usize, TransactionError> {
        let count = self.read_var_int()?;
        let max = (self.remaining() / min_item_len.max(1)) as u64;
        if count > max {
            return Err(TransactionError::LengthTooLarge(count));
        }
        Ok(count as usize)
    }

    /// Require that all input has been consumed.
    pub fn finish(self) -> Result<(), TransactionError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(TransactionError::TrailingBytes(n)),
        }
    }
}
