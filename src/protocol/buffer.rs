//! Buffer utilities for reading and writing MySQL text-protocol data.

use crate::error::{Error, Result};
use crate::protocol::constants::*;
use bytes::{BufMut, Bytes, BytesMut};

/// A buffer for reading MySQL packet payloads.
pub struct ReadBuffer {
    data: Bytes,
    pos: usize,
}

impl ReadBuffer {
    /// Create a new read buffer from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Get the current position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if the buffer has at least `n` bytes remaining.
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Peek at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    #[track_caller]
    fn ensure(&self, n: usize) -> Result<()> {
        if !self.has_remaining(n) {
            return Err(Error::BufferTooSmall {
                needed: n,
                available: self.remaining(),
                location: std::panic::Location::caller(),
            });
        }
        Ok(())
    }

    /// Skip `n` bytes.
    #[track_caller]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a single byte.
    #[track_caller]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let val = self.data[self.pos];
        self.pos += 1;
        Ok(val)
    }

    /// Read a little-endian u16.
    #[track_caller]
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let val = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(val)
    }

    /// Read a little-endian 3-byte integer.
    #[track_caller]
    pub fn read_u24_le(&mut self) -> Result<u32> {
        self.ensure(3)?;
        let val = u32::from_le_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            0,
        ]);
        self.pos += 3;
        Ok(val)
    }

    /// Read a little-endian u32.
    #[track_caller]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a little-endian u64.
    #[track_caller]
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.ensure(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read raw bytes without copying.
    #[track_caller]
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        let bytes = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(bytes)
    }

    /// Read a length-encoded integer.
    ///
    /// `0xFB` is the NULL marker and is rejected here; callers that accept
    /// NULL use [`read_lenenc_bytes_nullable`](Self::read_lenenc_bytes_nullable).
    pub fn read_lenenc_int(&mut self) -> Result<u64> {
        let first = self.read_u8()?;
        match first {
            0..=250 => Ok(first as u64),
            LENENC_U16_PREFIX => Ok(self.read_u16_le()? as u64),
            LENENC_U24_PREFIX => Ok(self.read_u24_le()? as u64),
            LENENC_U64_PREFIX => self.read_u64_le(),
            NULL_CELL_MARKER => Err(Error::protocol("NULL in length-encoded integer")),
            _ => Err(Error::protocol(format!(
                "Invalid length-encoded integer prefix: {:#04x}",
                first
            ))),
        }
    }

    /// Read length-encoded bytes.
    pub fn read_lenenc_bytes(&mut self) -> Result<Bytes> {
        let len = self.read_lenenc_int()?;
        let len = usize::try_from(len)
            .map_err(|_| Error::protocol(format!("Length {} exceeds address space", len)))?;
        self.read_bytes(len)
    }

    /// Read length-encoded bytes, mapping the `0xFB` marker to `None`.
    pub fn read_lenenc_bytes_nullable(&mut self) -> Result<Option<Bytes>> {
        if self.peek_u8() == Some(NULL_CELL_MARKER) {
            self.pos += 1;
            return Ok(None);
        }
        self.read_lenenc_bytes().map(Some)
    }

    /// Read a length-encoded string.
    /// Uses lossy UTF-8 conversion to handle odd charsets gracefully.
    pub fn read_lenenc_str(&mut self) -> Result<String> {
        let bytes = self.read_lenenc_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// A buffer for writing MySQL packet payloads.
pub struct WriteBuffer {
    data: BytesMut,
}

impl WriteBuffer {
    /// Create a new write buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new write buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the current length of the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the buffer contents as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Freeze the buffer into immutable bytes.
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.data.put_u8(val);
    }

    /// Write a little-endian u16.
    pub fn write_u16_le(&mut self, val: u16) {
        self.data.put_u16_le(val);
    }

    /// Write a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.data.put_u32_le(val);
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a length-encoded integer.
    pub fn write_lenenc_int(&mut self, val: u64) {
        if val < 251 {
            self.write_u8(val as u8);
        } else if val < 1 << 16 {
            self.write_u8(LENENC_U16_PREFIX);
            self.data.put_u16_le(val as u16);
        } else if val < 1 << 24 {
            self.write_u8(LENENC_U24_PREFIX);
            self.data.put_uint_le(val, 3);
        } else {
            self.write_u8(LENENC_U64_PREFIX);
            self.data.put_u64_le(val);
        }
    }

    /// Write length-encoded bytes.
    pub fn write_lenenc_bytes(&mut self, bytes: &[u8]) {
        self.write_lenenc_int(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Write a length-encoded string.
    pub fn write_lenenc_str(&mut self, s: &str) {
        self.write_lenenc_bytes(s.as_bytes());
    }

    /// Write a nullable cell (`0xFB` for NULL).
    pub fn write_lenenc_nullable(&mut self, cell: Option<&[u8]>) {
        match cell {
            Some(bytes) => self.write_lenenc_bytes(bytes),
            None => self.write_u8(NULL_CELL_MARKER),
        }
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
