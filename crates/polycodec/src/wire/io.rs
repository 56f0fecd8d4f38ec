//! Byte sinks and sources for the binary wire form.
use alloc::vec::Vec;

use crate::error::WireError;

pub trait ByteSink {
    fn write_byte(&mut self, byte: u8);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.write_byte(*b);
        }
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) {
        self.push(byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

pub trait ByteSource {
    /// Next byte; running out of bytes is an error since binary input is
    /// always complete.
    fn read_byte(&mut self) -> Result<u8, WireError>;
}

/// Reads from an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> Result<u8, WireError> {
        let byte = *self
            .bytes
            .get(self.position)
            .ok_or(WireError::UnexpectedEnd)?;
        self.position += 1;
        Ok(byte)
    }
}

/// Counts the bytes read through it, so length-delimited bodies know when
/// they are done.
pub struct CountingSource<'a> {
    inner: &'a mut dyn ByteSource,
    read: usize,
}

impl<'a> CountingSource<'a> {
    pub fn new(inner: &'a mut dyn ByteSource) -> Self {
        Self { inner, read: 0 }
    }

    #[must_use]
    pub fn read(&self) -> usize {
        self.read
    }
}

impl ByteSource for CountingSource<'_> {
    fn read_byte(&mut self) -> Result<u8, WireError> {
        let byte = self.inner.read_byte()?;
        self.read += 1;
        Ok(byte)
    }
}

pub(crate) fn read_exact(
    source: &mut dyn ByteSource,
    length: usize,
) -> Result<Vec<u8>, WireError> {
    let mut bytes = Vec::with_capacity(length.min(4096));
    for _ in 0..length {
        bytes.push(source.read_byte()?);
    }
    Ok(bytes)
}
