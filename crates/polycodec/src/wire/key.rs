//! Field tags: `(index << 3) | wire_type`, written as a varint.
use core::fmt;

use super::{
    io::{ByteSink, ByteSource},
    varint::{read_fixed32, read_fixed64, read_length, read_varint, varint_len, write_varint},
};
use crate::error::WireError;

/// How the bytes of a field are framed.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// A varint.
    Varint = 0,
    /// Eight little endian bytes.
    Bit64 = 1,
    /// A varint length followed by that many bytes.
    LengthDelimited = 2,
    /// Four little endian bytes.
    Bit32 = 5,
}

impl WireType {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Bit64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Bit32),
            other => Err(WireError::UnknownWireType(other)),
        }
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    pub index: u32,
    pub wire_type: WireType,
}

impl FieldKey {
    #[must_use]
    pub fn new(index: u32, wire_type: WireType) -> Self {
        Self { index, wire_type }
    }

    #[must_use]
    pub fn tag(self) -> u64 {
        (u64::from(self.index) << 3) | self.wire_type as u64
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.index, self.wire_type)
    }
}

pub fn write_key(index: u32, wire_type: WireType, sink: &mut dyn ByteSink) {
    write_varint(FieldKey::new(index, wire_type).tag(), sink);
}

pub fn read_key(source: &mut dyn ByteSource) -> Result<FieldKey, WireError> {
    let tag = read_varint(source)?;
    #[allow(clippy::cast_possible_truncation)]
    let wire_type = WireType::from_u8((tag & 0x07) as u8)?;
    let index = u32::try_from(tag >> 3).map_err(|_| WireError::OutOfRange {
        value: tag >> 3,
        target: "field index",
    })?;
    Ok(FieldKey { index, wire_type })
}

/// Bytes taken by the tag of field `index`; the wire type never changes it.
#[must_use]
pub fn key_len(index: u32) -> usize {
    varint_len(u64::from(index) << 3)
}

/// Reads past the value of a field whose index is not known.
pub fn skip_field(wire_type: WireType, source: &mut dyn ByteSource) -> Result<(), WireError> {
    match wire_type {
        WireType::Varint => read_varint(source).map(|_| ()),
        WireType::Bit64 => read_fixed64(source).map(|_| ()),
        WireType::Bit32 => read_fixed32(source).map(|_| ()),
        WireType::LengthDelimited => {
            let length = read_length(source)?;
            for _ in 0..length {
                source.read_byte()?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::wire::io::SliceSource;

    #[test]
    fn tag_layout() {
        let mut out = Vec::new();
        write_key(1, WireType::Varint, &mut out);
        write_key(2, WireType::LengthDelimited, &mut out);
        write_key(16, WireType::Bit32, &mut out);
        assert_eq!(out, [0x08, 0x12, 0x85, 0x01]);
        assert_eq!(key_len(15), 1);
        assert_eq!(key_len(16), 2);

        let mut source = SliceSource::new(&out);
        assert_eq!(read_key(&mut source), Ok(FieldKey::new(1, WireType::Varint)));
        assert_eq!(
            read_key(&mut source),
            Ok(FieldKey::new(2, WireType::LengthDelimited))
        );
        assert_eq!(read_key(&mut source), Ok(FieldKey::new(16, WireType::Bit32)));
    }

    #[test]
    fn unknown_wire_type() {
        let mut source = SliceSource::new(&[0x0B]);
        assert_eq!(read_key(&mut source), Err(WireError::UnknownWireType(3)));
    }

    #[test]
    fn skips_each_wire_type() {
        let bytes = [
            0xAC, 0x02, // varint 300
            1, 2, 3, 4, // bit32
            1, 2, 3, 4, 5, 6, 7, 8, // bit64
            2, 0xAA, 0xBB, // length delimited
            0x42,
        ];
        let mut source = SliceSource::new(&bytes);
        skip_field(WireType::Varint, &mut source).unwrap();
        skip_field(WireType::Bit32, &mut source).unwrap();
        skip_field(WireType::Bit64, &mut source).unwrap();
        skip_field(WireType::LengthDelimited, &mut source).unwrap();
        assert_eq!(source.read_byte(), Ok(0x42));
    }
}
