//! Variable-length integers (LEB128) and zigzag mapping.
//!
//! Each byte carries 7 bits of data; the high bit says whether more bytes
//! follow. Signed values are zigzag mapped first so that small magnitudes of
//! either sign stay short: 0 → 0, -1 → 1, 1 → 2, -2 → 3, ...

use super::io::{ByteSink, ByteSource};
use crate::error::WireError;

/// Maximum bytes for a 64-bit varint (ceil(64/7) = 10).
pub const MAX_VARINT_BYTES: usize = 10;

pub fn write_varint(mut value: u64, sink: &mut dyn ByteSink) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            sink.write_byte(byte);
            return;
        }
        sink.write_byte(byte | 0x80);
    }
}

pub fn read_varint(source: &mut dyn ByteSource) -> Result<u64, WireError> {
    let mut result: u64 = 0;

    for position in 0..MAX_VARINT_BYTES {
        let shift = position * 7;
        let byte = source.read_byte()?;
        let value = u64::from(byte & 0x7F);

        // Only one bit of the tenth byte fits.
        if shift == 63 && value > 1 {
            return Err(WireError::VarintOverflow);
        }
        result |= value << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(WireError::VarintOverflow)
}

/// Reads a varint that must fit in 32 bits.
pub fn read_varint_u32(source: &mut dyn ByteSource) -> Result<u32, WireError> {
    let value = read_varint(source)?;
    u32::try_from(value).map_err(|_| WireError::OutOfRange {
        value,
        target: "u32",
    })
}

/// Reads a varint used as a byte length.
pub fn read_length(source: &mut dyn ByteSource) -> Result<usize, WireError> {
    let value = read_varint(source)?;
    usize::try_from(value).map_err(|_| WireError::OutOfRange {
        value,
        target: "usize",
    })
}

/// Number of bytes [`write_varint`] emits for `value`.
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7)
}

#[must_use]
pub const fn encode_zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[must_use]
pub const fn decode_zigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[must_use]
pub const fn encode_zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[must_use]
pub const fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

pub fn write_fixed32(value: u32, sink: &mut dyn ByteSink) {
    sink.write_bytes(&value.to_le_bytes());
}

pub fn write_fixed64(value: u64, sink: &mut dyn ByteSink) {
    sink.write_bytes(&value.to_le_bytes());
}

pub fn read_fixed32(source: &mut dyn ByteSource) -> Result<u32, WireError> {
    let mut bytes = [0u8; 4];
    for b in &mut bytes {
        *b = source.read_byte()?;
    }
    Ok(u32::from_le_bytes(bytes))
}

pub fn read_fixed64(source: &mut dyn ByteSource) -> Result<u64, WireError> {
    let mut bytes = [0u8; 8];
    for b in &mut bytes {
        *b = source.read_byte()?;
    }
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use rstest::rstest;

    use super::*;
    use crate::wire::io::SliceSource;

    #[rstest]
    #[case(0, &[0x00])]
    #[case(1, &[0x01])]
    #[case(127, &[0x7F])]
    #[case(128, &[0x80, 0x01])]
    #[case(300, &[0xAC, 0x02])]
    #[case(u64::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01])]
    fn varint_bytes(#[case] value: u64, #[case] expected: &[u8]) {
        let mut out = Vec::new();
        write_varint(value, &mut out);
        assert_eq!(out, expected);
        assert_eq!(varint_len(value), expected.len());
        assert_eq!(read_varint(&mut SliceSource::new(expected)), Ok(value));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(-1, 1)]
    #[case(1, 2)]
    #[case(-2, 3)]
    #[case(i64::MAX, u64::MAX - 1)]
    #[case(i64::MIN, u64::MAX)]
    fn zigzag_mapping(#[case] signed: i64, #[case] unsigned: u64) {
        assert_eq!(encode_zigzag(signed), unsigned);
        assert_eq!(decode_zigzag(unsigned), signed);
    }

    #[test]
    fn zigzag32_matches_64_bit_mapping_for_small_values() {
        for v in [-3i32, -1, 0, 1, 1000, i32::MIN, i32::MAX] {
            assert_eq!(u64::from(encode_zigzag32(v)), encode_zigzag(i64::from(v)));
            assert_eq!(decode_zigzag32(encode_zigzag32(v)), v);
        }
    }

    #[test]
    fn overlong_varint_is_rejected() {
        let bytes = vec![0xFF; MAX_VARINT_BYTES + 1];
        assert_eq!(
            read_varint(&mut SliceSource::new(&bytes)),
            Err(WireError::VarintOverflow)
        );

        // Ten bytes, but the last one carries more than the 64th bit.
        let mut bytes = vec![0xFF; MAX_VARINT_BYTES - 1];
        bytes.push(0x02);
        assert_eq!(
            read_varint(&mut SliceSource::new(&bytes)),
            Err(WireError::VarintOverflow)
        );
        assert_eq!(varint_len(u64::MAX), MAX_VARINT_BYTES);
    }

    #[test]
    fn truncated_varint_is_rejected() {
        assert_eq!(
            read_varint(&mut SliceSource::new(&[0x80])),
            Err(WireError::UnexpectedEnd)
        );
    }
}
