//! Binary wire primitives: varints, zigzag, field tags and the write cache.
//!
//! The format is the Protocol Buffers subset with four wire types. A field is
//! a tag `(index << 3) | wire_type` followed by its value; length-delimited
//! values carry a leading varint length.
mod cache;
mod io;
mod key;
mod varint;

pub use cache::{CacheSlot, WriteCache};
pub(crate) use io::read_exact;
pub use io::{ByteSink, ByteSource, CountingSource, SliceSource};
pub use key::{FieldKey, WireType, key_len, read_key, skip_field, write_key};
pub use varint::{
    MAX_VARINT_BYTES, decode_zigzag, decode_zigzag32, encode_zigzag, encode_zigzag32,
    read_fixed32, read_fixed64, read_length, read_varint, read_varint_u32, varint_len,
    write_fixed32, write_fixed64, write_varint,
};
