//! The value-codec contract and the helpers built on it.
//!
//! A [`ValueCodec`] knows how to move one kind of value through three
//! independent encodings:
//!
//! - a string form, used for map keys and other places where a value has to
//!   fit in a single string,
//! - the streaming JSON form, driven through a [`JsonWriter`] and a
//!   [`JsonReader`],
//! - the binary wire form.
//!
//! Every operation carries a caller owned context `C`. Codecs that do not
//! care about it are generic over it; the wrappers in [`context`] read and
//! write it so that one field can decide how a later field is encoded.
//!
//! # Binary writing
//!
//! Binary output is produced in two passes. The length pass
//! ([`calculate_transport_byte_length`](ValueCodec::calculate_transport_byte_length))
//! measures the value and records the length of every length-delimited field
//! in a [`WriteCache`]; the write pass
//! ([`write_transport_bytes`](ValueCodec::write_transport_bytes)) takes those
//! lengths back in the same order to write the prefixes. Both passes must walk
//! the value identically.
//!
//! # JSON reading
//!
//! [`read_json`](ValueCodec::read_json) is entered with the reader positioned
//! on the first token of the value and returns with the reader on its last
//! token (the scalar itself, or the closing bracket).
//!
//! # Examples
//!
//! ```rust
//! use polycodec::codec::{
//!     ListCodec, SInt64Codec, from_json, from_transport_bytes, to_json, to_transport_bytes,
//! };
//!
//! let codec = ListCodec::new(SInt64Codec);
//! let values = vec![1, -2, 300];
//!
//! let text = to_json(&codec, &values, &mut ()).unwrap();
//! assert_eq!(text, "[1,-2,300]");
//! assert_eq!(from_json(&codec, &text, &mut ()).unwrap(), values);
//!
//! let bytes = to_transport_bytes(&codec, &values, &mut ()).unwrap();
//! assert_eq!(bytes, [0x08, 0x02, 0x08, 0x03, 0x08, 0xD8, 0x04]);
//! assert_eq!(from_transport_bytes(&codec, &bytes, &mut ()).unwrap(), values);
//! ```
use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

use crate::{
    error::{CodecError, JsonWriteError, WireError},
    json::{CharSource, JsonReader, JsonToken, JsonWriter, StrSource, WriterOptions},
    wire::{
        ByteSink, ByteSource, CountingSource, FieldKey, SliceSource, WriteCache, key_len,
        read_key, read_length, varint_len, write_key, write_varint,
    },
};

mod collections;
pub mod context;
mod multi_type;
mod object;
mod scalars;

pub use collections::{ListCodec, MapCodec};
pub use context::{Capturing, Resolving};
pub use multi_type::{
    MultiTypeCodec, MultiTypeEnum, TypeEnum, TypeEnumCodec, TypedJsonForm, TypedValue,
};
pub use object::{ObjectCodec, ObjectField};
pub use scalars::{
    BooleanCodec, Float32Codec, Float64Codec, SInt32Codec, SInt64Codec, StringCodec,
    UInt32Codec, UInt64Codec,
};

pub use crate::wire::WireType;

/// Encodes and decodes values of type `T` with a context of type `C`.
///
/// The trait is object safe; heterogeneous fields are held as
/// `Arc<dyn ValueCodec<T, C>>`.
pub trait ValueCodec<T, C = ()> {
    /// How this codec frames its value when it is a field of a message.
    fn wire_type(&self) -> WireType;

    fn to_string_form(&self, value: &T, context: &mut C) -> Result<String, CodecError>;

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<T, CodecError>;

    fn write_json_value(
        &self,
        value: &T,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError>;

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<T, CodecError>;

    /// Length pass. Returns the size of the value's own bytes, without any
    /// tag or length prefix.
    fn calculate_transport_byte_length(
        &self,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError>;

    /// Write pass. Writes the value's own bytes, without any tag or length
    /// prefix.
    fn write_transport_bytes(
        &self,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError>;

    /// Reads the value's own bytes. `length` is the body length for
    /// length-delimited values and the width for fixed ones; varints ignore
    /// it.
    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError>;

    /// Length pass for the value as field `index`: tag, length prefix and
    /// body. A length-delimited field reserves its cache slot before its
    /// children are measured.
    fn calculate_transport_byte_length_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        if self.wire_type() == WireType::LengthDelimited {
            let slot = cache.reserve();
            let length = self.calculate_transport_byte_length(value, cache, context)?;
            cache.fill(slot, length);
            Ok(key_len(index) + varint_len(length as u64) + length)
        } else {
            Ok(key_len(index) + self.calculate_transport_byte_length(value, cache, context)?)
        }
    }

    /// Write pass for the value as field `index`.
    fn write_transport_bytes_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        let wire_type = self.wire_type();
        write_key(index, wire_type, sink);
        if wire_type == WireType::LengthDelimited {
            write_varint(cache.next_length()? as u64, sink);
        }
        self.write_transport_bytes(value, cache, sink, context)
    }

    /// Reads a field value whose tag has just been read.
    fn read_field_value(
        &self,
        wire_type: WireType,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        let expected = self.wire_type();
        if wire_type != expected {
            return Err(WireError::WireTypeMismatch {
                expected,
                actual: wire_type,
            }
            .into());
        }
        let length = match wire_type {
            WireType::LengthDelimited => read_length(source)?,
            WireType::Bit32 => 4,
            WireType::Bit64 => 8,
            WireType::Varint => 0,
        };
        self.read_transport_bytes(length, source, context)
    }
}

impl<T, C, D> ValueCodec<T, C> for Arc<D>
where
    D: ValueCodec<T, C> + ?Sized,
{
    fn wire_type(&self) -> WireType {
        (**self).wire_type()
    }

    fn to_string_form(&self, value: &T, context: &mut C) -> Result<String, CodecError> {
        (**self).to_string_form(value, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<T, CodecError> {
        (**self).from_string_form(text, context)
    }

    fn write_json_value(
        &self,
        value: &T,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        (**self).write_json_value(value, writer, context)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<T, CodecError> {
        (**self).read_json(reader, context)
    }

    fn calculate_transport_byte_length(
        &self,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        (**self).calculate_transport_byte_length(value, cache, context)
    }

    fn write_transport_bytes(
        &self,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        (**self).write_transport_bytes(value, cache, sink, context)
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        (**self).read_transport_bytes(length, source, context)
    }

    fn calculate_transport_byte_length_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        (**self).calculate_transport_byte_length_with_key(index, value, cache, context)
    }

    fn write_transport_bytes_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        (**self).write_transport_bytes_with_key(index, value, cache, sink, context)
    }

    fn read_field_value(
        &self,
        wire_type: WireType,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        (**self).read_field_value(wire_type, source, context)
    }
}

/// Writes `value` as a compact JSON document.
pub fn to_json<T, C, D>(codec: &D, value: &T, context: &mut C) -> Result<String, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    to_json_with_options(codec, value, context, WriterOptions::default())
}

pub fn to_json_with_options<T, C, D>(
    codec: &D,
    value: &T,
    context: &mut C,
    options: WriterOptions,
) -> Result<String, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    let mut writer = JsonWriter::with_options(String::new(), options);
    codec.write_json_value(value, &mut writer, context)?;
    if !writer.is_complete() {
        return Err(
            JsonWriteError::IllegalOperation("the value did not form a complete document").into(),
        );
    }
    Ok(writer.into_inner())
}

/// Reads one JSON document holding a value of `codec`.
///
/// The text must be complete: running out of input is
/// [`CodecError::IncompleteInput`].
pub fn from_json<T, C, D>(codec: &D, text: &str, context: &mut C) -> Result<T, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    let mut reader = JsonReader::new(StrSource::new(text));
    read_json_document(codec, &mut reader, context)
}

/// Reads one document from `reader`, which must be at the start of it.
pub fn read_json_document<T, C, D>(
    codec: &D,
    reader: &mut JsonReader<dyn CharSource + '_>,
    context: &mut C,
) -> Result<T, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    advance(reader)?;
    let value = codec.read_json(reader, context)?;
    match reader.next_token() {
        JsonToken::EndDocument => Ok(value),
        token => Err(unexpected("end of document", token)),
    }
}

/// Runs both binary passes and returns the encoded value, without tag or
/// length prefix.
pub fn to_transport_bytes<T, C, D>(
    codec: &D,
    value: &T,
    context: &mut C,
) -> Result<Vec<u8>, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    let mut cache = WriteCache::new();
    let length = codec.calculate_transport_byte_length(value, &mut cache, context)?;
    let mut out = Vec::with_capacity(length);
    codec.write_transport_bytes(value, &mut cache, &mut out, context)?;
    if out.len() != length {
        return Err(WireError::LengthMismatch {
            expected: length,
            actual: out.len(),
        }
        .into());
    }
    cache.finish()?;
    Ok(out)
}

/// Decodes bytes written by [`to_transport_bytes`]; every byte must be used.
pub fn from_transport_bytes<T, C, D>(
    codec: &D,
    bytes: &[u8],
    context: &mut C,
) -> Result<T, CodecError>
where
    D: ValueCodec<T, C> + ?Sized,
{
    let mut source = SliceSource::new(bytes);
    let value = codec.read_transport_bytes(bytes.len(), &mut source, context)?;
    if !source.is_empty() {
        return Err(WireError::LengthMismatch {
            expected: bytes.len(),
            actual: source.position(),
        }
        .into());
    }
    Ok(value)
}

/// Advances and returns the new token, turning the non-content tokens into
/// errors.
pub(crate) fn advance<'r>(
    reader: &'r mut JsonReader<dyn CharSource + '_>,
) -> Result<&'r JsonToken, CodecError> {
    reader.next_token();
    current(reader)
}

pub(crate) fn current<'r>(
    reader: &'r JsonReader<dyn CharSource + '_>,
) -> Result<&'r JsonToken, CodecError> {
    match reader.current_token() {
        JsonToken::Suspended { .. } => Err(CodecError::IncompleteInput),
        JsonToken::JsonException(err) => Err(err.clone().into()),
        token => Ok(token),
    }
}

pub(crate) fn unexpected(expected: &'static str, found: &JsonToken) -> CodecError {
    match found {
        JsonToken::Suspended { .. } => CodecError::IncompleteInput,
        JsonToken::JsonException(err) => err.clone().into(),
        token => CodecError::UnexpectedToken {
            expected,
            found: alloc::format!("{token}"),
        },
    }
}

/// Reads the fields of a length-delimited body of `length` bytes, handing
/// each tag to `field` with the source positioned on the field value.
pub(crate) fn read_fields(
    length: usize,
    source: &mut dyn ByteSource,
    mut field: impl FnMut(FieldKey, &mut dyn ByteSource) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
    let mut body = CountingSource::new(source);
    while body.read() < length {
        let key = read_key(&mut body)?;
        field(key, &mut body)?;
    }
    if body.read() != length {
        return Err(WireError::LengthMismatch {
            expected: length,
            actual: body.read(),
        }
        .into());
    }
    Ok(())
}
