//! Codecs for single values: booleans, integers, floats and strings.
//!
//! Signed integers are zigzag encoded on the wire. Floats use the fixed
//! width wire types; in JSON, values that JSON numbers cannot carry (`NaN`
//! and the infinities) are written as strings and read back from strings.
//! Numeric readers also accept their value quoted.
use alloc::{
    format,
    string::{String, ToString},
};
use core::fmt;

use super::{ValueCodec, current, unexpected};
use crate::{
    error::{CodecError, WireError},
    json::{CharSource, JsonReader, JsonToken, JsonWriter, ValueType},
    wire::{
        ByteSink, ByteSource, WireType, WriteCache, decode_zigzag, decode_zigzag32,
        encode_zigzag, encode_zigzag32, read_exact, read_fixed32, read_fixed64, read_varint,
        read_varint_u32, varint_len, write_fixed32, write_fixed64, write_varint,
    },
};

/// Raw text of a scalar token whose type is one of `accepts`.
fn scalar_text<'t>(
    token: &'t JsonToken,
    accepts: &[ValueType],
    expected: &'static str,
) -> Result<&'t str, CodecError> {
    match token {
        JsonToken::Value { raw, value_type } if accepts.contains(value_type) => Ok(raw),
        other => Err(unexpected(expected, other)),
    }
}

macro_rules! varint_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $to_wire:expr, $from_wire:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<C> ValueCodec<$ty, C> for $name {
            fn wire_type(&self) -> WireType {
                WireType::Varint
            }

            fn to_string_form(&self, value: &$ty, _: &mut C) -> Result<String, CodecError> {
                Ok(value.to_string())
            }

            fn from_string_form(&self, text: &str, _: &mut C) -> Result<$ty, CodecError> {
                text.parse()
                    .map_err(|_| CodecError::invalid(text, stringify!($ty)))
            }

            fn write_json_value(
                &self,
                value: &$ty,
                writer: &mut JsonWriter<dyn fmt::Write + '_>,
                _: &mut C,
            ) -> Result<(), CodecError> {
                Ok(writer.write_value(&value.to_string())?)
            }

            fn read_json(
                &self,
                reader: &mut JsonReader<dyn CharSource + '_>,
                _: &mut C,
            ) -> Result<$ty, CodecError> {
                let text = scalar_text(
                    current(reader)?,
                    &[ValueType::Int, ValueType::String],
                    "an integer",
                )?;
                text.parse()
                    .map_err(|_| CodecError::invalid(text, stringify!($ty)))
            }

            fn calculate_transport_byte_length(
                &self,
                value: &$ty,
                _: &mut WriteCache,
                _: &mut C,
            ) -> Result<usize, CodecError> {
                Ok(varint_len(($to_wire)(*value)))
            }

            fn write_transport_bytes(
                &self,
                value: &$ty,
                _: &mut WriteCache,
                sink: &mut dyn ByteSink,
                _: &mut C,
            ) -> Result<(), CodecError> {
                write_varint(($to_wire)(*value), sink);
                Ok(())
            }

            fn read_transport_bytes(
                &self,
                _: usize,
                source: &mut dyn ByteSource,
                _: &mut C,
            ) -> Result<$ty, CodecError> {
                Ok(($from_wire)(source)?)
            }
        }
    };
}

varint_codec!(
    /// `i32`, zigzag encoded.
    SInt32Codec,
    i32,
    |v: i32| u64::from(encode_zigzag32(v)),
    |source: &mut dyn ByteSource| -> Result<i32, WireError> {
        read_varint_u32(source).map(decode_zigzag32)
    }
);

varint_codec!(
    /// `i64`, zigzag encoded.
    SInt64Codec,
    i64,
    encode_zigzag,
    |source: &mut dyn ByteSource| -> Result<i64, WireError> {
        read_varint(source).map(decode_zigzag)
    }
);

varint_codec!(UInt32Codec, u32, u64::from, read_varint_u32);

varint_codec!(UInt64Codec, u64, |v: u64| v, read_varint);

macro_rules! float_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $wire:ident, $width:literal, $write:ident, $read:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<C> ValueCodec<$ty, C> for $name {
            fn wire_type(&self) -> WireType {
                WireType::$wire
            }

            fn to_string_form(&self, value: &$ty, _: &mut C) -> Result<String, CodecError> {
                Ok(format!("{value}"))
            }

            fn from_string_form(&self, text: &str, _: &mut C) -> Result<$ty, CodecError> {
                text.parse()
                    .map_err(|_| CodecError::invalid(text, stringify!($ty)))
            }

            fn write_json_value(
                &self,
                value: &$ty,
                writer: &mut JsonWriter<dyn fmt::Write + '_>,
                _: &mut C,
            ) -> Result<(), CodecError> {
                let text = format!("{value}");
                if value.is_finite() {
                    writer.write_value(&text)?;
                } else {
                    writer.write_string(&text)?;
                }
                Ok(())
            }

            fn read_json(
                &self,
                reader: &mut JsonReader<dyn CharSource + '_>,
                _: &mut C,
            ) -> Result<$ty, CodecError> {
                let text = scalar_text(
                    current(reader)?,
                    &[ValueType::Int, ValueType::Float, ValueType::String],
                    "a number",
                )?;
                text.parse()
                    .map_err(|_| CodecError::invalid(text, stringify!($ty)))
            }

            fn calculate_transport_byte_length(
                &self,
                _: &$ty,
                _: &mut WriteCache,
                _: &mut C,
            ) -> Result<usize, CodecError> {
                Ok($width)
            }

            fn write_transport_bytes(
                &self,
                value: &$ty,
                _: &mut WriteCache,
                sink: &mut dyn ByteSink,
                _: &mut C,
            ) -> Result<(), CodecError> {
                $write(value.to_bits(), sink);
                Ok(())
            }

            fn read_transport_bytes(
                &self,
                _: usize,
                source: &mut dyn ByteSource,
                _: &mut C,
            ) -> Result<$ty, CodecError> {
                Ok(<$ty>::from_bits($read(source)?))
            }
        }
    };
}

float_codec!(
    /// `f32` as four little endian bytes.
    Float32Codec,
    f32,
    Bit32,
    4,
    write_fixed32,
    read_fixed32
);

float_codec!(
    /// `f64` as eight little endian bytes.
    Float64Codec,
    f64,
    Bit64,
    8,
    write_fixed64,
    read_fixed64
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanCodec;

impl<C> ValueCodec<bool, C> for BooleanCodec {
    fn wire_type(&self) -> WireType {
        WireType::Varint
    }

    fn to_string_form(&self, value: &bool, _: &mut C) -> Result<String, CodecError> {
        Ok(value.to_string())
    }

    fn from_string_form(&self, text: &str, _: &mut C) -> Result<bool, CodecError> {
        match text {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CodecError::invalid(other, "bool")),
        }
    }

    fn write_json_value(
        &self,
        value: &bool,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        _: &mut C,
    ) -> Result<(), CodecError> {
        Ok(writer.write_value(if *value { "true" } else { "false" })?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<bool, CodecError> {
        let text = scalar_text(
            current(reader)?,
            &[ValueType::Bool, ValueType::String],
            "a boolean",
        )?;
        self.from_string_form(text, context)
    }

    fn calculate_transport_byte_length(
        &self,
        _: &bool,
        _: &mut WriteCache,
        _: &mut C,
    ) -> Result<usize, CodecError> {
        Ok(1)
    }

    fn write_transport_bytes(
        &self,
        value: &bool,
        _: &mut WriteCache,
        sink: &mut dyn ByteSink,
        _: &mut C,
    ) -> Result<(), CodecError> {
        write_varint(u64::from(*value), sink);
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        _: usize,
        source: &mut dyn ByteSource,
        _: &mut C,
    ) -> Result<bool, CodecError> {
        match read_varint(source)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::invalid(other.to_string(), "bool")),
        }
    }
}

/// UTF-8 text; length-delimited on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringCodec;

impl<C> ValueCodec<String, C> for StringCodec {
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(&self, value: &String, _: &mut C) -> Result<String, CodecError> {
        Ok(value.clone())
    }

    fn from_string_form(&self, text: &str, _: &mut C) -> Result<String, CodecError> {
        Ok(text.into())
    }

    fn write_json_value(
        &self,
        value: &String,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        _: &mut C,
    ) -> Result<(), CodecError> {
        Ok(writer.write_string(value)?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        _: &mut C,
    ) -> Result<String, CodecError> {
        let text = scalar_text(current(reader)?, &[ValueType::String], "a string")?;
        Ok(text.into())
    }

    fn calculate_transport_byte_length(
        &self,
        value: &String,
        _: &mut WriteCache,
        _: &mut C,
    ) -> Result<usize, CodecError> {
        Ok(value.len())
    }

    fn write_transport_bytes(
        &self,
        value: &String,
        _: &mut WriteCache,
        sink: &mut dyn ByteSink,
        _: &mut C,
    ) -> Result<(), CodecError> {
        sink.write_bytes(value.as_bytes());
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        _: &mut C,
    ) -> Result<String, CodecError> {
        let bytes = read_exact(source, length)?;
        String::from_utf8(bytes).map_err(|err| {
            CodecError::invalid(
                String::from_utf8_lossy(err.as_bytes()).into_owned(),
                "utf-8 string",
            )
        })
    }
}
