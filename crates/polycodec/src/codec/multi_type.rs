//! Discriminated unions: a value tagged with the enum case that says how to
//! encode it.
//!
//! The enum implements [`TypeEnum`] for its identity (index and name) and
//! [`MultiTypeEnum`] to hand out the payload codec of each case.
//!
//! Encodings of a [`TypedValue`]:
//!
//! - JSON, array form: `["circle", 1.5]`. The case may also be read by index,
//!   `[1, 1.5]`.
//! - JSON, map form: `{"circle": 1.5}`.
//! - string form: `circle:1.5`.
//! - binary: a length-delimited body holding the payload as the field whose
//!   index is the case index.
//!
//! A case identifier no case matches is [`CodecError::UnknownTypeCase`].
use alloc::{format, string::String, string::ToString, sync::Arc};
use core::{fmt, marker::PhantomData};

use tracing::debug;

use super::{ValueCodec, advance, current, read_fields, unexpected};
use crate::{
    error::CodecError,
    json::{CharSource, JsonReader, JsonToken, JsonWriter, ValueType},
    wire::{
        ByteSink, ByteSource, WireType, WriteCache, read_varint_u32, skip_field, varint_len,
        write_varint,
    },
};

/// A closed set of cases, each with a stable index and name.
pub trait TypeEnum: Copy + PartialEq + fmt::Debug + 'static {
    fn index(self) -> u32;

    fn name(self) -> &'static str;

    fn cases() -> &'static [Self];

    fn from_index(index: u32) -> Option<Self> {
        Self::cases().iter().copied().find(|case| case.index() == index)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::cases().iter().copied().find(|case| case.name() == name)
    }
}

/// A [`TypeEnum`] whose cases carry the codec of their payload.
pub trait MultiTypeEnum<T, C>: TypeEnum {
    fn definition(self) -> Arc<dyn ValueCodec<T, C>>;
}

/// A payload and the case it belongs to.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue<E, T> {
    pub case: E,
    pub value: T,
}

impl<E, T> TypedValue<E, T> {
    pub fn new(case: E, value: T) -> Self {
        Self { case, value }
    }
}

/// JSON shape written by [`MultiTypeCodec`]. Both are always accepted when
/// reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypedJsonForm {
    /// `[case, payload]`, used for list elements.
    #[default]
    Array,
    /// `{case: payload}`.
    Map,
}

fn case_by_name<E: TypeEnum>(name: &str) -> Result<E, CodecError> {
    E::from_name(name).ok_or_else(|| {
        debug!(case = name, "unknown type case");
        CodecError::UnknownTypeCase(name.into())
    })
}

fn case_by_index<E: TypeEnum>(index: u32) -> Result<E, CodecError> {
    E::from_index(index).ok_or_else(|| {
        debug!(index, "unknown type case");
        CodecError::UnknownTypeCase(index.to_string())
    })
}

/// Reads a case written as its name, or as its index.
fn read_case<E: TypeEnum>(token: &JsonToken) -> Result<E, CodecError> {
    match token {
        JsonToken::Value {
            raw,
            value_type: ValueType::String,
        } => case_by_name(raw),
        JsonToken::Value {
            raw,
            value_type: ValueType::Int,
        } => {
            let index = raw
                .parse()
                .map_err(|_| CodecError::UnknownTypeCase(raw.clone()))?;
            case_by_index(index)
        }
        token => Err(unexpected("a type case", token)),
    }
}

pub struct MultiTypeCodec<E> {
    form: TypedJsonForm,
    _case: PhantomData<fn() -> E>,
}

impl<E> MultiTypeCodec<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_json_form(TypedJsonForm::default())
    }

    #[must_use]
    pub fn with_json_form(form: TypedJsonForm) -> Self {
        Self {
            form,
            _case: PhantomData,
        }
    }
}

impl<E> Default for MultiTypeCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for MultiTypeCodec<E> {
    fn clone(&self) -> Self {
        Self::with_json_form(self.form)
    }
}

impl<E> fmt::Debug for MultiTypeCodec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTypeCodec")
            .field("form", &self.form)
            .finish()
    }
}

impl<E, T, C> ValueCodec<TypedValue<E, T>, C> for MultiTypeCodec<E>
where
    E: MultiTypeEnum<T, C>,
{
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(
        &self,
        value: &TypedValue<E, T>,
        context: &mut C,
    ) -> Result<String, CodecError> {
        let payload = value
            .case
            .definition()
            .to_string_form(&value.value, context)?;
        Ok(format!("{}:{payload}", value.case.name()))
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<TypedValue<E, T>, CodecError> {
        let (name, payload) = text
            .split_once(':')
            .ok_or_else(|| CodecError::invalid(text, "typed value"))?;
        let case: E = case_by_name(name)?;
        let value = case.definition().from_string_form(payload, context)?;
        Ok(TypedValue { case, value })
    }

    fn write_json_value(
        &self,
        value: &TypedValue<E, T>,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        let definition = value.case.definition();
        match self.form {
            TypedJsonForm::Array => {
                writer.write_start_array()?;
                writer.write_string(value.case.name())?;
                definition.write_json_value(&value.value, writer, context)?;
                writer.write_end_array()?;
            }
            TypedJsonForm::Map => {
                writer.write_start_object()?;
                writer.write_field_name(value.case.name())?;
                definition.write_json_value(&value.value, writer, context)?;
                writer.write_end_object()?;
            }
        }
        Ok(())
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<TypedValue<E, T>, CodecError> {
        let form = match current(reader)? {
            JsonToken::StartArray => TypedJsonForm::Array,
            JsonToken::StartObject => TypedJsonForm::Map,
            token => return Err(unexpected("a typed value", token)),
        };
        let case: E = match (form, advance(reader)?) {
            (TypedJsonForm::Map, JsonToken::FieldName(name)) => case_by_name(name)?,
            (TypedJsonForm::Map, token) => return Err(unexpected("a type case name", token)),
            (TypedJsonForm::Array, token) => read_case(token)?,
        };
        advance(reader)?;
        let value = case.definition().read_json(reader, context)?;
        match (form, advance(reader)?) {
            (TypedJsonForm::Array, JsonToken::EndArray)
            | (TypedJsonForm::Map, JsonToken::EndObject) => Ok(TypedValue { case, value }),
            (_, token) => Err(unexpected("the end of the typed value", token)),
        }
    }

    fn calculate_transport_byte_length(
        &self,
        value: &TypedValue<E, T>,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        value.case.definition().calculate_transport_byte_length_with_key(
            value.case.index(),
            &value.value,
            cache,
            context,
        )
    }

    fn write_transport_bytes(
        &self,
        value: &TypedValue<E, T>,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        value.case.definition().write_transport_bytes_with_key(
            value.case.index(),
            &value.value,
            cache,
            sink,
            context,
        )
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<TypedValue<E, T>, CodecError> {
        let mut typed = None;
        read_fields(length, source, |key, source| {
            if typed.is_some() {
                return Ok(skip_field(key.wire_type, source)?);
            }
            let case: E = case_by_index(key.index)?;
            let value = case
                .definition()
                .read_field_value(key.wire_type, source, context)?;
            typed = Some(TypedValue { case, value });
            Ok(())
        })?;
        typed.ok_or_else(|| CodecError::invalid("empty body", "typed value"))
    }
}

/// The case of a [`TypeEnum`] on its own: its name in JSON and in the
/// string form, its index on the wire.
pub struct TypeEnumCodec<E> {
    _case: PhantomData<fn() -> E>,
}

impl<E> TypeEnumCodec<E> {
    #[must_use]
    pub fn new() -> Self {
        Self { _case: PhantomData }
    }
}

impl<E> Default for TypeEnumCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for TypeEnumCodec<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for TypeEnumCodec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeEnumCodec")
    }
}

impl<E: TypeEnum, C> ValueCodec<E, C> for TypeEnumCodec<E> {
    fn wire_type(&self) -> WireType {
        WireType::Varint
    }

    fn to_string_form(&self, value: &E, _: &mut C) -> Result<String, CodecError> {
        Ok(value.name().into())
    }

    fn from_string_form(&self, text: &str, _: &mut C) -> Result<E, CodecError> {
        case_by_name(text)
    }

    fn write_json_value(
        &self,
        value: &E,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        _: &mut C,
    ) -> Result<(), CodecError> {
        Ok(writer.write_string(value.name())?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        _: &mut C,
    ) -> Result<E, CodecError> {
        read_case(current(reader)?)
    }

    fn calculate_transport_byte_length(
        &self,
        value: &E,
        _: &mut WriteCache,
        _: &mut C,
    ) -> Result<usize, CodecError> {
        Ok(varint_len(u64::from(value.index())))
    }

    fn write_transport_bytes(
        &self,
        value: &E,
        _: &mut WriteCache,
        sink: &mut dyn ByteSink,
        _: &mut C,
    ) -> Result<(), CodecError> {
        write_varint(u64::from(value.index()), sink);
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        _: usize,
        source: &mut dyn ByteSource,
        _: &mut C,
    ) -> Result<E, CodecError> {
        case_by_index(read_varint_u32(source)?)
    }
}
