//! A dynamic value for models assembled at runtime.
//!
//! [`ObjectCodec`](crate::codec::ObjectCodec) reads and writes records of
//! `Value`s; [`AsValue`] lets any typed codec serve as one of its fields.
use alloc::{borrow::Cow, boxed::Box, collections::BTreeMap, format, string::String, vec::Vec};
use core::{fmt, marker::PhantomData};

use crate::{
    codec::{TypeEnum, TypedValue, ValueCodec},
    error::CodecError,
    json::{CharSource, JsonReader, JsonWriter},
    wire::{ByteSink, ByteSource, WireType, WriteCache},
};

#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value. A record field holding `Null` is treated as absent.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Fields by index.
    Record(BTreeMap<u32, Value>),
    /// A payload tagged with the index of its type case.
    Typed(u32, Box<Value>),
}

impl Value {
    /// The value of an enum case: its index.
    pub fn case<E: TypeEnum>(case: E) -> Self {
        Self::UInt(u64::from(case.index()))
    }

    pub fn to_case<E: TypeEnum>(&self) -> Result<E, CodecError> {
        match self {
            Self::UInt(index) => u32::try_from(*index)
                .ok()
                .and_then(E::from_index)
                .ok_or_else(|| CodecError::UnknownTypeCase(format!("{index}"))),
            other => Err(mismatch(other, "type case")),
        }
    }

    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(&index),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<const N: usize> From<[(u32, Value); N]> for Value {
    fn from(fields: [(u32, Value); N]) -> Self {
        Self::Record(fields.into_iter().collect())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

fn mismatch(value: &Value, target: &'static str) -> CodecError {
    CodecError::invalid(format!("{value:?}"), target)
}

/// Conversion between a typed value and [`Value`].
pub trait ValueKind: Clone {
    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self, CodecError>;

    /// Views `value` as `Self` for encoding. Strings and whole values are
    /// borrowed; lists and typed values are rebuilt.
    fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
        Self::from_value(value.clone()).map(Cow::Owned)
    }
}

macro_rules! value_kind {
    ($ty:ty, $variant:ident, $target:literal) => {
        impl ValueKind for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Result<Self, CodecError> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(mismatch(&other, $target)),
                }
            }

            fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
                match value {
                    Value::$variant(inner) => Ok(Cow::Borrowed(inner)),
                    other => Err(mismatch(other, $target)),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

/// 32-bit integers widen into the 64-bit variants and are range checked on
/// the way back.
macro_rules! narrow_value_kind {
    ($ty:ty, $variant:ident, $target:literal) => {
        impl ValueKind for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self.into())
            }

            fn from_value(value: Value) -> Result<Self, CodecError> {
                Self::from_value_ref(&value).map(Cow::into_owned)
            }

            fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
                match value {
                    Value::$variant(inner) => <$ty>::try_from(*inner)
                        .map(Cow::Owned)
                        .map_err(|_| CodecError::invalid(format!("{inner}"), $target)),
                    other => Err(mismatch(other, $target)),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                value.into_value()
            }
        }
    };
}

value_kind!(bool, Bool, "bool");
value_kind!(i64, Int, "i64");
value_kind!(u64, UInt, "u64");
value_kind!(f64, Float, "f64");
value_kind!(String, String, "string");
narrow_value_kind!(i32, Int, "i32");
narrow_value_kind!(u32, UInt, "u32");

impl ValueKind for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        Self::from_value_ref(&value).map(Cow::into_owned)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
        match value {
            Value::Float(inner) => Ok(Cow::Owned(*inner as f32)),
            other => Err(mismatch(other, "f32")),
        }
    }
}

impl ValueKind for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(value)
    }

    fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
        Ok(Cow::Borrowed(value))
    }
}

impl<T: ValueKind> ValueKind for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(ValueKind::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&other, "list")),
        }
    }

    fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| T::from_value_ref(item).map(Cow::into_owned))
                .collect::<Result<Vec<_>, _>>()
                .map(Cow::Owned),
            other => Err(mismatch(other, "list")),
        }
    }
}

impl<E: TypeEnum> ValueKind for TypedValue<E, Value> {
    fn into_value(self) -> Value {
        Value::Typed(self.case.index(), Box::new(self.value))
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Typed(index, inner) => {
                let case = E::from_index(index)
                    .ok_or_else(|| CodecError::UnknownTypeCase(format!("{index}")))?;
                Ok(TypedValue::new(case, *inner))
            }
            other => Err(mismatch(&other, "typed value")),
        }
    }

    fn from_value_ref(value: &Value) -> Result<Cow<'_, Self>, CodecError> {
        match value {
            Value::Typed(index, inner) => {
                let case = E::from_index(*index)
                    .ok_or_else(|| CodecError::UnknownTypeCase(format!("{index}")))?;
                Ok(Cow::Owned(TypedValue::new(case, Value::clone(inner))))
            }
            other => Err(mismatch(other, "typed value")),
        }
    }
}

/// Runs a codec for `T` on [`Value`]s, converting through [`ValueKind`].
pub struct AsValue<D, T> {
    inner: D,
    _value: PhantomData<fn() -> T>,
}

impl<D, T> AsValue<D, T> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            _value: PhantomData,
        }
    }
}

impl<D: Clone, T> Clone for AsValue<D, T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<D: fmt::Debug, T> fmt::Debug for AsValue<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AsValue").field(&self.inner).finish()
    }
}

impl<D, T, C> ValueCodec<Value, C> for AsValue<D, T>
where
    D: ValueCodec<T, C>,
    T: ValueKind,
{
    fn wire_type(&self) -> WireType {
        self.inner.wire_type()
    }

    fn to_string_form(&self, value: &Value, context: &mut C) -> Result<String, CodecError> {
        self.inner
            .to_string_form(&*T::from_value_ref(value)?, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<Value, CodecError> {
        Ok(self.inner.from_string_form(text, context)?.into_value())
    }

    fn write_json_value(
        &self,
        value: &Value,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.inner
            .write_json_value(&*T::from_value_ref(value)?, writer, context)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<Value, CodecError> {
        Ok(self.inner.read_json(reader, context)?.into_value())
    }

    fn calculate_transport_byte_length(
        &self,
        value: &Value,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        self.inner
            .calculate_transport_byte_length(&*T::from_value_ref(value)?, cache, context)
    }

    fn write_transport_bytes(
        &self,
        value: &Value,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.inner
            .write_transport_bytes(&*T::from_value_ref(value)?, cache, sink, context)
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<Value, CodecError> {
        Ok(self
            .inner
            .read_transport_bytes(length, source, context)?
            .into_value())
    }

    fn calculate_transport_byte_length_with_key(
        &self,
        index: u32,
        value: &Value,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        let typed = T::from_value_ref(value)?;
        self.inner
            .calculate_transport_byte_length_with_key(index, &typed, cache, context)
    }

    fn write_transport_bytes_with_key(
        &self,
        index: u32,
        value: &Value,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        let typed = T::from_value_ref(value)?;
        self.inner
            .write_transport_bytes_with_key(index, &typed, cache, sink, context)
    }

    fn read_field_value(
        &self,
        wire_type: WireType,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<Value, CodecError> {
        Ok(self
            .inner
            .read_field_value(wire_type, source, context)?
            .into_value())
    }
}
