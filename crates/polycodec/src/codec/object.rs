//! Records: [`Value::Record`]s described by a list of indexed, named fields.
//!
//! Fields are written in declaration order and read in the order they
//! appear in the input; a capturing field must therefore precede the fields
//! resolved from it in both. Fields the record does not declare are skipped
//! when reading, in JSON and on the wire alike. A field that is missing or
//! `Null` is not written.
use alloc::{collections::BTreeMap, format, string::String, sync::Arc, vec::Vec};
use core::fmt;

use tracing::trace;

use super::{ValueCodec, advance, current, from_json, read_fields, to_json, unexpected};
use crate::{
    error::CodecError,
    json::{CharSource, JsonReader, JsonToken, JsonWriter},
    value::Value,
    wire::{ByteSink, ByteSource, WireType, WriteCache, skip_field},
};

pub struct ObjectField<C> {
    pub index: u32,
    pub name: String,
    pub codec: Arc<dyn ValueCodec<Value, C>>,
}

impl<C> Clone for ObjectField<C> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            name: self.name.clone(),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<C> fmt::Debug for ObjectField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectField")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// # Examples
///
/// ```rust
/// use polycodec::{
///     Value,
///     codec::{ObjectCodec, StringCodec, UInt32Codec, from_json, to_json},
///     value::AsValue,
/// };
///
/// let codec = ObjectCodec::new()
///     .field(1, "name", AsValue::new(StringCodec))
///     .field(2, "size", AsValue::new(UInt32Codec));
/// let record = Value::from([(2, Value::from(3u32)), (1, Value::from("box"))]);
///
/// let text = to_json(&codec, &record, &mut ()).unwrap();
/// assert_eq!(text, r#"{"name":"box","size":3}"#);
/// let read = from_json(&codec, r#"{"size":3,"extra":[1,{"a":2}],"name":"box"}"#, &mut ());
/// assert_eq!(read.unwrap(), record);
/// ```
pub struct ObjectCodec<C = ()> {
    fields: Vec<ObjectField<C>>,
}

impl<C> ObjectCodec<C> {
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declares the next field.
    #[must_use]
    pub fn field<D>(mut self, index: u32, name: impl Into<String>, codec: D) -> Self
    where
        D: ValueCodec<Value, C> + 'static,
    {
        self.fields.push(ObjectField {
            index,
            name: name.into(),
            codec: Arc::new(codec),
        });
        self
    }

    pub fn fields(&self) -> &[ObjectField<C>] {
        &self.fields
    }

    fn by_name(&self, name: &str) -> Option<&ObjectField<C>> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn by_index(&self, index: u32) -> Option<&ObjectField<C>> {
        self.fields.iter().find(|field| field.index == index)
    }

    /// Declared fields present in `record`, in declaration order.
    fn present<'a>(
        &'a self,
        record: &'a BTreeMap<u32, Value>,
    ) -> impl Iterator<Item = (&'a ObjectField<C>, &'a Value)> {
        self.fields.iter().filter_map(|field| {
            record
                .get(&field.index)
                .filter(|value| !value.is_null())
                .map(|value| (field, value))
        })
    }
}

impl<C> Default for ObjectCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ObjectCodec<C> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<C> fmt::Debug for ObjectCodec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCodec")
            .field("fields", &self.fields)
            .finish()
    }
}

fn record(value: &Value) -> Result<&BTreeMap<u32, Value>, CodecError> {
    match value {
        Value::Record(fields) => Ok(fields),
        other => Err(CodecError::invalid(format!("{other:?}"), "record")),
    }
}

impl<C> ValueCodec<Value, C> for ObjectCodec<C> {
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(&self, value: &Value, context: &mut C) -> Result<String, CodecError> {
        to_json(self, value, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<Value, CodecError> {
        from_json(self, text, context)
    }

    fn write_json_value(
        &self,
        value: &Value,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        writer.write_start_object()?;
        for (field, value) in self.present(record(value)?) {
            writer.write_field_name(&field.name)?;
            field.codec.write_json_value(value, writer, context)?;
        }
        Ok(writer.write_end_object()?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<Value, CodecError> {
        match current(reader)? {
            JsonToken::StartObject => {}
            token => return Err(unexpected("an object", token)),
        }
        let mut fields = BTreeMap::new();
        advance(reader)?;
        loop {
            let field = match current(reader)? {
                JsonToken::EndObject => return Ok(Value::Record(fields)),
                JsonToken::FieldName(name) => match self.by_name(name) {
                    Some(field) => field,
                    None => {
                        trace!(field = %name, "skipping unknown field");
                        reader.skip_until_next_field(|_| {});
                        continue;
                    }
                },
                token => return Err(unexpected("a field name", token)),
            };
            advance(reader)?;
            fields.insert(field.index, field.codec.read_json(reader, context)?);
            advance(reader)?;
        }
    }

    fn calculate_transport_byte_length(
        &self,
        value: &Value,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        let mut total = 0;
        for (field, value) in self.present(record(value)?) {
            total += field
                .codec
                .calculate_transport_byte_length_with_key(field.index, value, cache, context)?;
        }
        Ok(total)
    }

    fn write_transport_bytes(
        &self,
        value: &Value,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        for (field, value) in self.present(record(value)?) {
            field
                .codec
                .write_transport_bytes_with_key(field.index, value, cache, sink, context)?;
        }
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<Value, CodecError> {
        let mut fields = BTreeMap::new();
        read_fields(length, source, |key, source| {
            match self.by_index(key.index) {
                Some(field) => {
                    let value = field.codec.read_field_value(key.wire_type, source, context)?;
                    fields.insert(field.index, value);
                }
                None => {
                    trace!(index = key.index, "skipping unknown field");
                    skip_field(key.wire_type, source)?;
                }
            }
            Ok(())
        })?;
        Ok(Value::Record(fields))
    }
}
