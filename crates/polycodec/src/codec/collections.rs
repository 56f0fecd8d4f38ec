//! Lists and maps of values of another codec.
//!
//! Both are length-delimited on the wire. A list body repeats its elements
//! as field 1; a map body holds one length-delimited entry per key, each
//! entry carrying the key as field 1 and the value as field 2. Their string
//! form is their compact JSON form.
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use super::{ValueCodec, advance, current, from_json, read_fields, to_json, unexpected};
use crate::{
    error::CodecError,
    json::{CharSource, JsonReader, JsonToken, JsonWriter},
    wire::{
        ByteSink, ByteSource, WireType, WriteCache, key_len, read_length, skip_field, varint_len,
        write_key, write_varint,
    },
};

const ELEMENT: u32 = 1;
const ENTRY_KEY: u32 = 1;
const ENTRY_VALUE: u32 = 2;

/// A `Vec<T>` as a JSON array.
#[derive(Debug, Clone, Default)]
pub struct ListCodec<D> {
    element: D,
}

impl<D> ListCodec<D> {
    pub fn new(element: D) -> Self {
        Self { element }
    }
}

impl<T, C, D> ValueCodec<Vec<T>, C> for ListCodec<D>
where
    D: ValueCodec<T, C>,
{
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(&self, value: &Vec<T>, context: &mut C) -> Result<String, CodecError> {
        to_json(self, value, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<Vec<T>, CodecError> {
        from_json(self, text, context)
    }

    fn write_json_value(
        &self,
        value: &Vec<T>,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        writer.write_start_array()?;
        for item in value {
            self.element.write_json_value(item, writer, context)?;
        }
        Ok(writer.write_end_array()?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<Vec<T>, CodecError> {
        match current(reader)? {
            JsonToken::StartArray => {}
            token => return Err(unexpected("an array", token)),
        }
        let mut items = Vec::new();
        loop {
            if let JsonToken::EndArray = advance(reader)? {
                return Ok(items);
            }
            items.push(self.element.read_json(reader, context)?);
        }
    }

    fn calculate_transport_byte_length(
        &self,
        value: &Vec<T>,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        value.iter().try_fold(0, |total, item| {
            let length = self
                .element
                .calculate_transport_byte_length_with_key(ELEMENT, item, cache, context)?;
            Ok(total + length)
        })
    }

    fn write_transport_bytes(
        &self,
        value: &Vec<T>,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        for item in value {
            self.element
                .write_transport_bytes_with_key(ELEMENT, item, cache, sink, context)?;
        }
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<Vec<T>, CodecError> {
        let mut items = Vec::new();
        read_fields(length, source, |key, source| {
            if key.index == ELEMENT {
                items.push(self.element.read_field_value(key.wire_type, source, context)?);
            } else {
                skip_field(key.wire_type, source)?;
            }
            Ok(())
        })?;
        Ok(items)
    }
}

/// A `BTreeMap<K, V>` as a JSON object. Keys go through their codec's string
/// form to become field names.
#[derive(Debug, Clone, Default)]
pub struct MapCodec<KD, VD> {
    key: KD,
    value: VD,
}

impl<KD, VD> MapCodec<KD, VD> {
    pub fn new(key: KD, value: VD) -> Self {
        Self { key, value }
    }
}

impl<K, V, C, KD, VD> ValueCodec<BTreeMap<K, V>, C> for MapCodec<KD, VD>
where
    K: Ord,
    KD: ValueCodec<K, C>,
    VD: ValueCodec<V, C>,
{
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(
        &self,
        value: &BTreeMap<K, V>,
        context: &mut C,
    ) -> Result<String, CodecError> {
        to_json(self, value, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<BTreeMap<K, V>, CodecError> {
        from_json(self, text, context)
    }

    fn write_json_value(
        &self,
        value: &BTreeMap<K, V>,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        writer.write_start_object()?;
        for (k, v) in value {
            let name = self.key.to_string_form(k, context)?;
            writer.write_field_name(&name)?;
            self.value.write_json_value(v, writer, context)?;
        }
        Ok(writer.write_end_object()?)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<BTreeMap<K, V>, CodecError> {
        match current(reader)? {
            JsonToken::StartObject => {}
            token => return Err(unexpected("an object", token)),
        }
        let mut map = BTreeMap::new();
        loop {
            let key = match advance(reader)? {
                JsonToken::EndObject => return Ok(map),
                JsonToken::FieldName(name) => self.key.from_string_form(name, context)?,
                token => return Err(unexpected("a field name", token)),
            };
            advance(reader)?;
            let value = self.value.read_json(reader, context)?;
            map.insert(key, value);
        }
    }

    fn calculate_transport_byte_length(
        &self,
        value: &BTreeMap<K, V>,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        let mut total = 0;
        for (k, v) in value {
            let slot = cache.reserve();
            let entry = self
                .key
                .calculate_transport_byte_length_with_key(ENTRY_KEY, k, cache, context)?
                + self
                    .value
                    .calculate_transport_byte_length_with_key(ENTRY_VALUE, v, cache, context)?;
            cache.fill(slot, entry);
            total += key_len(ELEMENT) + varint_len(entry as u64) + entry;
        }
        Ok(total)
    }

    fn write_transport_bytes(
        &self,
        value: &BTreeMap<K, V>,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        for (k, v) in value {
            write_key(ELEMENT, WireType::LengthDelimited, sink);
            write_varint(cache.next_length()? as u64, sink);
            self.key
                .write_transport_bytes_with_key(ENTRY_KEY, k, cache, sink, context)?;
            self.value
                .write_transport_bytes_with_key(ENTRY_VALUE, v, cache, sink, context)?;
        }
        Ok(())
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<BTreeMap<K, V>, CodecError> {
        let mut map = BTreeMap::new();
        read_fields(length, source, |key, source| {
            if key.index != ELEMENT || key.wire_type != WireType::LengthDelimited {
                return Ok(skip_field(key.wire_type, source)?);
            }
            let entry_length = read_length(source)?;
            let mut entry_key = None;
            let mut entry_value = None;
            read_fields(entry_length, source, |field, source| {
                match field.index {
                    ENTRY_KEY => {
                        entry_key =
                            Some(self.key.read_field_value(field.wire_type, source, context)?);
                    }
                    ENTRY_VALUE => {
                        entry_value =
                            Some(self.value.read_field_value(field.wire_type, source, context)?);
                    }
                    _ => skip_field(field.wire_type, source)?,
                }
                Ok(())
            })?;
            match (entry_key, entry_value) {
                (Some(k), Some(v)) => {
                    map.insert(k, v);
                    Ok(())
                }
                _ => Err(CodecError::invalid("entry without key or value", "map entry")),
            }
        })?;
        Ok(map)
    }
}
