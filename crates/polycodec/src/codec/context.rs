//! Codecs that read or write the operation context.
//!
//! [`Capturing`] stores what it sees into the context; [`Resolving`] picks
//! the codec for its value from the context at call time. Fields are always
//! processed in declaration order when writing and in input order when
//! reading, so a capturing field has to come before every field resolved
//! from it. A resolver that finds nothing in the context returns a
//! [`ContextError`], which is a defect in the model rather than in the data.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use polycodec::{
//!     CodecError, ContextError,
//!     codec::{Capturing, ListCodec, Resolving, UInt32Codec, ValueCodec, to_transport_bytes},
//! };
//!
//! #[derive(Default)]
//! struct Seen {
//!     last: Option<u32>,
//! }
//!
//! let remember = |seen: &mut Seen, value: &u32| -> Result<(), CodecError> {
//!     seen.last = Some(*value);
//!     Ok(())
//! };
//! let capture = Capturing::new(UInt32Codec, remember);
//! let resolve = Resolving::new(|seen: &Seen| match seen.last {
//!     Some(_) => Ok(Arc::new(UInt32Codec) as Arc<dyn ValueCodec<u32, Seen>>),
//!     None => Err(ContextError::Missing("last value")),
//! });
//!
//! let mut seen = Seen::default();
//! let bytes = to_transport_bytes(&ListCodec::new(capture), &vec![7], &mut seen).unwrap();
//! assert_eq!(bytes, [0x08, 0x07]);
//! assert_eq!(seen.last, Some(7));
//! assert!(to_transport_bytes(&ListCodec::new(resolve), &vec![1], &mut Seen::default()).is_err());
//! ```
use alloc::{string::String, sync::Arc};
use core::{fmt, marker::PhantomData};

use tracing::debug;

use super::ValueCodec;
use crate::{
    error::{CodecError, ContextError},
    json::{CharSource, JsonReader, JsonWriter},
    wire::{ByteSink, ByteSource, WireType, WriteCache},
};

/// Delegates to `inner` and hands every value it successfully writes or
/// reads to `capture`.
///
/// Both binary passes capture, so a context reset between the passes sees
/// the same values again.
#[derive(Clone)]
pub struct Capturing<D, F> {
    inner: D,
    capture: F,
}

impl<D, F> Capturing<D, F> {
    pub fn new(inner: D, capture: F) -> Self {
        Self { inner, capture }
    }
}

impl<D: fmt::Debug, F> fmt::Debug for Capturing<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capturing").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<T, C, D, F> ValueCodec<T, C> for Capturing<D, F>
where
    D: ValueCodec<T, C>,
    F: Fn(&mut C, &T) -> Result<(), CodecError>,
{
    fn wire_type(&self) -> WireType {
        self.inner.wire_type()
    }

    fn to_string_form(&self, value: &T, context: &mut C) -> Result<String, CodecError> {
        let text = self.inner.to_string_form(value, context)?;
        (self.capture)(context, value)?;
        Ok(text)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<T, CodecError> {
        let value = self.inner.from_string_form(text, context)?;
        (self.capture)(context, &value)?;
        Ok(value)
    }

    fn write_json_value(
        &self,
        value: &T,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.inner.write_json_value(value, writer, context)?;
        (self.capture)(context, value)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<T, CodecError> {
        let value = self.inner.read_json(reader, context)?;
        (self.capture)(context, &value)?;
        Ok(value)
    }

    fn calculate_transport_byte_length(
        &self,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        let length = self
            .inner
            .calculate_transport_byte_length(value, cache, context)?;
        (self.capture)(context, value)?;
        Ok(length)
    }

    fn write_transport_bytes(
        &self,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.inner.write_transport_bytes(value, cache, sink, context)?;
        (self.capture)(context, value)
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        let value = self.inner.read_transport_bytes(length, source, context)?;
        (self.capture)(context, &value)?;
        Ok(value)
    }

    fn calculate_transport_byte_length_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        let length = self
            .inner
            .calculate_transport_byte_length_with_key(index, value, cache, context)?;
        (self.capture)(context, value)?;
        Ok(length)
    }

    fn write_transport_bytes_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.inner
            .write_transport_bytes_with_key(index, value, cache, sink, context)?;
        (self.capture)(context, value)
    }

    fn read_field_value(
        &self,
        wire_type: WireType,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        let value = self.inner.read_field_value(wire_type, source, context)?;
        (self.capture)(context, &value)?;
        Ok(value)
    }
}

/// Chooses the codec for its value from the context on every call.
///
/// The keyed helpers frame the field with the resolved codec's wire type.
/// [`wire_type`](ValueCodec::wire_type) alone cannot see the context and
/// reports [`WireType::LengthDelimited`].
pub struct Resolving<F, T> {
    resolve: F,
    _value: PhantomData<fn() -> T>,
}

impl<F, T> Resolving<F, T> {
    pub fn new(resolve: F) -> Self {
        Self {
            resolve,
            _value: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for Resolving<F, T> {
    fn clone(&self) -> Self {
        Self::new(self.resolve.clone())
    }
}

impl<F, T> fmt::Debug for Resolving<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolving").finish_non_exhaustive()
    }
}

impl<F, T> Resolving<F, T> {
    fn codec<C>(&self, context: &C) -> Result<Arc<dyn ValueCodec<T, C>>, CodecError>
    where
        F: Fn(&C) -> Result<Arc<dyn ValueCodec<T, C>>, ContextError>,
    {
        (self.resolve)(context).map_err(|err| {
            debug!(error = %err, "context resolution failed");
            err.into()
        })
    }
}

impl<T, C, F> ValueCodec<T, C> for Resolving<F, T>
where
    F: Fn(&C) -> Result<Arc<dyn ValueCodec<T, C>>, ContextError>,
{
    fn wire_type(&self) -> WireType {
        WireType::LengthDelimited
    }

    fn to_string_form(&self, value: &T, context: &mut C) -> Result<String, CodecError> {
        self.codec(context)?.to_string_form(value, context)
    }

    fn from_string_form(&self, text: &str, context: &mut C) -> Result<T, CodecError> {
        self.codec(context)?.from_string_form(text, context)
    }

    fn write_json_value(
        &self,
        value: &T,
        writer: &mut JsonWriter<dyn fmt::Write + '_>,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.codec(context)?.write_json_value(value, writer, context)
    }

    fn read_json(
        &self,
        reader: &mut JsonReader<dyn CharSource + '_>,
        context: &mut C,
    ) -> Result<T, CodecError> {
        self.codec(context)?.read_json(reader, context)
    }

    fn calculate_transport_byte_length(
        &self,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        self.codec(context)?
            .calculate_transport_byte_length(value, cache, context)
    }

    fn write_transport_bytes(
        &self,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.codec(context)?
            .write_transport_bytes(value, cache, sink, context)
    }

    fn read_transport_bytes(
        &self,
        length: usize,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        self.codec(context)?
            .read_transport_bytes(length, source, context)
    }

    fn calculate_transport_byte_length_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        context: &mut C,
    ) -> Result<usize, CodecError> {
        self.codec(context)?
            .calculate_transport_byte_length_with_key(index, value, cache, context)
    }

    fn write_transport_bytes_with_key(
        &self,
        index: u32,
        value: &T,
        cache: &mut WriteCache,
        sink: &mut dyn ByteSink,
        context: &mut C,
    ) -> Result<(), CodecError> {
        self.codec(context)?
            .write_transport_bytes_with_key(index, value, cache, sink, context)
    }

    fn read_field_value(
        &self,
        wire_type: WireType,
        source: &mut dyn ByteSource,
        context: &mut C,
    ) -> Result<T, CodecError> {
        self.codec(context)?
            .read_field_value(wire_type, source, context)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;
    use crate::codec::{
        Float64Codec, ListCodec, SInt64Codec, from_transport_bytes, to_transport_bytes,
    };

    #[derive(Default)]
    struct Precision {
        wide: Option<bool>,
    }

    fn by_precision(
        context: &Precision,
    ) -> Result<Arc<dyn ValueCodec<f64, Precision>>, ContextError> {
        match context.wide {
            Some(true) => Ok(Arc::new(Float64Codec)),
            Some(false) => Ok(Arc::new(AsF32)),
            None => Err(ContextError::Missing("precision")),
        }
    }

    /// f64 values carried as f32 on the wire.
    struct AsF32;

    impl ValueCodec<f64, Precision> for AsF32 {
        fn wire_type(&self) -> WireType {
            WireType::Bit32
        }

        fn to_string_form(&self, value: &f64, _: &mut Precision) -> Result<String, CodecError> {
            Ok(alloc::format!("{}", *value as f32))
        }

        fn from_string_form(&self, text: &str, _: &mut Precision) -> Result<f64, CodecError> {
            text.parse::<f32>()
                .map(f64::from)
                .map_err(|_| CodecError::invalid(text, "f32"))
        }

        fn write_json_value(
            &self,
            value: &f64,
            writer: &mut JsonWriter<dyn fmt::Write + '_>,
            context: &mut Precision,
        ) -> Result<(), CodecError> {
            let text = self.to_string_form(value, context)?;
            Ok(writer.write_value(&text)?)
        }

        fn read_json(
            &self,
            reader: &mut JsonReader<dyn CharSource + '_>,
            context: &mut Precision,
        ) -> Result<f64, CodecError> {
            let raw = String::from(reader.current_token().raw().unwrap_or_default());
            self.from_string_form(&raw, context)
        }

        fn calculate_transport_byte_length(
            &self,
            _: &f64,
            _: &mut WriteCache,
            _: &mut Precision,
        ) -> Result<usize, CodecError> {
            Ok(4)
        }

        fn write_transport_bytes(
            &self,
            value: &f64,
            _: &mut WriteCache,
            sink: &mut dyn ByteSink,
            _: &mut Precision,
        ) -> Result<(), CodecError> {
            crate::wire::write_fixed32((*value as f32).to_bits(), sink);
            Ok(())
        }

        fn read_transport_bytes(
            &self,
            _: usize,
            source: &mut dyn ByteSource,
            _: &mut Precision,
        ) -> Result<f64, CodecError> {
            Ok(f64::from(f32::from_bits(crate::wire::read_fixed32(source)?)))
        }
    }

    #[test]
    fn resolved_codec_decides_the_field_wire_type() {
        let codec = ListCodec::new(Resolving::new(by_precision));
        let values: Vec<f64> = vec![0.5];

        let mut narrow = Precision { wide: Some(false) };
        let bytes = to_transport_bytes(&codec, &values, &mut narrow).unwrap();
        assert_eq!(bytes, [0x0D, 0x00, 0x00, 0x00, 0x3F]);
        assert_eq!(from_transport_bytes(&codec, &bytes, &mut narrow), Ok(values.clone()));

        let mut wide = Precision { wide: Some(true) };
        let bytes = to_transport_bytes(&codec, &values, &mut wide).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0x09);
    }

    #[test]
    fn missing_context_is_an_error() {
        let codec = ListCodec::new(Resolving::new(by_precision));
        assert_eq!(
            to_transport_bytes(&codec, &vec![1.0], &mut Precision::default()),
            Err(CodecError::Context(ContextError::Missing("precision")))
        );
    }

    #[test]
    fn capture_runs_on_both_binary_passes_and_on_read() {
        let capture = Capturing::new(
            SInt64Codec,
            |seen: &mut Vec<i64>, value: &i64| -> Result<(), CodecError> {
                seen.push(*value);
                Ok(())
            },
        );
        let codec = ListCodec::new(capture);

        let mut seen = Vec::new();
        let bytes = to_transport_bytes(&codec, &vec![3, -3], &mut seen).unwrap();
        assert_eq!(seen, [3, -3, 3, -3]);

        let mut seen = Vec::new();
        let decoded = from_transport_bytes(&codec, &bytes, &mut seen).unwrap();
        assert_eq!(decoded, [3, -3]);
        assert_eq!(seen, [3, -3]);
    }

    fn unresolvable(_: &Vec<i64>) -> Result<Arc<dyn ValueCodec<i64, Vec<i64>>>, ContextError> {
        Err(ContextError::Missing("codec"))
    }

    #[test]
    fn failed_encode_leaves_the_context_untouched() {
        let capture = Capturing::new(
            Resolving::new(unresolvable),
            |seen: &mut Vec<i64>, value: &i64| -> Result<(), CodecError> {
                seen.push(*value);
                Ok(())
            },
        );

        let mut seen = Vec::new();
        assert_eq!(
            to_transport_bytes(&ListCodec::new(capture.clone()), &vec![4], &mut seen),
            Err(CodecError::Context(ContextError::Missing("codec")))
        );
        assert!(seen.is_empty());
        assert!(capture.to_string_form(&4, &mut seen).is_err());
        assert!(seen.is_empty());
    }
}
