//! Structural JSON emitter, the mirror of [`JsonReader`](super::JsonReader).
//!
//! The writer keeps just enough state to place separators and reject call
//! sequences that cannot form a document; it never buffers output.
use alloc::vec::Vec;
use core::fmt::{self, Write};

use tracing::debug;

use super::options::WriterOptions;
use crate::error::JsonWriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

/// What the writer emitted last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emitted {
    Nothing,
    StartObject,
    StartArray,
    FieldName,
    /// A scalar or a closed container.
    Value,
}

/// # Examples
///
/// ```rust
/// use polycodec::json::JsonWriter;
///
/// let mut writer = JsonWriter::new(String::new());
/// writer.write_start_object().unwrap();
/// writer.write_field_name("a").unwrap();
/// writer.write_start_array().unwrap();
/// writer.write_value("1").unwrap();
/// writer.write_string("x\"y").unwrap();
/// writer.write_end_array().unwrap();
/// writer.write_end_object().unwrap();
/// assert_eq!(writer.into_inner(), r#"{"a":[1,"x\"y"]}"#);
/// ```
pub struct JsonWriter<W: ?Sized> {
    options: WriterOptions,
    type_stack: Vec<Frame>,
    last: Emitted,
    sink: W,
}

impl<W: Write> JsonWriter<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    #[must_use]
    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        Self {
            options,
            type_stack: Vec::new(),
            last: Emitted::Nothing,
            sink,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write + ?Sized> JsonWriter<W> {
    pub fn write_start_object(&mut self) -> Result<(), JsonWriteError> {
        self.before_value("object start must be a document root, a field value or an array element")?;
        self.sink.write_char('{')?;
        self.type_stack.push(Frame::Object);
        self.last = Emitted::StartObject;
        Ok(())
    }

    pub fn write_end_object(&mut self) -> Result<(), JsonWriteError> {
        if self.type_stack.last() != Some(&Frame::Object) || self.last == Emitted::FieldName {
            return Err(misuse("object end without an open object or after a dangling field name"));
        }
        self.type_stack.pop();
        if self.last != Emitted::StartObject {
            self.newline()?;
        }
        self.sink.write_char('}')?;
        self.last = Emitted::Value;
        Ok(())
    }

    pub fn write_start_array(&mut self) -> Result<(), JsonWriteError> {
        self.before_value("array start must be a document root, a field value or an array element")?;
        self.sink.write_char('[')?;
        self.type_stack.push(Frame::Array);
        self.last = Emitted::StartArray;
        Ok(())
    }

    pub fn write_end_array(&mut self) -> Result<(), JsonWriteError> {
        if self.type_stack.last() != Some(&Frame::Array) {
            return Err(misuse("array end without an open array"));
        }
        self.type_stack.pop();
        if self.last != Emitted::StartArray {
            self.newline()?;
        }
        self.sink.write_char(']')?;
        self.last = Emitted::Value;
        Ok(())
    }

    pub fn write_field_name(&mut self, name: &str) -> Result<(), JsonWriteError> {
        if self.type_stack.last() != Some(&Frame::Object) || self.last == Emitted::FieldName {
            return Err(misuse("field name outside an object or directly after another field name"));
        }
        if self.last != Emitted::StartObject {
            self.sink.write_char(',')?;
        }
        self.newline()?;
        self.sink.write_char('"')?;
        write_escaped_string(name, &mut self.sink)?;
        self.sink.write_str(if self.options.pretty { "\": " } else { "\":" })?;
        self.last = Emitted::FieldName;
        Ok(())
    }

    /// Writes `value` as a quoted, escaped JSON string.
    pub fn write_string(&mut self, value: &str) -> Result<(), JsonWriteError> {
        self.before_scalar()?;
        self.sink.write_char('"')?;
        write_escaped_string(value, &mut self.sink)?;
        self.sink.write_char('"')?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// Writes `raw` unquoted: numbers, `true`, `false` or `null`.
    pub fn write_value(&mut self, raw: &str) -> Result<(), JsonWriteError> {
        self.before_scalar()?;
        self.sink.write_str(raw)?;
        self.last = Emitted::Value;
        Ok(())
    }

    /// `true` once the root value is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.type_stack.is_empty() && self.last == Emitted::Value
    }

    fn before_scalar(&mut self) -> Result<(), JsonWriteError> {
        if self.type_stack.is_empty() {
            return Err(misuse("a scalar must be a field value or an array element"));
        }
        self.before_value("a value inside an object needs a field name first")
    }

    fn before_value(&mut self, message: &'static str) -> Result<(), JsonWriteError> {
        match (self.type_stack.last(), self.last) {
            (None, Emitted::Nothing) | (Some(Frame::Object), Emitted::FieldName) => Ok(()),
            (Some(Frame::Array), Emitted::StartArray) => self.newline(),
            (Some(Frame::Array), Emitted::Value) => {
                self.sink.write_char(',')?;
                self.newline()
            }
            _ => Err(misuse(message)),
        }
    }

    fn newline(&mut self) -> Result<(), JsonWriteError> {
        if self.options.pretty {
            self.sink.write_char('\n')?;
            for _ in 0..self.type_stack.len() {
                self.sink.write_str("  ")?;
            }
        }
        Ok(())
    }
}

fn misuse(message: &'static str) -> JsonWriteError {
    debug!(reason = message, "illegal json writer operation");
    JsonWriteError::IllegalOperation(message)
}

/// Escapes quotes, backslashes, control characters and the Unicode line
/// separators for inclusion in a JSON string literal.
pub(crate) fn write_escaped_string<W: Write + ?Sized>(src: &str, f: &mut W) -> fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            // Pre-2019 JSON parsers choke on raw line separators.
            '\u{2028}' | '\u{2029}' => write!(f, "\\u{:04X}", c as u32)?,
            c if c.is_ascii_control() => write!(f, "\\u{:04X}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}
