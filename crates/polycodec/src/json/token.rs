//! Lexical events produced by [`JsonReader`](super::JsonReader).
//!
//! `JsonToken` is a closed set: structural events, field names, scalar values
//! carrying their raw text, and the two non-content states `Suspended` and
//! `JsonException`.
//!
//! # Examples
//!
//! ```
//! use polycodec::json::{JsonReader, JsonToken, StrSource, ValueType};
//!
//! let mut reader = JsonReader::new(StrSource::new(r#"{"a":1.5e2}"#));
//! assert_eq!(reader.next_token(), &JsonToken::StartObject);
//! assert_eq!(reader.next_token(), &JsonToken::FieldName("a".into()));
//! let token = reader.next_token();
//! assert_eq!(token.value_type(), Some(ValueType::Float));
//! assert_eq!(token.as_f64(), Some(150.0));
//! ```
use alloc::{boxed::Box, string::String};
use core::fmt;

use crate::error::ParseError;

/// The type of a scalar [`JsonToken::Value`].
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ValueType {
    Null,
    Bool,
    String,
    Int,
    Float,
}

#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    /// Initial state of a reader. Never returned by `next_token`.
    StartDocument,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName(String),
    /// A scalar. `raw` is the decoded string content for strings and the
    /// literal source text for numbers, booleans and `null`.
    Value {
        raw: String,
        value_type: ValueType,
    },
    /// Internal marker after a `,` inside an object. Never returned.
    ObjectSeparator,
    /// Internal marker after a `,` inside an array. Never returned.
    ArraySeparator,
    /// The character source had no data. Holds the last produced token and
    /// the scalar accumulated so far; advancing again resumes from there.
    Suspended {
        last_token: Box<JsonToken>,
        stored_value: Option<String>,
    },
    /// Malformed content. Latches: every later advance returns it again.
    #[cfg_attr(any(test, feature = "serde"), serde(serialize_with = "serialize_error"))]
    JsonException(ParseError),
    /// The top level container closed.
    EndDocument,
}

#[cfg(any(test, feature = "serde"))]
fn serialize_error<S: serde::Serializer>(err: &ParseError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

impl JsonToken {
    /// Builds a scalar token.
    pub fn value(raw: impl Into<String>, value_type: ValueType) -> Self {
        Self::Value {
            raw: raw.into(),
            value_type,
        }
    }

    /// Tokens the reader consumes internally and never hands to callers.
    #[must_use]
    pub(crate) fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::StartDocument | Self::ObjectSeparator | Self::ArraySeparator
        )
    }

    /// `true` for `EndDocument` and `JsonException`, which no further input
    /// can change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EndDocument | Self::JsonException(_))
    }

    #[must_use]
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Value { value_type, .. } => Some(*value_type),
            _ => None,
        }
    }

    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Value { raw, .. } => Some(raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Value {
                raw,
                value_type: ValueType::Bool,
            } => Some(raw == "true"),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Value {
                raw,
                value_type: ValueType::Int,
            } => raw.parse().ok(),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float` token.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Value {
                raw,
                value_type: ValueType::Int | ValueType::Float,
            } => raw.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value {
                raw,
                value_type: ValueType::String,
            } => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartDocument => f.write_str("StartDocument"),
            Self::StartObject => f.write_str("StartObject"),
            Self::EndObject => f.write_str("EndObject"),
            Self::StartArray => f.write_str("StartArray"),
            Self::EndArray => f.write_str("EndArray"),
            Self::FieldName(name) => write!(f, "FieldName({name:?})"),
            Self::Value { raw, value_type } => write!(f, "Value({raw:?}, {value_type:?})"),
            Self::ObjectSeparator => f.write_str("ObjectSeparator"),
            Self::ArraySeparator => f.write_str("ArraySeparator"),
            Self::Suspended { last_token, .. } => write!(f, "Suspended({last_token})"),
            Self::JsonException(err) => write!(f, "JsonException({err})"),
            Self::EndDocument => f.write_str("EndDocument"),
        }
    }
}
