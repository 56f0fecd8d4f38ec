//! Error types shared by the reader, the writer, the wire primitives and the
//! value codecs.
use alloc::string::String;

use thiserror::Error;

use crate::wire::WireType;

/// A fatal error raised by [`JsonReader`](crate::JsonReader) on malformed
/// content, tagged with the position of the offending character.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {line}:{column}")]
pub struct ParseError {
    pub(crate) kind: SyntaxError,
    /// One-based line of the offending character.
    pub line: usize,
    /// One-based column of the offending character.
    pub column: usize,
}

impl ParseError {
    /// What went wrong, without the position.
    #[must_use]
    pub fn kind(&self) -> &SyntaxError {
        &self.kind
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Raised immediately when the writer is driven through a structurally
/// invalid sequence of calls.
#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum JsonWriteError {
    #[error("illegal json operation: {0}")]
    IllegalOperation(&'static str),
    #[error("failed to write to the text sink")]
    Fmt(#[from] core::fmt::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum WireError {
    #[error("unexpected end of bytes")]
    UnexpectedEnd,
    #[error("varint is longer than 10 bytes")]
    VarintOverflow,
    #[error("value {value} does not fit in {target}")]
    OutOfRange { value: u64, target: &'static str },
    #[error("unknown wire type {0}")]
    UnknownWireType(u8),
    #[error("write cache exhausted: the write pass asked for more lengths than were computed")]
    CacheExhausted,
    #[error("write cache has {0} unconsumed lengths")]
    CacheLeftover(usize),
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("field has wire type {actual:?}, expected {expected:?}")]
    WireTypeMismatch {
        expected: WireType,
        actual: WireType,
    },
}

/// Context state a resolver needed was not there. This is an ordering defect
/// in the model (a resolving field was processed before the field that
/// captures its input), never a data problem.
#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ContextError {
    #[error("context has no {0}: the field capturing it must come first")]
    Missing(&'static str),
    #[error("context has no {kind} named '{name}'")]
    Unknown { kind: &'static str, name: String },
}

/// Errors returned by [`ValueCodec`](crate::codec::ValueCodec) operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum CodecError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Write(#[from] JsonWriteError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("invalid value '{value}' for {target}")]
    InvalidValue { value: String, target: &'static str },
    #[error("unknown type case '{0}'")]
    UnknownTypeCase(String),
    #[error("input ended before the value was complete")]
    IncompleteInput,
}

impl CodecError {
    pub(crate) fn invalid(value: impl Into<String>, target: &'static str) -> Self {
        Self::InvalidValue {
            value: value.into(),
            target,
        }
    }
}
