//! One value definition, three encodings.
//!
//! - [`json`]: a pull based JSON tokenizer that suspends on partial input and
//!   resumes where it stopped, and the matching writer.
//! - [`codec`]: the [`ValueCodec`](codec::ValueCodec) contract every field
//!   type implements (string form, JSON form, binary form) with codecs for
//!   scalars, collections, records, discriminated unions and context
//!   dependent fields.
//! - [`wire`]: varints, zigzag, field tags and the write cache of the binary
//!   form.
//! - [`bucket`]: a sorted bucket aggregator.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;

pub mod bucket;
pub mod codec;
pub mod json;
pub mod value;
pub mod wire;

#[cfg(test)]
mod tests;

pub use error::{
    CodecError, ContextError, JsonWriteError, ParseError, SyntaxError, WireError,
};
pub use json::{JsonReader, JsonToken, JsonWriter, ValueType};
pub use value::Value;
