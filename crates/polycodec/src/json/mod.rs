//! Streaming JSON text: the resumable [`JsonReader`] and the [`JsonWriter`].
mod escape_buffer;
mod literal_buffer;
mod options;
mod reader;
mod source;
mod token;
mod writer;

pub use options::{ReaderOptions, WriterOptions};
pub use reader::JsonReader;
pub use source::{CharSource, ChunkedSource, StrSource};
pub use token::{JsonToken, ValueType};
pub use writer::JsonWriter;
