/// Configuration for [`JsonReader`](super::JsonReader).
///
/// # Examples
///
/// ```rust
/// use polycodec::json::{JsonReader, ReaderOptions, StrSource};
///
/// let reader = JsonReader::with_options(
///     StrSource::new("[1]"),
///     ReaderOptions {
///         allow_unicode_whitespace: true,
///     },
/// );
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Whether to allow any Unicode whitespace between tokens.
    ///
    /// By default, only the four whitespace characters defined by JSON are
    /// skipped: space (U+0020), line feed (U+000A), carriage return (U+000D)
    /// and horizontal tab (U+0009).
    pub allow_unicode_whitespace: bool,
}

/// Configuration for [`JsonWriter`](super::JsonWriter).
///
/// # Default
///
/// Compact output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterOptions {
    /// Put each field and array element on its own line, indented by two
    /// spaces per level, with a space after each `:`.
    pub pretty: bool,
}
