//! Character sources feeding [`JsonReader`](super::JsonReader).
//!
//! A source answers "got a char" (`Some`) or "no data yet" (`None`). The
//! reader turns `None` into a [`JsonToken::Suspended`](super::JsonToken)
//! instead of failing, so a caller can add input and simply advance again.
use alloc::{collections::VecDeque, rc::Rc, string::String};
use core::{cell::RefCell, str::Chars};

pub trait CharSource {
    /// Next character, or `None` when no data is available right now.
    fn next_char(&mut self) -> Option<char>;
}

impl<F> CharSource for F
where
    F: FnMut() -> Option<char>,
{
    fn next_char(&mut self) -> Option<char> {
        self()
    }
}

/// A complete document held in memory.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Option<char> {
        self.chars.next()
    }
}

/// A queue of chunks that can keep growing after the reader took ownership
/// of the source. Clones share the same queue.
///
/// ```
/// use polycodec::json::{ChunkedSource, JsonReader, JsonToken};
///
/// let source = ChunkedSource::new();
/// let feeder = source.clone();
/// let mut reader = JsonReader::new(source);
///
/// feeder.push(r#"{"a""#);
/// assert_eq!(reader.next_token(), &JsonToken::StartObject);
/// assert_eq!(reader.next_token(), &JsonToken::FieldName("a".into()));
/// assert!(matches!(reader.next_token(), JsonToken::Suspended { .. }));
///
/// feeder.push(":true}");
/// assert_eq!(reader.next_token().as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChunkedSource {
    pending: Rc<RefCell<VecDeque<char>>>,
}

impl ChunkedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of input.
    pub fn push(&self, chunk: &str) {
        self.pending.borrow_mut().extend(chunk.chars());
    }

    /// Characters pushed but not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Unread input, mostly useful for diagnostics.
    #[must_use]
    pub fn peek_remaining(&self) -> String {
        self.pending.borrow().iter().collect()
    }
}

impl CharSource for ChunkedSource {
    fn next_char(&mut self) -> Option<char> {
        self.pending.borrow_mut().pop_front()
    }
}
