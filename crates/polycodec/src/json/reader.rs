//! The resumable JSON tokenizer.
//!
//! `JsonReader` pulls characters from a [`CharSource`] and produces one
//! [`JsonToken`] per call to [`next_token`](JsonReader::next_token).
//!
//! Overview
//! - Parsing is split the same way as a classic lexer/parser pair: the
//!   `ParseState` says what the grammar expects next (a field name, a `:`, a
//!   value, a separator...) and the `LexState` says where we are inside a
//!   multi character scalar (a number, a string, an escape, a literal).
//! - One character of lookahead is held in `peeked`. A character is only
//!   consumed (`bump`) once a state has decided what to do with it, so a
//!   number can end on the `,` that follows it without losing that `,`.
//! - The type stack has one entry per open container and decides whether a
//!   value is followed by object or array punctuation.
//!
//! Suspension
//! - When the source answers `None` the reader never fails. It stores the
//!   last produced token and the scalar accumulated so far in a
//!   [`JsonToken::Suspended`] and returns it. All lexical state stays in the
//!   reader, so the next call restores the token and buffer and continues
//!   exactly where it stopped, whatever the split point was.
//! - Malformed content latches a [`JsonToken::JsonException`]; once the top
//!   level container closes every call yields [`JsonToken::EndDocument`]
//!   without reading the source again.
#![allow(clippy::too_many_lines)]

use alloc::{boxed::Box, format, string::String, vec::Vec};
use core::mem;

use tracing::{debug, trace};

use super::{
    escape_buffer::{UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate, is_low_surrogate},
    literal_buffer::{ExpectedLiteralBuffer, Step},
    options::ReaderOptions,
    source::CharSource,
    token::{JsonToken, ValueType},
};
use crate::error::{ParseError, SyntaxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    /// After `{`: a field name or `}`.
    ObjectStart,
    /// After `,` inside an object: a field name.
    BeforePropertyName,
    AfterPropertyName,
    BeforePropertyValue,
    /// After `[`: a value or `]`.
    ArrayStart,
    /// After `,` inside an array: a value.
    BeforeArrayValue,
    AfterPropertyValue,
    AfterArrayValue,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Default,
    Literal,
    Sign,
    Zero,
    DecimalInteger,
    DecimalPoint,
    DecimalFraction,
    DecimalExponent,
    DecimalExponentSign,
    DecimalExponentInteger,
    String,
    StringEscape,
    StringEscapeUnicode,
}

/// Why a step could not make progress.
enum Stall {
    /// The source has no character right now.
    Pending,
    Syntax(SyntaxError),
}

type StepResult = Result<Option<JsonToken>, Stall>;

/// Pull based JSON tokenizer with save/resume on partial input.
///
/// The source is the last field so a reader over a concrete source can be
/// passed where a `&mut JsonReader<dyn CharSource>` is expected.
///
/// # Examples
///
/// ```rust
/// use polycodec::json::{JsonReader, JsonToken, StrSource, ValueType};
///
/// let mut reader = JsonReader::new(StrSource::new(r#"{"a":[true]}"#));
/// let mut tokens = Vec::new();
/// loop {
///     let token = reader.next_token().clone();
///     if token.is_terminal() {
///         tokens.push(token);
///         break;
///     }
///     tokens.push(token);
/// }
/// assert_eq!(
///     tokens,
///     vec![
///         JsonToken::StartObject,
///         JsonToken::FieldName("a".into()),
///         JsonToken::StartArray,
///         JsonToken::value("true", ValueType::Bool),
///         JsonToken::EndArray,
///         JsonToken::EndObject,
///         JsonToken::EndDocument,
///     ]
/// );
/// ```
pub struct JsonReader<S: ?Sized> {
    options: ReaderOptions,
    current: JsonToken,

    parse_state: ParseState,
    lex_state: LexState,
    type_stack: Vec<ContainerKind>,

    line: usize,
    column: usize,
    peeked: Option<char>,

    /// Scalar being accumulated: string content, number or literal text.
    buffer: String,
    string_is_field_name: bool,
    unicode_escape: UnicodeEscapeBuffer,
    /// A decoded high surrogate waiting for its low half, with the escape
    /// text to emit if none comes.
    pending_high_surrogate: Option<(u16, String)>,
    expected_literal: ExpectedLiteralBuffer,

    source: S,
}

impl<S: CharSource> JsonReader<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    #[must_use]
    pub fn with_options(source: S, options: ReaderOptions) -> Self {
        Self {
            options,
            current: JsonToken::StartDocument,
            parse_state: ParseState::Start,
            lex_state: LexState::Default,
            type_stack: Vec::with_capacity(16),
            line: 1,
            column: 1,
            peeked: None,
            buffer: String::new(),
            string_is_field_name: false,
            unicode_escape: UnicodeEscapeBuffer::new(),
            pending_high_surrogate: None,
            expected_literal: ExpectedLiteralBuffer::none(),
            source,
        }
    }

    /// Gives the source back, dropping any lookahead character.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: CharSource + ?Sized> JsonReader<S> {
    /// The token produced by the last call to [`next_token`](Self::next_token).
    #[must_use]
    pub fn current_token(&self) -> &JsonToken {
        &self.current
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of currently open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.type_stack.len()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Advances to the next token.
    ///
    /// Separators and `StartDocument` are consumed internally. A
    /// `Suspended` token is replaced by the token it saved and parsing
    /// continues from the saved state.
    pub fn next_token(&mut self) -> &JsonToken {
        if self.current.is_terminal() {
            return &self.current;
        }
        if matches!(self.current, JsonToken::Suspended { .. }) {
            self.resume();
        }

        loop {
            match self.step() {
                Ok(None) => {}
                Ok(Some(token)) => {
                    let skipped = token.is_skipped();
                    self.current = token;
                    if !skipped {
                        break;
                    }
                }
                Err(Stall::Pending) => {
                    self.suspend();
                    break;
                }
                Err(Stall::Syntax(kind)) => {
                    self.fail(kind);
                    break;
                }
            }
        }
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            !self.current.is_skipped(),
            "Internal error: reader returned an internal token {}",
            self.current
        );
        &self.current
    }

    /// Skips the value of the current field, nested containers included,
    /// and stops on the next field name of the same object or on the `}`
    /// closing it. Every token passed over is handed to `handle_skipped`.
    ///
    /// Returns early on `Suspended`, `JsonException` or `EndDocument`.
    pub fn skip_until_next_field(&mut self, mut handle_skipped: impl FnMut(&JsonToken)) {
        let depth = self.type_stack.len();
        loop {
            self.next_token();
            let now = self.type_stack.len();
            match &self.current {
                JsonToken::FieldName(_) if now == depth => return,
                JsonToken::EndObject if now + 1 == depth => return,
                JsonToken::Suspended { .. }
                | JsonToken::JsonException(_)
                | JsonToken::EndDocument => return,
                token => handle_skipped(token),
            }
        }
    }

    fn resume(&mut self) {
        if let JsonToken::Suspended {
            last_token,
            stored_value,
        } = mem::replace(&mut self.current, JsonToken::StartDocument)
        {
            self.buffer = stored_value.unwrap_or_default();
            self.current = *last_token;
            trace!(line = self.line, column = self.column, token = %self.current, "resuming json reader");
        }
    }

    fn suspend(&mut self) {
        let stored_value =
            (self.lex_state != LexState::Default).then(|| mem::take(&mut self.buffer));
        let last_token = mem::replace(&mut self.current, JsonToken::StartDocument);
        trace!(line = self.line, column = self.column, token = %last_token, "json reader suspended");
        self.current = JsonToken::Suspended {
            last_token: Box::new(last_token),
            stored_value,
        };
    }

    fn fail(&mut self, kind: SyntaxError) {
        let err = ParseError {
            kind,
            line: self.line,
            column: self.column,
        };
        debug!(error = %err, "json parse error");
        self.current = JsonToken::JsonException(err);
    }

    // --------------------------------------------------------------------------------------------
    // Character access
    // --------------------------------------------------------------------------------------------

    #[inline]
    fn peek(&mut self) -> Result<char, Stall> {
        if let Some(c) = self.peeked {
            return Ok(c);
        }
        match self.source.next_char() {
            Some(c) => {
                self.peeked = Some(c);
                Ok(c)
            }
            None => Err(Stall::Pending),
        }
    }

    #[inline]
    fn bump(&mut self) {
        if let Some(c) = self.peeked.take() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_whitespace(&self, c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\r')
            || (self.options.allow_unicode_whitespace && c.is_whitespace())
    }

    // --------------------------------------------------------------------------------------------
    // State machine
    // --------------------------------------------------------------------------------------------

    fn step(&mut self) -> StepResult {
        use LexState::*;

        match self.lex_state {
            Default => {
                if self.parse_state == ParseState::End {
                    return Ok(Some(JsonToken::EndDocument));
                }
                let c = self.peek()?;
                if self.is_whitespace(c) {
                    self.bump();
                    return Ok(None);
                }
                self.dispatch(c)
            }

            // -------------------------- LITERALS -----------------------------
            Literal => {
                let c = self.peek()?;
                match self.expected_literal.step(c) {
                    Step::NeedMore => {
                        self.bump();
                        self.buffer.push(c);
                        Ok(None)
                    }
                    Step::Done(literal, value_type) => {
                        self.bump();
                        self.buffer.clear();
                        self.lex_state = Default;
                        Ok(Some(self.finish_value(literal.into(), value_type)))
                    }
                    Step::Reject => Err(invalid_char(c)),
                }
            }

            // -------------------------- NUMBERS -----------------------------
            Sign => match self.peek()? {
                c @ '0' => self.push_number_char(c, Zero),
                c @ '1'..='9' => self.push_number_char(c, DecimalInteger),
                c => Err(invalid_char(c)),
            },

            Zero => match self.peek()? {
                c @ '.' => self.push_number_char(c, DecimalPoint),
                c @ ('e' | 'E') => self.push_number_char(c, DecimalExponent),
                c if c.is_ascii_digit() => {
                    let mut literal = mem::take(&mut self.buffer);
                    literal.push(c);
                    Err(Stall::Syntax(SyntaxError::InvalidNumber(literal)))
                }
                _ => Ok(Some(self.finish_number(ValueType::Int))),
            },

            DecimalInteger => match self.peek()? {
                c @ '.' => self.push_number_char(c, DecimalPoint),
                c @ ('e' | 'E') => self.push_number_char(c, DecimalExponent),
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalInteger),
                _ => Ok(Some(self.finish_number(ValueType::Int))),
            },

            DecimalPoint => match self.peek()? {
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalFraction),
                c => Err(invalid_char(c)),
            },

            DecimalFraction => match self.peek()? {
                c @ ('e' | 'E') => self.push_number_char(c, DecimalExponent),
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalFraction),
                _ => Ok(Some(self.finish_number(ValueType::Float))),
            },

            DecimalExponent => match self.peek()? {
                c @ ('+' | '-') => self.push_number_char(c, DecimalExponentSign),
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalExponentInteger),
                c => Err(invalid_char(c)),
            },

            DecimalExponentSign => match self.peek()? {
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalExponentInteger),
                c => Err(invalid_char(c)),
            },

            DecimalExponentInteger => match self.peek()? {
                c if c.is_ascii_digit() => self.push_number_char(c, DecimalExponentInteger),
                _ => Ok(Some(self.finish_number(ValueType::Float))),
            },

            // -------------------------- STRING -----------------------------
            String => match self.peek()? {
                '\\' => {
                    self.bump();
                    self.lex_state = StringEscape;
                    Ok(None)
                }
                '"' => {
                    self.bump();
                    self.flush_high_surrogate();
                    self.lex_state = Default;
                    Ok(Some(self.finish_string()))
                }
                c @ '\0'..='\x1F' => Err(invalid_char(c)),
                c => {
                    self.bump();
                    self.flush_high_surrogate();
                    self.buffer.push(c);
                    Ok(None)
                }
            },

            StringEscape => {
                let c = self.peek()?;
                self.bump();
                if c == 'u' {
                    self.unicode_escape.reset();
                    self.lex_state = StringEscapeUnicode;
                    return Ok(None);
                }
                self.flush_high_surrogate();
                match c {
                    '"' | '\\' | '/' => self.buffer.push(c),
                    'b' => self.buffer.push('\u{0008}'),
                    'f' => self.buffer.push('\u{000C}'),
                    'n' => self.buffer.push('\n'),
                    'r' => self.buffer.push('\r'),
                    't' => self.buffer.push('\t'),
                    other => {
                        // Not a known escape: keep it as written.
                        self.buffer.push('\\');
                        self.buffer.push(other);
                    }
                }
                self.lex_state = String;
                Ok(None)
            }

            StringEscapeUnicode => {
                let c = self.peek()?;
                match self.unicode_escape.feed(c) {
                    Some(None) => {
                        self.bump();
                        Ok(None)
                    }
                    Some(Some(unit)) => {
                        self.bump();
                        self.push_code_unit(unit);
                        self.lex_state = String;
                        Ok(None)
                    }
                    None => {
                        // Incomplete escape: keep its text and let the string
                        // state handle `c`.
                        self.flush_high_surrogate();
                        self.buffer.push_str("\\u");
                        self.buffer.push_str(self.unicode_escape.digits());
                        self.lex_state = String;
                        Ok(None)
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, c: char) -> StepResult {
        use ParseState::*;

        match self.parse_state {
            Start => match c {
                '{' => {
                    self.bump();
                    Ok(Some(self.open(ContainerKind::Object)))
                }
                '[' => {
                    self.bump();
                    Ok(Some(self.open(ContainerKind::Array)))
                }
                _ => Err(invalid_char(c)),
            },

            ObjectStart | BeforePropertyName => match c {
                '}' if self.parse_state == ObjectStart => {
                    self.bump();
                    Ok(Some(self.close()))
                }
                '"' => {
                    self.bump();
                    self.begin_string(true);
                    Ok(None)
                }
                _ => Err(invalid_char(c)),
            },

            AfterPropertyName => match c {
                ':' => {
                    self.bump();
                    self.parse_state = BeforePropertyValue;
                    Ok(None)
                }
                _ => Err(invalid_char(c)),
            },

            ArrayStart if c == ']' => {
                self.bump();
                Ok(Some(self.close()))
            }

            ArrayStart | BeforeArrayValue | BeforePropertyValue => self.begin_value(c),

            AfterPropertyValue => match c {
                ',' => {
                    self.bump();
                    self.parse_state = BeforePropertyName;
                    Ok(Some(JsonToken::ObjectSeparator))
                }
                '}' => {
                    self.bump();
                    Ok(Some(self.close()))
                }
                _ => Err(invalid_char(c)),
            },

            AfterArrayValue => match c {
                ',' => {
                    self.bump();
                    self.parse_state = BeforeArrayValue;
                    Ok(Some(JsonToken::ArraySeparator))
                }
                ']' => {
                    self.bump();
                    Ok(Some(self.close()))
                }
                _ => Err(invalid_char(c)),
            },

            End => Ok(Some(JsonToken::EndDocument)),
        }
    }

    fn begin_value(&mut self, c: char) -> StepResult {
        match c {
            '{' => {
                self.bump();
                Ok(Some(self.open(ContainerKind::Object)))
            }
            '[' => {
                self.bump();
                Ok(Some(self.open(ContainerKind::Array)))
            }
            '"' => {
                self.bump();
                self.begin_string(false);
                Ok(None)
            }
            '-' => {
                self.buffer.clear();
                self.push_number_char(c, LexState::Sign)
            }
            '0' => {
                self.buffer.clear();
                self.push_number_char(c, LexState::Zero)
            }
            '1'..='9' => {
                self.buffer.clear();
                self.push_number_char(c, LexState::DecimalInteger)
            }
            'n' | 't' | 'f' => {
                self.bump();
                self.buffer.clear();
                self.buffer.push(c);
                self.expected_literal = ExpectedLiteralBuffer::new(c);
                self.lex_state = LexState::Literal;
                Ok(None)
            }
            _ => Err(invalid_char(c)),
        }
    }

    fn begin_string(&mut self, field_name: bool) {
        self.buffer.clear();
        self.pending_high_surrogate = None;
        self.string_is_field_name = field_name;
        self.lex_state = LexState::String;
    }

    #[inline]
    fn push_number_char(&mut self, c: char, next: LexState) -> StepResult {
        self.bump();
        self.buffer.push(c);
        self.lex_state = next;
        Ok(None)
    }

    fn open(&mut self, kind: ContainerKind) -> JsonToken {
        self.type_stack.push(kind);
        match kind {
            ContainerKind::Object => {
                self.parse_state = ParseState::ObjectStart;
                JsonToken::StartObject
            }
            ContainerKind::Array => {
                self.parse_state = ParseState::ArrayStart;
                JsonToken::StartArray
            }
        }
    }

    fn close(&mut self) -> JsonToken {
        let closed = self.type_stack.pop();
        self.parse_state = self.state_after_value();
        match closed {
            Some(ContainerKind::Array) => JsonToken::EndArray,
            _ => JsonToken::EndObject,
        }
    }

    fn state_after_value(&self) -> ParseState {
        match self.type_stack.last() {
            None => ParseState::End,
            Some(ContainerKind::Object) => ParseState::AfterPropertyValue,
            Some(ContainerKind::Array) => ParseState::AfterArrayValue,
        }
    }

    fn finish_value(&mut self, raw: String, value_type: ValueType) -> JsonToken {
        self.parse_state = self.state_after_value();
        JsonToken::Value { raw, value_type }
    }

    fn finish_number(&mut self, value_type: ValueType) -> JsonToken {
        self.lex_state = LexState::Default;
        let raw = mem::take(&mut self.buffer);
        self.finish_value(raw, value_type)
    }

    fn finish_string(&mut self) -> JsonToken {
        let content = mem::take(&mut self.buffer);
        if self.string_is_field_name {
            self.parse_state = ParseState::AfterPropertyName;
            JsonToken::FieldName(content)
        } else {
            self.finish_value(content, ValueType::String)
        }
    }

    fn push_code_unit(&mut self, unit: u16) {
        if is_low_surrogate(unit) {
            if let Some((high, _)) = self.pending_high_surrogate.take() {
                if let Some(c) = combine_surrogates(high, unit) {
                    self.buffer.push(c);
                    return;
                }
            }
            self.buffer.push_str("\\u");
            self.buffer.push_str(self.unicode_escape.digits());
            return;
        }

        self.flush_high_surrogate();
        if is_high_surrogate(unit) {
            let text = format!("\\u{}", self.unicode_escape.digits());
            self.pending_high_surrogate = Some((unit, text));
        } else if let Some(c) = char::from_u32(u32::from(unit)) {
            self.buffer.push(c);
        }
    }

    /// Emits a high surrogate that found no low half, as written.
    fn flush_high_surrogate(&mut self) {
        if let Some((_, text)) = self.pending_high_surrogate.take() {
            self.buffer.push_str(&text);
        }
    }
}

fn invalid_char(c: char) -> Stall {
    Stall::Syntax(SyntaxError::InvalidCharacter(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::source::StrSource;

    #[test]
    fn starts_on_start_document() {
        let reader = JsonReader::new(StrSource::new("{}"));
        assert_eq!(reader.current_token(), &JsonToken::StartDocument);
    }

    #[test]
    fn end_document_does_not_read_further() {
        let mut reader = JsonReader::new(StrSource::new("[] trailing"));
        assert_eq!(reader.next_token(), &JsonToken::StartArray);
        assert_eq!(reader.next_token(), &JsonToken::EndArray);
        assert_eq!(reader.next_token(), &JsonToken::EndDocument);
        assert_eq!(reader.next_token(), &JsonToken::EndDocument);
    }

    #[test]
    fn tracks_depth() {
        let mut reader = JsonReader::new(StrSource::new(r#"{"a":[{}]}"#));
        reader.next_token();
        assert_eq!(reader.depth(), 1);
        reader.next_token();
        reader.next_token();
        assert_eq!(reader.depth(), 2);
        reader.next_token();
        assert_eq!(reader.depth(), 3);
    }

    #[test]
    fn error_position_points_at_offending_character() {
        let mut reader = JsonReader::new(StrSource::new("{\n  \"a\" 1}"));
        reader.next_token();
        reader.next_token();
        match reader.next_token() {
            JsonToken::JsonException(err) => {
                assert_eq!(err.kind(), &SyntaxError::InvalidCharacter('1'));
                assert_eq!((err.line, err.column), (2, 7));
            }
            other => panic!("expected an error, got {other}"),
        }
    }
}
