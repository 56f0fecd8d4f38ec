mod parse_good;
mod serde_forms;

use alloc::vec::Vec;

use crate::json::{CharSource, JsonReader, JsonToken, ReaderOptions, StrSource};

/// Every token of a complete document, up to and including the terminal
/// one.
pub(crate) fn tokens(text: &str) -> Vec<JsonToken> {
    tokens_with_options(text, ReaderOptions::default())
}

pub(crate) fn tokens_with_options(text: &str, options: ReaderOptions) -> Vec<JsonToken> {
    drain(&mut JsonReader::with_options(StrSource::new(text), options))
}

pub(crate) fn drain(reader: &mut JsonReader<dyn CharSource + '_>) -> Vec<JsonToken> {
    let mut out = Vec::new();
    loop {
        let token = reader.next_token().clone();
        let done = token.is_terminal() || matches!(token, JsonToken::Suspended { .. });
        out.push(token);
        if done {
            return out;
        }
    }
}

/// The last token of a document, which for malformed input is the error.
pub(crate) fn last_token(text: &str) -> JsonToken {
    tokens(text).pop().unwrap()
}
