#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use polycodec::json::{ChunkedSource, JsonReader, JsonToken, ReaderOptions, StrSource};
use serde_json::{Map, Value};

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

#[derive(Debug, Arbitrary)]
enum Document {
    /// Well formed: rendered by serde_json, wrapped in an array so the root
    /// is a container.
    Valid(ArbitraryValue),
    /// Anything at all.
    Raw(String),
}

#[derive(Debug, Arbitrary)]
struct Input {
    unicode_whitespace: bool,
    split_seed: u64,
    document: Document,
}

fn whole(text: &str, options: ReaderOptions) -> Vec<JsonToken> {
    let mut reader = JsonReader::with_options(StrSource::new(text), options);
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

fn chunked(chunks: &[&str], options: ReaderOptions) -> Vec<JsonToken> {
    let source = ChunkedSource::new();
    let feeder = source.clone();
    let mut reader = JsonReader::with_options(source, options);
    let mut pending = chunks.iter();
    let mut out = Vec::new();
    loop {
        match reader.next_token().clone() {
            JsonToken::Suspended { .. } => match pending.next() {
                Some(chunk) => feeder.push(chunk),
                None => return out,
            },
            token => {
                let done = token.is_terminal();
                out.push(token);
                if done {
                    return out;
                }
            }
        }
    }
}

/// Splits on char boundaries, every chunk at least one byte long.
fn split_into_safe_chunks(text: &str, split_seed: u64) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let remaining = text.len() - start;
        let mut size = (split_seed as usize % remaining) + 1;
        while start + size < text.len() && !text.is_char_boundary(start + size) {
            size += 1;
        }
        chunks.push(&text[start..start + size]);
        start += size;
    }
    chunks
}

fuzz_target!(|input: Input| {
    let text = match &input.document {
        Document::Valid(value) => format!("[{}]", value.0),
        Document::Raw(text) => text.clone(),
    };
    let options = ReaderOptions {
        allow_unicode_whitespace: input.unicode_whitespace,
    };

    let expected = whole(&text, options);
    if matches!(input.document, Document::Valid(_)) {
        assert_eq!(expected.last(), Some(&JsonToken::EndDocument), "{text:?}");
    }

    let chunks = split_into_safe_chunks(&text, input.split_seed);
    let actual = chunked(&chunks, options);
    let content: Vec<JsonToken> = expected
        .into_iter()
        .filter(|token| !matches!(token, JsonToken::Suspended { .. }))
        .collect();
    assert_eq!(actual, content, "{text:?}");
});
