use alloc::vec::Vec;

use rstest::rstest;

use super::{tokens, tokens_with_options};
use crate::{
    SyntaxError,
    json::{ChunkedSource, JsonReader, JsonToken, ReaderOptions, ValueType},
};

fn string(raw: &str) -> JsonToken {
    JsonToken::value(raw, ValueType::String)
}

#[test]
fn object_with_nested_array() {
    assert_eq!(
        tokens(r#"{"a":1,"b":[1,2,3]}"#),
        [
            JsonToken::StartObject,
            JsonToken::FieldName("a".into()),
            JsonToken::value("1", ValueType::Int),
            JsonToken::FieldName("b".into()),
            JsonToken::StartArray,
            JsonToken::value("1", ValueType::Int),
            JsonToken::value("2", ValueType::Int),
            JsonToken::value("3", ValueType::Int),
            JsonToken::EndArray,
            JsonToken::EndObject,
            JsonToken::EndDocument,
        ]
    );
}

#[test]
fn literals() {
    assert_eq!(
        tokens("[true,false,null]"),
        [
            JsonToken::StartArray,
            JsonToken::value("true", ValueType::Bool),
            JsonToken::value("false", ValueType::Bool),
            JsonToken::value("null", ValueType::Null),
            JsonToken::EndArray,
            JsonToken::EndDocument,
        ]
    );
}

#[rstest]
#[case("{}", &[JsonToken::StartObject, JsonToken::EndObject])]
#[case("[]", &[JsonToken::StartArray, JsonToken::EndArray])]
#[case(" [ [ ] , { } ] ", &[
    JsonToken::StartArray,
    JsonToken::StartArray,
    JsonToken::EndArray,
    JsonToken::StartObject,
    JsonToken::EndObject,
    JsonToken::EndArray,
])]
fn empty_containers(#[case] text: &str, #[case] expected: &[JsonToken]) {
    let mut all = tokens(text);
    assert_eq!(all.pop(), Some(JsonToken::EndDocument));
    assert_eq!(all, expected);
}

#[rstest]
#[case(r#"["a\nb"]"#, "a\nb")]
#[case(r#"["\"\\\/"]"#, "\"\\/")]
#[case(r#"["\b\f\r\t"]"#, "\u{8}\u{c}\r\t")]
#[case(r#"["Aé"]"#, "A\u{e9}")]
#[case(r#"["😀"]"#, "\u{1F600}")]
#[case(r#"["\q"]"#, "\\q")]
#[case(r#"["\uD83D"]"#, "\\uD83D")]
#[case(r#"["\uD83Dx"]"#, "\\uD83Dx")]
#[case(r#"["\uDE00"]"#, "\\uDE00")]
#[case(r#"["\uD83DA"]"#, "\\uD83DA")]
#[case(r#"["\u12"]"#, "\\u12")]
#[case(r#"["\u12zz"]"#, "\\u12zz")]
#[case("[\"caf\u{e9} \u{1F600}\"]", "caf\u{e9} \u{1F600}")]
fn string_escapes(#[case] text: &str, #[case] decoded: &str) {
    assert_eq!(tokens(text)[1], string(decoded));
}

#[test]
fn field_names_are_decoded_too() {
    assert_eq!(
        tokens(r#"{"a\tb":"1"}"#)[1..3],
        [JsonToken::FieldName("a\tb".into()), string("1")]
    );
}

#[test]
fn unicode_whitespace_needs_the_option() {
    let text = "[\u{00A0}1,\u{2003}2]";

    let strict: Vec<JsonToken> = tokens(text);
    match strict.last() {
        Some(JsonToken::JsonException(err)) => {
            assert_eq!(err.kind(), &SyntaxError::InvalidCharacter('\u{00A0}'));
        }
        other => panic!("expected an error, got {other:?}"),
    }

    let relaxed = tokens_with_options(
        text,
        ReaderOptions {
            allow_unicode_whitespace: true,
        },
    );
    assert_eq!(
        relaxed,
        [
            JsonToken::StartArray,
            JsonToken::value("1", ValueType::Int),
            JsonToken::value("2", ValueType::Int),
            JsonToken::EndArray,
            JsonToken::EndDocument,
        ]
    );
}

#[test]
fn trailing_content_is_never_read() {
    assert_eq!(tokens("{} {")[1..], [JsonToken::EndObject, JsonToken::EndDocument]);
}

#[test]
fn input_pushed_through_the_reader_is_consumed_in_order() {
    let mut reader = JsonReader::new(ChunkedSource::new());
    reader.source_mut().push("[1");
    assert_eq!(reader.next_token(), &JsonToken::StartArray);
    assert!(matches!(reader.next_token(), JsonToken::Suspended { .. }));
    assert_eq!(reader.source_mut().remaining(), 0);

    reader.source_mut().push("] tail");
    assert_eq!(reader.next_token(), &JsonToken::value("1", ValueType::Int));
    assert_eq!(reader.next_token(), &JsonToken::EndArray);
    assert_eq!(reader.next_token(), &JsonToken::EndDocument);

    let source = reader.into_source();
    assert_eq!(source.remaining(), 5);
    assert_eq!(source.peek_remaining(), " tail");
}
