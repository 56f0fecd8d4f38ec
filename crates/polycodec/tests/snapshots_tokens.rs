#![allow(missing_docs)]
#![allow(clippy::needless_raw_string_hashes)]

use core::fmt::Write;

use polycodec::{
    Value,
    codec::{ListCodec, ObjectCodec, StringCodec, UInt32Codec, to_json_with_options},
    json::{ChunkedSource, JsonReader, JsonToken, WriterOptions},
    value::AsValue,
};

/// One line per token; `--` marks each point where the reader asked for
/// more input.
fn render_tokens(stream: &[&str]) -> String {
    let source = ChunkedSource::new();
    let feeder = source.clone();
    let mut reader = JsonReader::new(source);
    let mut chunks = stream.iter();
    let mut out = String::new();
    loop {
        match reader.next_token() {
            JsonToken::Suspended { .. } => match chunks.next() {
                Some(chunk) => {
                    if !out.is_empty() {
                        out.push_str("--\n");
                    }
                    feeder.push(chunk);
                }
                None => return out,
            },
            token => {
                writeln!(out, "{token}").unwrap();
                if token.is_terminal() {
                    return out;
                }
            }
        }
    }
}

#[test]
fn snapshot_tokens_across_chunks() {
    let stream: [&str; 5] = [
        r#"{"k":[1"#,
        r#",2.5,{"#,
        r#""x":"y"}],"#,
        r#""s":"he"#,
        r#"llo"}"#,
    ];

    insta::assert_snapshot!(render_tokens(&stream), @r#"
    StartObject
    FieldName("k")
    StartArray
    --
    Value("1", Int)
    Value("2.5", Float)
    StartObject
    --
    FieldName("x")
    Value("y", String)
    EndObject
    EndArray
    --
    FieldName("s")
    --
    Value("hello", String)
    EndObject
    EndDocument
    "#);
}

#[test]
fn snapshot_error_after_resume() {
    let stream: [&str; 2] = [r#"{"a":tru"#, "x}"];

    insta::assert_snapshot!(render_tokens(&stream), @r#"
    StartObject
    FieldName("a")
    --
    JsonException(invalid character 'x' at 1:9)
    "#);
}

#[test]
fn snapshot_pretty_record() {
    let codec = ObjectCodec::new()
        .field(1, "name", AsValue::<_, String>::new(StringCodec))
        .field(2, "dims", AsValue::<_, Vec<u32>>::new(ListCodec::new(UInt32Codec)))
        .field(3, "tags", AsValue::<_, Vec<String>>::new(ListCodec::new(StringCodec)));
    let record = Value::from([
        (1, Value::from("box")),
        (2, Value::List(vec![Value::from(1u32), Value::from(2u32)])),
        (3, Value::List(Vec::new())),
    ]);

    let text = to_json_with_options(&codec, &record, &mut (), WriterOptions { pretty: true }).unwrap();
    insta::assert_snapshot!(text, @r#"
    {
      "name": "box",
      "dims": [
        1,
        2
      ],
      "tags": []
    }
    "#);
}
