use alloc::{boxed::Box, string::String, vec};

use serde::{Deserialize, Serialize};

use crate::{
    bucket::BucketAggregator,
    codec::{TypeEnum, TypedValue},
    json::{JsonToken, ValueType},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Unit {
    Metre,
    Second,
}

impl TypeEnum for Unit {
    fn index(self) -> u32 {
        match self {
            Self::Metre => 1,
            Self::Second => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Metre => "metre",
            Self::Second => "second",
        }
    }

    fn cases() -> &'static [Self] {
        &[Self::Metre, Self::Second]
    }
}

#[test]
fn values_serialize_externally_tagged() {
    let value = Value::from([
        (1, Value::from("a")),
        (2, Value::List(vec![Value::Int(-1), Value::Null])),
        (3, Value::Typed(1, Box::new(Value::Float(1.5)))),
    ]);
    let text = serde_json::to_string(&value).unwrap();
    assert_eq!(
        text,
        r#"{"Record":{"1":{"String":"a"},"2":{"List":[{"Int":-1},"Null"]},"3":{"Typed":[1,{"Float":1.5}]}}}"#
    );
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), value);
}

#[test]
fn typed_values_carry_their_case() {
    let typed = TypedValue::new(Unit::Second, Value::UInt(30));
    let text = serde_json::to_string(&typed).unwrap();
    assert_eq!(text, r#"{"case":"Second","value":{"UInt":30}}"#);
    assert_eq!(
        serde_json::from_str::<TypedValue<Unit, Value>>(&text).unwrap(),
        typed
    );
}

#[test]
fn buckets_serialize_in_key_order() {
    let mut by_unit: BucketAggregator<String, BucketAggregator<u8>> = BucketAggregator::new();
    by_unit.add("s".into()).add(2);
    by_unit.add("m".into()).add(1);
    by_unit.add("s".into()).add(2);

    let text = serde_json::to_string(&by_unit).unwrap();
    assert_eq!(
        text,
        concat!(
            r#"{"buckets":["#,
            r#"{"key":"m","count":1,"aggregations":{"buckets":[{"key":1,"count":1,"aggregations":null}]}},"#,
            r#"{"key":"s","count":2,"aggregations":{"buckets":[{"key":2,"count":2,"aggregations":null}]}}"#,
            r#"]}"#,
        )
    );
    assert_eq!(
        serde_json::from_str::<BucketAggregator<String, BucketAggregator<u8>>>(&text).unwrap(),
        by_unit
    );
}

#[test]
fn tokens_serialize_with_errors_as_text() {
    let scalar = serde_json::to_string(&JsonToken::value("1", ValueType::Int)).unwrap();
    assert_eq!(scalar, r#"{"Value":{"raw":"1","value_type":"Int"}}"#);
    assert_eq!(serde_json::to_string(&JsonToken::StartArray).unwrap(), r#""StartArray""#);

    let error = super::last_token("[1,]");
    assert_eq!(
        serde_json::to_string(&error).unwrap(),
        r#"{"JsonException":"invalid character ']' at 1:4"}"#
    );
}
