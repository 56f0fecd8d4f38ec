#![allow(missing_docs)]

use std::{collections::BTreeMap, sync::Arc};

use polycodec::{
    CodecError, Value,
    codec::{
        Float64Codec, ListCodec, MapCodec, MultiTypeCodec, MultiTypeEnum, ObjectCodec,
        SInt32Codec, StringCodec, TypeEnum, TypedJsonForm, TypedValue, UInt32Codec, ValueCodec,
        from_json, from_transport_bytes, to_json, to_transport_bytes,
    },
    value::AsValue,
};
use rstest::rstest;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Circle,
    Rect,
    Label,
}

impl TypeEnum for Shape {
    fn index(self) -> u32 {
        match self {
            Self::Circle => 1,
            Self::Rect => 2,
            Self::Label => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Label => "label",
        }
    }

    fn cases() -> &'static [Self] {
        &[Self::Circle, Self::Rect, Self::Label]
    }
}

impl MultiTypeEnum<Value, ()> for Shape {
    fn definition(self) -> Arc<dyn ValueCodec<Value, ()>> {
        match self {
            Self::Circle => Arc::new(AsValue::<_, f64>::new(Float64Codec)),
            Self::Rect => Arc::new(
                ObjectCodec::new()
                    .field(1, "w", AsValue::<_, u32>::new(UInt32Codec))
                    .field(2, "h", AsValue::<_, u32>::new(UInt32Codec)),
            ),
            Self::Label => Arc::new(AsValue::<_, String>::new(StringCodec)),
        }
    }
}

fn circle(radius: f64) -> TypedValue<Shape, Value> {
    TypedValue::new(Shape::Circle, Value::Float(radius))
}

fn rect(w: u32, h: u32) -> TypedValue<Shape, Value> {
    TypedValue::new(
        Shape::Rect,
        Value::from([(1, Value::from(w)), (2, Value::from(h))]),
    )
}

#[rstest]
#[case(circle(1.5), r#"["circle",1.5]"#, &[0x09, 0, 0, 0, 0, 0, 0, 0xF8, 0x3F])]
#[case(rect(3, 4), r#"["rect",{"w":3,"h":4}]"#, &[0x12, 0x04, 0x08, 0x03, 0x10, 0x04])]
#[case(
    TypedValue::new(Shape::Label, Value::from("hi")),
    r#"["label","hi"]"#,
    &[0x1A, 0x02, b'h', b'i']
)]
fn typed_values_in_every_form(
    #[case] value: TypedValue<Shape, Value>,
    #[case] json: &str,
    #[case] bytes: &[u8],
) {
    let codec = MultiTypeCodec::<Shape>::new();

    assert_eq!(to_json(&codec, &value, &mut ()).unwrap(), json);
    assert_eq!(from_json(&codec, json, &mut ()), Ok(value.clone()));

    assert_eq!(to_transport_bytes(&codec, &value, &mut ()).unwrap(), bytes);
    assert_eq!(from_transport_bytes(&codec, bytes, &mut ()), Ok(value));
}

#[test]
fn map_form_and_index_form_read_alike() {
    let map = MultiTypeCodec::<Shape>::with_json_form(TypedJsonForm::Map);
    let value = rect(3, 4);

    let text = to_json(&map, &value, &mut ()).unwrap();
    assert_eq!(text, r#"{"rect":{"w":3,"h":4}}"#);

    let array = MultiTypeCodec::<Shape>::new();
    assert_eq!(from_json(&array, &text, &mut ()), Ok(value.clone()));
    assert_eq!(
        from_json(&array, r#"[2,{"h":4,"w":3}]"#, &mut ()),
        Ok(value)
    );
}

#[test]
fn string_form_prefixes_the_case_name() {
    let codec = MultiTypeCodec::<Shape>::new();
    assert_eq!(
        codec.to_string_form(&circle(0.25), &mut ()),
        Ok("circle:0.25".into())
    );
    let read: Result<TypedValue<Shape, Value>, _> = codec.from_string_form("label:a:b", &mut ());
    assert_eq!(read, Ok(TypedValue::new(Shape::Label, Value::from("a:b"))));
}

#[rstest]
#[case(r#"["hexagon",1]"#, "hexagon")]
#[case(r#"{"hexagon":1}"#, "hexagon")]
#[case(r#"[9,1]"#, "9")]
fn unknown_json_case(#[case] json: &str, #[case] case: &str) {
    let codec = MultiTypeCodec::<Shape>::new();
    assert_eq!(
        from_json(&codec, json, &mut ()),
        Err(CodecError::UnknownTypeCase(case.into()))
    );
}

#[test]
fn unknown_binary_case() {
    let codec = MultiTypeCodec::<Shape>::new();
    // field 7, varint 1
    assert_eq!(
        from_transport_bytes(&codec, &[0x38, 0x01], &mut ()),
        Err(CodecError::UnknownTypeCase("7".into()))
    );
}

#[test]
fn list_of_typed_values() {
    let codec = ListCodec::new(MultiTypeCodec::<Shape>::new());
    let shapes = vec![circle(2.0), rect(1, 0), TypedValue::new(Shape::Label, Value::from(""))];

    let json = to_json(&codec, &shapes, &mut ()).unwrap();
    assert_eq!(json, r#"[["circle",2],["rect",{"w":1,"h":0}],["label",""]]"#);
    assert_eq!(from_json(&codec, &json, &mut ()), Ok(shapes.clone()));

    let bytes = to_transport_bytes(&codec, &shapes, &mut ()).unwrap();
    assert_eq!(from_transport_bytes(&codec, &bytes, &mut ()), Ok(shapes));
}

#[test]
fn nested_maps_and_lists() {
    let codec = MapCodec::new(StringCodec, ListCodec::new(SInt32Codec));
    let value: BTreeMap<String, Vec<i32>> = [
        ("a".to_owned(), vec![-1, 0, i32::MAX]),
        ("b".to_owned(), Vec::new()),
    ]
    .into_iter()
    .collect();

    let json = to_json(&codec, &value, &mut ()).unwrap();
    assert_eq!(json, r#"{"a":[-1,0,2147483647],"b":[]}"#);
    assert_eq!(from_json(&codec, &json, &mut ()), Ok(value.clone()));

    let bytes = to_transport_bytes(&codec, &value, &mut ()).unwrap();
    assert_eq!(from_transport_bytes(&codec, &bytes, &mut ()), Ok(value));
}

#[test]
fn truncated_bytes_are_an_error() {
    let codec = MultiTypeCodec::<Shape>::new();
    let bytes = to_transport_bytes(&codec, &rect(300, 4), &mut ()).unwrap();
    for end in 0..bytes.len() {
        assert!(
            from_transport_bytes(&codec, &bytes[..end], &mut ()).is_err(),
            "prefix of {end} bytes"
        );
    }
}
