#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use polycodec::codec::{
    BooleanCodec, Float64Codec, ListCodec, MapCodec, SInt64Codec, StringCodec,
    from_transport_bytes, to_transport_bytes,
};

type Model = BTreeMap<String, Vec<i64>>;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail, never panic; whatever decodes
    // must encode back to bytes that decode to the same value.
    let codec = MapCodec::new(StringCodec, ListCodec::new(SInt64Codec));
    let decoded: Result<Model, _> = from_transport_bytes(&codec, data, &mut ());
    if let Ok(value) = decoded {
        let bytes = to_transport_bytes(&codec, &value, &mut ()).unwrap();
        let again: Model = from_transport_bytes(&codec, &bytes, &mut ()).unwrap();
        assert_eq!(again, value);
    }

    let _: Result<Vec<bool>, _> = from_transport_bytes(&ListCodec::new(BooleanCodec), data, &mut ());
    let _: Result<Vec<f64>, _> = from_transport_bytes(&ListCodec::new(Float64Codec), data, &mut ());
});
