//! Property-based tests for the codec.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use wirepack::{decode, encode, Decoder, Limits, PackError, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        any::<f32>().prop_map(Value::from),
        ".{0,40}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..300).prop_map(Value::binary),
        prop::collection::vec(any::<u8>(), 0..40).prop_map(Value::string_bytes),
        (any::<i8>(), prop::collection::vec(any::<u8>(), 0..20))
            .prop_map(|(tag, data)| Value::extension(tag, data)),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 64, 20, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..20).prop_map(Value::from),
            prop::collection::vec((inner.clone(), inner), 0..20).prop_map(Value::from_pairs),
        ]
    })
}

// Property: decode(encode(v)) == v
proptest! {
    #[test]
    fn prop_round_trip(v in value()) {
        let bytes = encode(&v).unwrap();
        let decoded = decode(&bytes, Limits::default()).unwrap();
        prop_assert_eq!(&decoded, &v);
        prop_assert_eq!(encode(&decoded).unwrap(), bytes);
    }
}

// Property: encoding is deterministic
proptest! {
    #[test]
    fn prop_encoding_deterministic(v in value()) {
        prop_assert_eq!(encode(&v).unwrap(), encode(&v.clone()).unwrap());
    }
}

// Property: every strict prefix of a valid message is insufficient input
proptest! {
    #[test]
    fn prop_truncation_detected(v in value(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&v).unwrap();
        let cut = cut.index(bytes.len());
        let result = decode(&bytes[..cut], Limits::default());
        prop_assert!(matches!(result, Err(PackError::InsufficientInput { .. })), "{:?}", result);
    }
}

// Property: arbitrary input never panics and failures leave the cursor in place
proptest! {
    #[test]
    fn prop_arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder = Decoder::with_limits(&data, Limits::default().with_max_depth(16));
        match decoder.decode_value() {
            Ok(_) => prop_assert!(decoder.position() > 0),
            Err(_) => prop_assert_eq!(decoder.position(), 0),
        }
        let mut skipper = Decoder::with_limits(&data, Limits::default().with_max_depth(16));
        let _ = skipper.skip_value();
    }
}

// Property: skipping consumes exactly what decoding consumes
proptest! {
    #[test]
    fn prop_skip_matches_decode(v in value(), tail in prop::collection::vec(any::<u8>(), 0..8)) {
        let mut bytes = encode(&v).unwrap();
        let len = bytes.len();
        bytes.extend_from_slice(&tail);
        let mut decoder = Decoder::new(&bytes);
        decoder.skip_value().unwrap();
        prop_assert_eq!(decoder.position(), len);
    }
}
