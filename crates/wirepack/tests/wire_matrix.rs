use wirepack::{decode, decode_prefix, encode, Encoder, Limits, PackError, Timestamp, Value};

fn obj(fields: &[(&str, Value)]) -> Value {
    Value::from_pairs(fields.iter().map(|(k, v)| (*k, v.clone())))
}

#[test]
fn scalar_wire_matrix() {
    let cases: Vec<(Value, Vec<u8>)> = vec![
        (Value::Nil, vec![0xc0]),
        (Value::from(false), vec![0xc2]),
        (Value::from(true), vec![0xc3]),
        (Value::from(0), vec![0x00]),
        (Value::from(5), vec![0x05]),
        (Value::from(127), vec![0x7f]),
        (Value::from(128), vec![0xcc, 0x80]),
        (Value::from(255), vec![0xcc, 0xff]),
        (Value::from(65_535), vec![0xcd, 0xff, 0xff]),
        (Value::from(4_294_967_295u64), vec![0xce, 0xff, 0xff, 0xff, 0xff]),
        (
            Value::from(4_294_967_296u64),
            vec![0xcf, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00],
        ),
        (Value::from(-1), vec![0xff]),
        (Value::from(-32), vec![0xe0]),
        (Value::from(-128), vec![0xd0, 0x80]),
        (Value::from(-32_768), vec![0xd1, 0x80, 0x00]),
        (Value::from(-2_147_483_648i64), vec![0xd2, 0x80, 0x00, 0x00, 0x00]),
        (Value::from(0.5), vec![0xca, 0x3f, 0x00, 0x00, 0x00]),
        (
            Value::from(1.1),
            vec![0xcb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a],
        ),
        (Value::from(""), vec![0xa0]),
        (Value::from("foo"), vec![0xa3, b'f', b'o', b'o']),
        (Value::binary(vec![1u8, 2]), vec![0xc4, 0x02, 0x01, 0x02]),
        (Value::extension(5, vec![0xaau8]), vec![0xd4, 0x05, 0xaa]),
    ];
    for (value, bytes) in cases {
        assert_eq!(encode(&value).unwrap(), bytes, "encode {value:?}");
        assert_eq!(decode(&bytes, Limits::default()).unwrap(), value, "decode {bytes:02x?}");
    }
}

#[test]
fn container_header_boundaries() {
    let arr_15: Value = (1..=15).map(Value::from).collect();
    let encoded = encode(&arr_15).unwrap();
    assert_eq!(encoded[0], 0x9f);
    assert_eq!(encoded.len(), 16);

    let arr_16: Value = (1..=16).map(Value::from).collect();
    let encoded = encode(&arr_16).unwrap();
    assert_eq!(&encoded[..3], &[0xdc, 0x00, 0x10]);
    assert_eq!(encoded.len(), 19);

    let map_16 = Value::from_pairs((0..16).map(|i| (i.to_string(), Value::from(i))));
    let encoded = encode(&map_16).unwrap();
    assert_eq!(&encoded[..3], &[0xde, 0x00, 0x10]);
    assert_eq!(decode(&encoded, Limits::default()).unwrap(), map_16);
}

#[test]
fn non_canonical_input_decodes_to_same_value() {
    let wide = [0xd3, 0, 0, 0, 0, 0, 0, 0, 0x05];
    assert_eq!(decode(&wide, Limits::default()).unwrap(), Value::from(5));
    let wide_str = [0xda, 0x00, 0x01, b'x'];
    assert_eq!(decode(&wide_str, Limits::default()).unwrap(), Value::from("x"));
    let wide_arr = [0xdd, 0, 0, 0, 1, 0xc0];
    assert_eq!(
        decode(&wide_arr, Limits::default()).unwrap(),
        Value::from(vec![Value::Nil])
    );
    // re-encoding yields the canonical form
    assert_eq!(encode(&decode(&wide, Limits::default()).unwrap()).unwrap(), [0x05]);
}

#[test]
fn nested_document_round_trips_byte_for_byte() {
    let value = obj(&[
        ("a", Value::from(1)),
        ("b", Value::from(vec![Value::from(2), Value::Nil])),
    ]);
    let bytes = encode(&value).unwrap();
    assert_eq!(
        bytes,
        [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x92, 0x02, 0xc0]
    );
    let decoded = decode(&bytes, Limits::default()).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(encode(&decoded).unwrap(), bytes);
}

#[test]
fn timestamp_layouts() {
    let ts32 = Value::from(Timestamp::new(1, 0).unwrap());
    assert_eq!(encode(&ts32).unwrap(), [0xd6, 0xff, 0, 0, 0, 1]);

    let ts64 = Value::from(Timestamp::new(1, 1).unwrap());
    assert_eq!(&encode(&ts64).unwrap()[..2], &[0xd7, 0xff]);

    let ts96 = Value::from(Timestamp::new(-1, 0).unwrap());
    let bytes = encode(&ts96).unwrap();
    assert_eq!(&bytes[..3], &[0xc7, 12, 0xff]);
    let decoded = decode(&bytes, Limits::default()).unwrap();
    assert_eq!(decoded.as_timestamp().unwrap(), Timestamp::new(-1, 0).unwrap());
}

#[test]
fn encoder_streams_multiple_values() {
    let mut encoder = Encoder::new();
    encoder.write_value(&Value::from(1)).unwrap();
    encoder.write_str("hi").unwrap();
    encoder.write_array_header(1).unwrap();
    encoder.write_nil();
    let bytes = encoder.flush();
    assert_eq!(bytes, [0x01, 0xa2, b'h', b'i', 0x91, 0xc0]);

    let (first, used) = decode_prefix(&bytes, Limits::default()).unwrap();
    assert_eq!(first, Value::from(1));
    assert_eq!(used, 1);
    assert!(matches!(
        decode(&bytes, Limits::default()),
        Err(PackError::TrailingBytes { offset: 1, remaining: 5 })
    ));
}
