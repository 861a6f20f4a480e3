//! Whole-schema round-trip tests exercising the public `decode`/`encode`
//! surface against shared fixtures.

use indexmap::IndexMap;
use thrift_compact::schema::build;
use thrift_compact::{
    decode, decode_with_config, encode, encode_with_config, CodecConfig, CodecError, Value,
};
use thrift_compact_test_utils::{
    nested_schema, nested_value, optional_absent_value, optional_present_value, optional_schema,
    scalar_schema, scalar_value, schema_versions,
};

#[test]
fn scalar_struct_round_trips() {
    let schema = scalar_schema();
    let value = scalar_value();
    let bytes = encode(&value, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn nested_struct_round_trips() {
    let schema = nested_schema();
    let value = nested_value();
    let bytes = encode(&value, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn optional_field_present_round_trips() {
    let schema = optional_schema();
    let value = optional_present_value();
    let bytes = encode(&value, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn optional_field_absent_round_trips() {
    let schema = optional_schema();
    let value = optional_absent_value();
    let bytes = encode(&value, &schema).unwrap();
    let decoded = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, value);
}

/// A payload written by a newer schema (with a field an older reader has
/// never heard of) still decodes cleanly against the older schema: the
/// unknown field is skipped, not an error.
#[test]
fn forward_compatible_reader_skips_unknown_field() {
    let (small, big) = schema_versions();

    let mut fields = IndexMap::new();
    fields.insert("id".to_string(), Value::I32(7));
    fields.insert("added_later".to_string(), Value::Str("surprise".to_string()));
    let value = Value::Struct(fields);

    let bytes = encode(&value, &big).unwrap();
    let decoded = decode(&bytes, &small).unwrap();

    let mut expected = IndexMap::new();
    expected.insert("id".to_string(), Value::I32(7));
    assert_eq!(decoded, Value::Struct(expected));
}

/// A payload written by an older schema (missing a field a newer reader
/// knows about) decodes cleanly too: the newer field is simply absent from
/// the result, since `optional` has no wire effect either way.
#[test]
fn backward_compatible_reader_tolerates_missing_field() {
    let (small, big) = schema_versions();

    let mut fields = IndexMap::new();
    fields.insert("id".to_string(), Value::I32(9));
    let value = Value::Struct(fields);

    let bytes = encode(&value, &small).unwrap();
    let decoded = decode(&bytes, &big).unwrap();

    let mut expected = IndexMap::new();
    expected.insert("id".to_string(), Value::I32(9));
    assert_eq!(decoded, Value::Struct(expected));
}

/// Field numbers within 1..=15 of the previous field use the one-byte
/// short form; anything further apart falls back to the long form (a
/// type-only byte plus a zigzag varint16 of the absolute field number).
#[test]
fn short_form_field_delta_is_one_byte_longer_gap_is_not() {
    let short = build::struct_([("a", build::field(1, build::i32_()))]).unwrap();
    let mut fields = IndexMap::new();
    fields.insert("a".to_string(), Value::I32(0));
    let short_bytes = encode(&Value::Struct(fields), &short).unwrap();
    // header byte + zigzag(0)=0 byte + stop byte
    assert_eq!(short_bytes.len(), 3);

    let long = build::struct_([("a", build::field(20, build::i32_()))]).unwrap();
    let mut fields = IndexMap::new();
    fields.insert("a".to_string(), Value::I32(0));
    let long_bytes = encode(&Value::Struct(fields), &long).unwrap();
    // type-only byte + 2-byte varint(zigzag(20)) + value byte + stop byte
    assert_eq!(long_bytes.len(), 5);
}

#[test]
fn depth_guard_rejects_deeply_nested_payload_on_decode() {
    let mut schema = build::struct_([("n", build::field(1, build::i32_()))]).unwrap();
    for _ in 0..10 {
        schema = build::struct_([("child", build::field(1, schema))]).unwrap();
    }

    let mut value = {
        let mut f = IndexMap::new();
        f.insert("n".to_string(), Value::I32(1));
        Value::Struct(f)
    };
    for _ in 0..10 {
        let mut f = IndexMap::new();
        f.insert("child".to_string(), value);
        value = Value::Struct(f);
    }

    let permissive = CodecConfig::new(64);
    let bytes = encode_with_config(&value, &schema, &permissive).unwrap();

    let strict = CodecConfig::new(4);
    let err = decode_with_config(&bytes, &schema, &strict).unwrap_err();
    assert_eq!(err, CodecError::DepthExceeded { max: 4 });
}
