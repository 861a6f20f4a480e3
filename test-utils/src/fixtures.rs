//! Schema/value pairs shared by `core`'s integration tests and benches.

use indexmap::IndexMap;
use thrift_compact::schema::{build, SchemaRef};
use thrift_compact::value::{MapKey, Value};

/// A flat struct exercising every scalar type the protocol supports.
pub fn scalar_schema() -> SchemaRef {
    build::struct_([
        ("id", build::field(1, build::i32_())),
        ("active", build::field(2, build::bool_())),
        ("score", build::field(3, build::double())),
        ("weight", build::field(4, build::float())),
        ("name", build::field(5, build::string())),
        ("tag", build::field(6, build::byte())),
        ("count", build::field(7, build::i16_())),
        ("big_count", build::field(8, build::i64_())),
        ("payload", build::field(9, build::binary())),
    ])
    .expect("fixture field names are unique")
}

pub fn scalar_value() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("id".to_string(), Value::I32(42));
    fields.insert("active".to_string(), Value::Bool(true));
    fields.insert("score".to_string(), Value::Double(2.5));
    fields.insert("weight".to_string(), Value::Float(1.5));
    fields.insert("name".to_string(), Value::Str("widget".to_string()));
    fields.insert("tag".to_string(), Value::Byte(-7));
    fields.insert("count".to_string(), Value::I16(300));
    fields.insert("big_count".to_string(), Value::I64(-9_000_000_000));
    fields.insert("payload".to_string(), Value::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    Value::Struct(fields)
}

/// A struct with a nested struct, a list, and a map field.
pub fn nested_schema() -> SchemaRef {
    let address = build::struct_([
        ("city", build::field(1, build::string())),
        ("zip", build::field(2, build::i32_())),
    ])
    .expect("fixture field names are unique");
    build::struct_([
        ("name", build::field(1, build::string())),
        ("address", build::field(2, address)),
        ("aliases", build::field(3, build::list(build::string()))),
        (
            "scores_by_subject",
            build::field(
                4,
                build::map(build::string(), build::i32_()).expect("string keys are valid"),
            ),
        ),
    ])
    .expect("fixture field names are unique")
}

pub fn nested_value() -> Value {
    let mut address = IndexMap::new();
    address.insert("city".to_string(), Value::Str("Springfield".to_string()));
    address.insert("zip".to_string(), Value::I32(12345));

    let mut scores = IndexMap::new();
    scores.insert(MapKey::Str("math".to_string()), Value::I32(95));
    scores.insert(MapKey::Str("art".to_string()), Value::I32(88));

    let mut fields = IndexMap::new();
    fields.insert("name".to_string(), Value::Str("Alex".to_string()));
    fields.insert("address".to_string(), Value::Struct(address));
    fields.insert(
        "aliases".to_string(),
        Value::List(vec![
            Value::Str("al".to_string()),
            Value::Str("lex".to_string()),
        ]),
    );
    fields.insert("scores_by_subject".to_string(), Value::Map(scores));
    Value::Struct(fields)
}

/// A struct whose second field is optional and, in [`optional_absent_value`],
/// left out entirely — the wire encoding of "optional" is "not written".
pub fn optional_schema() -> SchemaRef {
    build::struct_([
        ("id", build::field(1, build::i32_())),
        ("nickname", build::field(2, build::string()).optional()),
    ])
    .expect("fixture field names are unique")
}

pub fn optional_present_value() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("id".to_string(), Value::I32(1));
    fields.insert("nickname".to_string(), Value::Str("al".to_string()));
    Value::Struct(fields)
}

pub fn optional_absent_value() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("id".to_string(), Value::I32(1));
    Value::Struct(fields)
}

/// A pair of schemas for the same logical message at two points in its
/// evolution: `small` is what an older reader knows about, `big` adds a
/// field an older reader has never heard of. Encoding with `big` and
/// decoding with `small` exercises unknown-field skipping; encoding with
/// `small` and decoding with `big` exercises a newer reader tolerating an
/// absent newly-added field.
pub fn schema_versions() -> (SchemaRef, SchemaRef) {
    let small =
        build::struct_([("id", build::field(1, build::i32_()))]).expect("fixture field names are unique");
    let big = build::struct_([
        ("id", build::field(1, build::i32_())),
        ("added_later", build::field(2, build::string()).optional()),
    ])
    .expect("fixture field names are unique");
    (small, big)
}
