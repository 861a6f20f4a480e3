//! A codec for the Apache Thrift Compact Protocol.
//!
//! The crate is organized around a small schema algebra ([`schema`]) that
//! describes a message's shape independent of any generated code, a
//! dynamically-typed [`value::Value`] tree that [`decode`] produces and
//! [`encode`] consumes, and a schema-free [`pretty`] dumper for inspecting
//! payloads whose shape isn't known up front.

pub mod config;
pub mod error;
pub mod pretty;
mod reader;
pub mod schema;
mod varint;
pub mod value;
mod wire;
mod writer;

pub use config::CodecConfig;
pub use error::{CodecError, SchemaError};
pub use reader::{decode, decode_with_config};
pub use schema::{SchemaNode, SchemaRef};
pub use value::Value;
pub use wire::TypeTag;
pub use writer::{encode, encode_with_config};
