//! The schema algebra: a closed, immutable family of type descriptors that
//! drive both [`crate::reader::Reader`] and [`crate::writer::Writer`].

pub mod build;
mod node;

pub use node::{BinaryKind, FieldDescriptor, SchemaNode, SchemaRef, StructBuilder, StructSchema};
