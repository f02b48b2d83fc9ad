//! nya binary asset formats
//!
//! Two container files are produced by the exporter:
//!
//! - `.nms` - mesh, materials and skeleton, magic `"nya mesh"`
//! - `.nan` - animation curves, magic `"nya anim"`
//!
//! Both share the chunked container codec in [`container`]: an 8-byte magic,
//! a version, and an ordered list of `(type, length, payload)` chunks. Readers
//! dispatch on chunk type, never on position.
//!
//! Every chunk payload implements [`ChunkPayload`] so the container can be
//! filled and read back generically.

pub mod animation;
mod bin_reader;
mod bin_writer;
pub mod container;
mod error;
pub mod material;
pub mod mesh;
mod serialization;
pub mod skeleton;

pub use animation::*;
pub use bin_reader::BinReader;
pub use bin_writer::BinWriter;
pub use container::{decode_container, Chunk, Container, ANIM_MAGIC, MESH_MAGIC};
pub use error::{DecodeError, EncodeError};
pub use material::*;
pub use mesh::*;
pub use serialization::ChunkPayload;
pub use skeleton::*;
