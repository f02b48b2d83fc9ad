//! Shared binary formats for the nya engine asset pipeline
//!
//! This crate provides the on-disk formats shared between:
//! - `nya-export` (asset export core and inspection tool)
//! - engine-side loaders and round-trip tests
//!
//! # Modules
//!
//! - [`formats`] - Byte writer/reader, chunked container codec, mesh, material,
//!   skeleton and animation records
//!
//! All multi-byte values are little-endian regardless of the host.

pub mod formats;

// Re-export commonly used format items
pub use formats::{
    // Container
    decode_container,
    BinReader,
    BinWriter,
    Chunk,
    ChunkPayload,
    Container,
    // Errors
    DecodeError,
    EncodeError,
    // Records
    AnimationLayout,
    Curve,
    GeometryRef,
    IndexWidth,
    Joint,
    Material,
    MeshGeometry,
    MeshGroup,
    NyaAnimation,
    PositionKey,
    RotationKey,
    ScalarKey,
    TextureSlot,
    StringParam,
    VectorParam,
    VertexAttribute,
    vertex_stride,
    // Constants
    ANIM_MAGIC,
    ANIM_VERSION_CHUNKED,
    ANIM_VERSION_FLAT,
    CHUNK_MATERIALS,
    CHUNK_MESH,
    CHUNK_POSITION_CURVES,
    CHUNK_ROTATION_CURVES,
    CHUNK_SCALAR_CURVES,
    CHUNK_SKELETON,
    MESH_MAGIC,
};
