//! Mesh model and encoder (-> .nms)

mod builder;
mod indices;
mod model;

// Re-export public API
pub use builder::{
    attribute_layout, MeshBuilder, Vertex, VertexFormat, MAX_INFLUENCES, MIN_INFLUENCE_WEIGHT,
};
pub use model::{decode_mesh, encode_mesh, write_mesh_file, MeshFile, MeshModel};
