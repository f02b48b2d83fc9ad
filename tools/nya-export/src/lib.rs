//! nya-export library
//!
//! Export core of the nya asset pipeline: in-memory mesh and animation
//! models, the steps that normalise them (vertex deduplication, skeleton
//! ordering, material registration) and the encoders that turn them into
//! `.nms` / `.nan` container files.
//!
//! Scene extraction lives in the DCC plugins; they fill a [`MeshBuilder`] or
//! [`NyaAnimation`] and call into this crate.

pub mod animation;
pub mod config;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod mesh;
pub mod skeleton;

// Re-export the container codec and records from nya-common
pub use nya_common::{
    decode_container, AnimationLayout, Container, Curve, Joint, Material, MeshGroup,
    NyaAnimation, VertexAttribute,
};

// Math types used by joints, keyframes and vertices
pub use glam::{Quat, Vec2, Vec3, Vec4};

pub use animation::{decode_animation, encode_animation, write_animation_file};
pub use config::{AnimationConfig, ExportConfig, MeshConfig};
pub use error::{ExportError, Result};
pub use inspect::{convert, inspect, Asset, AssetKind};
pub use mesh::{
    decode_mesh, encode_mesh, write_mesh_file, MeshBuilder, MeshFile, MeshModel, Vertex,
    VertexFormat,
};
