//! In-memory mesh model and its container encoding

use std::path::Path;

use nya_common::formats::{vertex_stride, ChunkPayload, MESH_MAGIC};
use nya_common::{
    BinWriter, Chunk, Container, GeometryRef, Joint, Material, MeshGeometry, MeshGroup,
    VertexAttribute, CHUNK_MATERIALS, CHUNK_MESH, CHUNK_SKELETON,
};

use crate::config::MeshConfig;
use crate::error::{ExportError, Result};
use crate::formats::write_atomic;

/// Mesh as assembled by scene-extraction code, before encoding.
///
/// Built once per export, mutated only while building, then encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshModel {
    /// Row-major vertex floats, one row per vertex, columns per `attributes`
    pub vertex_data: Vec<f32>,
    pub vertex_count: usize,
    pub attributes: Vec<VertexAttribute>,
    /// Present only after [`MeshModel::build_indices`] (or when decoded)
    pub indices: Option<Vec<u32>>,
    pub groups: Vec<MeshGroup>,
    /// Unique by name, see [`MeshModel::add_material`]
    pub materials: Vec<Material>,
    pub joints: Vec<Joint>,
}

impl MeshModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Floats per vertex according to the attribute layout
    pub fn stride(&self) -> usize {
        vertex_stride(&self.attributes)
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Register a material by name and return its index.
    ///
    /// Registering an existing name returns the existing index.
    pub fn add_material(&mut self, name: &str) -> usize {
        if let Some(index) = self.materials.iter().position(|m| m.name == name) {
            return index;
        }
        self.materials.push(Material::new(name));
        self.materials.len() - 1
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut Material> {
        self.materials.get_mut(index)
    }

    /// Check every invariant the encoder relies on.
    pub fn validate(&self) -> Result<()> {
        for a in &self.attributes {
            if !(1..=4).contains(&a.dimension) {
                return Err(ExportError::invariant(format!(
                    "attribute '{}' has dimension {}, expected 1..=4",
                    a.name, a.dimension
                )));
            }
        }

        if self.vertex_count == 0 {
            if !self.vertex_data.is_empty() {
                return Err(ExportError::invariant(format!(
                    "{} vertex floats but vertex count is 0",
                    self.vertex_data.len()
                )));
            }
        } else {
            if self.vertex_data.len() % self.vertex_count != 0 {
                return Err(ExportError::invariant(format!(
                    "{} vertex floats is not a multiple of vertex count {}",
                    self.vertex_data.len(),
                    self.vertex_count
                )));
            }
            let data_stride = self.vertex_data.len() / self.vertex_count;
            if data_stride != self.stride() {
                return Err(ExportError::invariant(format!(
                    "vertex data stride {} does not match attribute layout stride {}",
                    data_stride,
                    self.stride()
                )));
            }
        }

        if let Some(indices) = &self.indices {
            if let Some(bad) = indices.iter().find(|&&i| i as usize >= self.vertex_count) {
                return Err(ExportError::invariant(format!(
                    "index {} out of range for {} vertices",
                    bad, self.vertex_count
                )));
            }
        }

        let limit = self.indices.as_ref().map_or(self.vertex_count, Vec::len);
        for g in &self.groups {
            if g.offset.checked_add(g.count).map_or(true, |end| end > limit) {
                return Err(ExportError::invariant(format!(
                    "group '{}' range {}+{} exceeds {} {}",
                    g.name,
                    g.offset,
                    g.count,
                    limit,
                    if self.indices.is_some() { "indices" } else { "vertices" }
                )));
            }
            if g.material_index >= self.materials.len() {
                tracing::warn!(
                    "Group '{}' uses material {} but only {} materials are defined",
                    g.name,
                    g.material_index,
                    self.materials.len()
                );
            }
        }

        for (i, joint) in self.joints.iter().enumerate() {
            if joint.parent != -1 && (joint.parent < 0 || joint.parent as usize >= i) {
                return Err(ExportError::invariant(format!(
                    "joint '{}' at {} has parent {}; joints must be sorted parent-before-child",
                    joint.name, i, joint.parent
                )));
            }
        }

        Ok(())
    }

    fn geometry(&self) -> GeometryRef<'_> {
        GeometryRef {
            // Bounds are reserved and not computed
            bbox: [0.0; 6],
            attributes: &self.attributes,
            vertex_count: self.vertex_count,
            vertex_data: &self.vertex_data,
            indices: self.indices.as_deref().unwrap_or(&[]),
            groups: &self.groups,
        }
    }

    /// Build the container: mesh chunk if there are vertices, then materials,
    /// then skeleton, each only when non-empty.
    pub fn to_container(&self, config: &MeshConfig) -> Result<Container> {
        self.validate()?;

        let mut container = Container::new(MESH_MAGIC, config.container_version);

        if self.vertex_count > 0 {
            let mut w = BinWriter::new();
            self.geometry().write(&mut w)?;
            container.push(Chunk::new(CHUNK_MESH, w.into_bytes()));
        }
        if !self.materials.is_empty() {
            container.push(self.materials.to_chunk()?);
        }
        if !self.joints.is_empty() {
            container.push(self.joints.to_chunk()?);
        }

        Ok(container)
    }
}

/// Encode a mesh model to `.nms` bytes.
///
/// Joints must already be parent-before-child (see
/// [`MeshModel::sort_joints`]); an unsorted skeleton fails validation.
pub fn encode_mesh(model: &MeshModel, config: &MeshConfig) -> Result<Vec<u8>> {
    let bytes = model.to_container(config)?.encode()?;
    tracing::debug!(
        "Encoded mesh: {} vertices, {} indices ({:?}), {} groups, {} materials, {} joints, {} b",
        model.vertex_count,
        model.index_count(),
        model.geometry().index_width(),
        model.groups.len(),
        model.materials.len(),
        model.joints.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Encode and write a `.nms` file. The target is replaced atomically.
pub fn write_mesh_file(path: &Path, model: &MeshModel, config: &MeshConfig) -> Result<()> {
    let bytes = encode_mesh(model, config)?;
    write_atomic(path, &bytes)?;
    tracing::info!(
        "Saved mesh {:?}: {} vertices, {} indices, {:.1} kb",
        path,
        model.vertex_count,
        model.index_count(),
        bytes.len() as f32 / 1024.0
    );
    Ok(())
}

/// A decoded `.nms` file
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFile {
    pub version: u32,
    pub model: MeshModel,
}

/// Decode `.nms` bytes back into a mesh model.
///
/// Chunks are dispatched by type. Repeated materials and skeleton chunks are
/// concatenated; only the first mesh chunk is used.
pub fn decode_mesh(bytes: &[u8]) -> Result<MeshFile> {
    let container = nya_common::decode_container(bytes)?;
    let mut model = MeshModel::new();
    let mut have_geometry = false;

    for chunk in &container.chunks {
        match chunk.chunk_type {
            CHUNK_MESH if have_geometry => {
                tracing::warn!("Ignoring extra mesh chunk ({} bytes)", chunk.payload.len());
            }
            CHUNK_MESH => {
                let geometry = MeshGeometry::from_chunk(chunk)?;
                model.vertex_count = geometry.vertex_count;
                model.vertex_data = geometry.vertex_data;
                model.attributes = geometry.attributes;
                model.indices = (!geometry.indices.is_empty()).then_some(geometry.indices);
                model.groups = geometry.groups;
                have_geometry = true;
            }
            CHUNK_MATERIALS => model.materials.extend(Vec::<Material>::from_chunk(chunk)?),
            CHUNK_SKELETON => model.joints.extend(Vec::<Joint>::from_chunk(chunk)?),
            other => {
                tracing::warn!("Skipping unknown chunk type {}", other);
            }
        }
    }

    Ok(MeshFile {
        version: container.version,
        model,
    })
}
