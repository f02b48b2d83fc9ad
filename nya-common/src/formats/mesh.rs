//! Mesh geometry chunk (type 0) of a `.nms` container
//!
//! # Layout
//! ```text
//! bbox [f32; 6]                 - reserved, written as zeros
//! attr_count u8
//! attr_count × { type u8, dimension u8, name string }
//! vertex_count u32
//! vertex_data [f32; vertex_count × stride]
//! index_width u8                - 0 (none), 2 (u16) or 4 (u32)
//! if index_width != 0:
//!     index_count u32
//!     indices [u16 | u32; index_count]
//! lod_count u16                 - always 1
//! group_count u16
//! group_count × {
//!     name string
//!     reserved [f32; 6]
//!     material_index u16
//!     offset u32
//!     count u32
//! }
//! ```
//!
//! The stride is the sum of all attribute dimensions, in floats.

use super::{BinReader, BinWriter, ChunkPayload, DecodeError, EncodeError};

/// Chunk type of the mesh geometry section
pub const CHUNK_MESH: u32 = 0;

pub const SEMANTIC_POSITION: u8 = 0;
pub const SEMANTIC_NORMAL: u8 = 1;
pub const SEMANTIC_COLOR: u8 = 2;
/// First texcoord-family semantic; channel `n` is `SEMANTIC_TEXCOORD + n`
pub const SEMANTIC_TEXCOORD: u8 = 100;
/// Skin joint indices, stored as floats
pub const SEMANTIC_BONE_INDICES: u8 = SEMANTIC_TEXCOORD + 2;
pub const SEMANTIC_BONE_WEIGHTS: u8 = SEMANTIC_TEXCOORD + 3;

/// Number of LOD levels written; multi-LOD meshes are not produced
pub const LOD_COUNT: u16 = 1;

/// One column group of the per-vertex layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: u8,
    /// Component count, 1..=4
    pub dimension: u8,
    /// Advisory name, may be empty
    pub name: String,
}

impl VertexAttribute {
    pub fn new(semantic: u8, dimension: u8, name: impl Into<String>) -> Self {
        Self {
            semantic,
            dimension,
            name: name.into(),
        }
    }
}

/// Floats per vertex for a layout
pub fn vertex_stride(attributes: &[VertexAttribute]) -> usize {
    attributes.iter().map(|a| a.dimension as usize).sum()
}

/// Contiguous draw range bound to one material
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshGroup {
    pub name: String,
    pub material_index: usize,
    /// First vertex (unindexed) or first index (indexed)
    pub offset: usize,
    pub count: usize,
}

impl MeshGroup {
    pub fn new(
        name: impl Into<String>,
        material_index: usize,
        offset: usize,
        count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            material_index,
            offset,
            count,
        }
    }

    /// One past the last vertex/index covered by the group
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.count)
    }
}

/// Index element width as stored in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IndexWidth {
    None = 0,
    U16 = 2,
    U32 = 4,
}

impl IndexWidth {
    /// Narrowest width for an index buffer.
    ///
    /// 16-bit is used while the count fits in a `u16` (and every value does);
    /// anything larger switches to 32-bit.
    pub fn select(indices: &[u32]) -> Self {
        if indices.is_empty() {
            Self::None
        } else if indices.len() <= u16::MAX as usize
            && indices.iter().all(|&i| i <= u16::MAX as u32)
        {
            Self::U16
        } else {
            Self::U32
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::None),
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            other => Err(DecodeError::InvalidIndexWidth(other)),
        }
    }
}

/// Borrowed view of mesh geometry, used to encode without copying buffers
#[derive(Debug, Clone, Copy)]
pub struct GeometryRef<'a> {
    pub bbox: [f32; 6],
    pub attributes: &'a [VertexAttribute],
    pub vertex_count: usize,
    pub vertex_data: &'a [f32],
    /// Empty when the mesh is not indexed
    pub indices: &'a [u32],
    pub groups: &'a [MeshGroup],
}

impl GeometryRef<'_> {
    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::select(self.indices)
    }

    pub fn write(&self, w: &mut BinWriter) -> Result<(), EncodeError> {
        w.write_f32_slice(&self.bbox);

        w.write_u8(EncodeError::check_u8("vertex attributes", self.attributes.len())?);
        for a in self.attributes {
            w.write_u8(a.semantic);
            w.write_u8(a.dimension);
            w.write_string(&a.name)?;
        }

        w.write_u32(EncodeError::check_u32("vertices", self.vertex_count)?);
        w.write_f32_slice(self.vertex_data);

        let width = self.index_width();
        w.write_u8(width as u8);
        match width {
            IndexWidth::None => {}
            IndexWidth::U16 => {
                w.write_u32(self.indices.len() as u32);
                w.write_u16_slice(self.indices);
            }
            IndexWidth::U32 => {
                w.write_u32(EncodeError::check_u32("indices", self.indices.len())?);
                w.write_u32_slice(self.indices);
            }
        }

        w.write_u16(LOD_COUNT);
        w.write_u16(EncodeError::check_u16("groups", self.groups.len())?);
        for g in self.groups {
            w.write_string(&g.name)?;
            // Per-group bounds, reserved
            w.write_f32_slice(&[0.0; 6]);
            w.write_u16(EncodeError::check_u16("material index", g.material_index)?);
            w.write_u32(EncodeError::check_u32("group offset", g.offset)?);
            w.write_u32(EncodeError::check_u32("group count", g.count)?);
        }
        Ok(())
    }
}

/// Owned mesh geometry, as read back from a container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub bbox: [f32; 6],
    pub attributes: Vec<VertexAttribute>,
    pub vertex_count: usize,
    pub vertex_data: Vec<f32>,
    pub indices: Vec<u32>,
    pub groups: Vec<MeshGroup>,
}

impl MeshGeometry {
    pub fn as_geometry_ref(&self) -> GeometryRef<'_> {
        GeometryRef {
            bbox: self.bbox,
            attributes: &self.attributes,
            vertex_count: self.vertex_count,
            vertex_data: &self.vertex_data,
            indices: &self.indices,
            groups: &self.groups,
        }
    }

    pub fn stride(&self) -> usize {
        vertex_stride(&self.attributes)
    }

    /// Floats of vertex `index`, `None` when out of range
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vertex_count {
            return None;
        }
        let stride = self.stride();
        self.vertex_data.get(index * stride..(index + 1) * stride)
    }
}

impl ChunkPayload for MeshGeometry {
    const CHUNK_TYPE: u32 = CHUNK_MESH;

    fn write_payload(&self, w: &mut BinWriter) -> Result<(), EncodeError> {
        self.as_geometry_ref().write(w)
    }

    fn read_payload(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        let mut bbox = [0.0; 6];
        for v in &mut bbox {
            *v = r.read_f32()?;
        }

        let attr_count = r.read_u8()?;
        let mut attributes = Vec::with_capacity(attr_count as usize);
        for _ in 0..attr_count {
            let semantic = r.read_u8()?;
            let dimension = r.read_u8()?;
            let name = r.read_string()?;
            attributes.push(VertexAttribute::new(semantic, dimension, name));
        }

        let vertex_count = r.read_u32()? as usize;
        let float_count = vertex_count
            .checked_mul(vertex_stride(&attributes))
            .ok_or(DecodeError::Truncated {
                needed: usize::MAX,
                remaining: r.remaining(),
            })?;
        let vertex_data = r.read_f32_vec(float_count)?;

        let indices = match IndexWidth::from_u8(r.read_u8()?)? {
            IndexWidth::None => Vec::new(),
            IndexWidth::U16 => {
                let count = r.read_u32()? as usize;
                r.read_u16_vec(count)?
            }
            IndexWidth::U32 => {
                let count = r.read_u32()? as usize;
                r.read_u32_vec(count)?
            }
        };

        let _lod_count = r.read_u16()?;
        let group_count = r.read_u16()?;
        let mut groups = Vec::with_capacity(group_count as usize);
        for _ in 0..group_count {
            let name = r.read_string()?;
            r.read_bytes(6 * 4)?;
            let material_index = r.read_u16()? as usize;
            let offset = r.read_u32()? as usize;
            let count = r.read_u32()? as usize;
            groups.push(MeshGroup::new(name, material_index, offset, count));
        }

        Ok(Self {
            bbox,
            attributes,
            vertex_count,
            vertex_data,
            indices,
            groups,
        })
    }
}
