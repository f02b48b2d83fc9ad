//! Vertex row builder
//!
//! Scene extraction hands over one [`Vertex`] per face corner. The builder
//! lays the rows out in the canonical attribute order, applies the skinning
//! rules, tracks draw groups and finally deduplicates.
//!
//! Attribute order: position, texcoords, normal, color, bone indices,
//! bone weights.

use glam::{Vec2, Vec3, Vec4};
use nya_common::formats::{
    SEMANTIC_BONE_INDICES, SEMANTIC_BONE_WEIGHTS, SEMANTIC_COLOR, SEMANTIC_NORMAL,
    SEMANTIC_POSITION, SEMANTIC_TEXCOORD,
};
use nya_common::{Joint, Material, MeshGroup, VertexAttribute};

use super::model::MeshModel;
use crate::config::MeshConfig;
use crate::error::{ExportError, Result};

/// Most joints a single vertex can be bound to
pub const MAX_INFLUENCES: usize = 4;

/// Influences lighter than this are dropped before normalisation
pub const MIN_INFLUENCE_WEIGHT: f32 = 0.001;

/// Which optional columns a mesh carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexFormat {
    /// 0, 1 or 2
    pub uv_channels: u8,
    pub has_normal: bool,
    pub has_color: bool,
    pub skinned: bool,
}

/// Attribute descriptors for a vertex format.
///
/// With `pack_second_uv_channel` and two UV channels, both share one
/// 4-component `tc0_tc1` attribute.
pub fn attribute_layout(
    format: VertexFormat,
    pack_second_uv_channel: bool,
) -> Result<Vec<VertexAttribute>> {
    let mut attributes = vec![VertexAttribute::new(SEMANTIC_POSITION, 3, "pos")];

    match format.uv_channels {
        0 => {}
        1 => attributes.push(VertexAttribute::new(SEMANTIC_TEXCOORD, 2, "tc0")),
        2 if pack_second_uv_channel => {
            attributes.push(VertexAttribute::new(SEMANTIC_TEXCOORD, 4, "tc0_tc1"))
        }
        2 => {
            attributes.push(VertexAttribute::new(SEMANTIC_TEXCOORD, 2, "tc0"));
            attributes.push(VertexAttribute::new(SEMANTIC_TEXCOORD + 1, 2, "tc1"));
        }
        n => {
            return Err(ExportError::invariant(format!(
                "{} UV channels requested, at most 2 are supported",
                n
            )))
        }
    }

    if format.has_normal {
        attributes.push(VertexAttribute::new(SEMANTIC_NORMAL, 3, "normal"));
    }
    if format.has_color {
        attributes.push(VertexAttribute::new(SEMANTIC_COLOR, 4, "color"));
    }
    if format.skinned {
        attributes.push(VertexAttribute::new(SEMANTIC_BONE_INDICES, 4, "bone_idx"));
        attributes.push(VertexAttribute::new(SEMANTIC_BONE_WEIGHTS, 4, "bone_weight"));
    }

    Ok(attributes)
}

/// One face corner as extracted from the scene.
///
/// Columns the format does not carry are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub normal: Vec3,
    pub color: Vec4,
    /// `(joint index, weight)` pairs, any order
    pub influences: Vec<(u32, f32)>,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            uv0: Vec2::ZERO,
            uv1: Vec2::ZERO,
            normal: Vec3::Y,
            color: Vec4::ONE,
            influences: Vec::new(),
        }
    }

    pub fn with_uv(mut self, uv0: Vec2) -> Self {
        self.uv0 = uv0;
        self
    }

    pub fn with_uv1(mut self, uv1: Vec2) -> Self {
        self.uv1 = uv1;
        self
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_influence(mut self, joint: u32, weight: f32) -> Self {
        self.influences.push((joint, weight));
        self
    }
}

struct OpenGroup {
    name: String,
    material_index: usize,
    start: usize,
}

/// Accumulates vertex rows and draw groups into a [`MeshModel`].
pub struct MeshBuilder {
    model: MeshModel,
    format: VertexFormat,
    group: Option<OpenGroup>,
}

impl MeshBuilder {
    pub fn new(format: VertexFormat, config: &MeshConfig) -> Result<Self> {
        let model = MeshModel {
            attributes: attribute_layout(format, config.pack_second_uv_channel)?,
            ..MeshModel::default()
        };
        Ok(Self {
            model,
            format,
            group: None,
        })
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.model.attributes
    }

    pub fn vertex_count(&self) -> usize {
        self.model.vertex_count
    }

    /// Install the skeleton, sorted parent-before-child.
    ///
    /// Returns the old-to-new joint position map. Influences pushed afterwards
    /// must use the sorted positions (see [`MeshBuilder::joint_index`]).
    pub fn set_skeleton(&mut self, joints: Vec<Joint>) -> Result<Vec<usize>> {
        self.model.joints = joints;
        self.model.sort_joints()
    }

    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.model.joint_index(name)
    }

    /// Start a draw group at the current vertex, closing any open one.
    ///
    /// Returns the index of the group's material.
    pub fn begin_group(&mut self, name: &str, material: &str) -> usize {
        self.end_group();
        let material_index = self.model.add_material(material);
        self.group = Some(OpenGroup {
            name: name.to_string(),
            material_index,
            start: self.model.vertex_count,
        });
        material_index
    }

    pub fn end_group(&mut self) {
        if let Some(open) = self.group.take() {
            let count = self.model.vertex_count - open.start;
            self.model
                .groups
                .push(MeshGroup::new(open.name, open.material_index, open.start, count));
        }
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut Material> {
        self.model.material_mut(index)
    }

    /// Append one vertex row.
    pub fn push_vertex(&mut self, vertex: &Vertex) -> Result<()> {
        // Validate before touching the buffer so a failed push leaves no partial row
        let skin = if self.format.skinned {
            Some(self.skin_columns(vertex)?)
        } else {
            None
        };

        let data = &mut self.model.vertex_data;
        data.extend_from_slice(&vertex.position.to_array());

        // Packed or not, the second channel directly follows the first
        if self.format.uv_channels >= 1 {
            data.extend_from_slice(&vertex.uv0.to_array());
        }
        if self.format.uv_channels >= 2 {
            data.extend_from_slice(&vertex.uv1.to_array());
        }

        if self.format.has_normal {
            data.extend_from_slice(&vertex.normal.to_array());
        }
        if self.format.has_color {
            data.extend_from_slice(&vertex.color.to_array());
        }
        if let Some((indices, weights)) = skin {
            data.extend_from_slice(&indices);
            data.extend_from_slice(&weights);
        }

        self.model.vertex_count += 1;
        Ok(())
    }

    /// Bone index and weight columns, padded to [`MAX_INFLUENCES`].
    fn skin_columns(&self, vertex: &Vertex) -> Result<([f32; 4], [f32; 4])> {
        let kept: Vec<(u32, f32)> = vertex
            .influences
            .iter()
            .copied()
            .filter(|&(_, w)| w >= MIN_INFLUENCE_WEIGHT)
            .collect();

        if kept.len() > MAX_INFLUENCES {
            let group = self.group.as_ref().map_or("<none>", |g| g.name.as_str());
            return Err(ExportError::invariant(format!(
                "vertex {} in group '{}' has {} influences, at most {} are supported",
                self.model.vertex_count,
                group,
                kept.len(),
                MAX_INFLUENCES
            )));
        }

        if !self.model.joints.is_empty() {
            if let Some(&(joint, _)) = kept
                .iter()
                .find(|&&(j, _)| j as usize >= self.model.joints.len())
            {
                return Err(ExportError::invariant(format!(
                    "vertex {} bound to joint {} but the skeleton has {} joints",
                    self.model.vertex_count,
                    joint,
                    self.model.joints.len()
                )));
            }
        }

        let sum: f32 = kept.iter().map(|&(_, w)| w).sum();
        let mut indices = [0.0; MAX_INFLUENCES];
        let mut weights = [0.0; MAX_INFLUENCES];
        for (slot, &(joint, weight)) in kept.iter().enumerate() {
            indices[slot] = joint as f32;
            if sum > MIN_INFLUENCE_WEIGHT {
                weights[slot] = weight / sum;
            }
        }
        Ok((indices, weights))
    }

    /// Close the open group and deduplicate the rows.
    pub fn finish(mut self) -> Result<MeshModel> {
        self.end_group();
        self.model.build_indices()?;
        tracing::debug!(
            "Built mesh: {} unique vertices, {} indices, {} groups",
            self.model.vertex_count,
            self.model.index_count(),
            self.model.groups.len()
        );
        Ok(self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nya_common::formats::vertex_stride;

    fn config(pack: bool) -> MeshConfig {
        MeshConfig {
            pack_second_uv_channel: pack,
            ..MeshConfig::default()
        }
    }

    fn skinned() -> VertexFormat {
        VertexFormat {
            skinned: true,
            ..VertexFormat::default()
        }
    }

    fn names(attributes: &[VertexAttribute]) -> Vec<&str> {
        attributes.iter().map(|a| a.name.as_str()).collect()
    }

    // ========================================================================
    // Layout Tests
    // ========================================================================

    #[test]
    fn test_layout_order() {
        let format = VertexFormat {
            uv_channels: 1,
            has_normal: true,
            has_color: true,
            skinned: true,
        };
        let attributes = attribute_layout(format, true).unwrap();
        assert_eq!(
            names(&attributes),
            vec!["pos", "tc0", "normal", "color", "bone_idx", "bone_weight"]
        );
        let semantics: Vec<u8> = attributes.iter().map(|a| a.semantic).collect();
        assert_eq!(semantics, vec![0, 100, 1, 2, 102, 103]);
        assert_eq!(vertex_stride(&attributes), 3 + 2 + 3 + 4 + 4 + 4);
    }

    #[test]
    fn test_second_uv_packed() {
        let format = VertexFormat {
            uv_channels: 2,
            ..VertexFormat::default()
        };
        let attributes = attribute_layout(format, true).unwrap();
        assert_eq!(names(&attributes), vec!["pos", "tc0_tc1"]);
        assert_eq!(attributes[1].semantic, 100);
        assert_eq!(attributes[1].dimension, 4);
    }

    #[test]
    fn test_second_uv_separate() {
        let format = VertexFormat {
            uv_channels: 2,
            ..VertexFormat::default()
        };
        let attributes = attribute_layout(format, false).unwrap();
        assert_eq!(names(&attributes), vec!["pos", "tc0", "tc1"]);
        assert_eq!(attributes[2].semantic, 101);
        assert_eq!(attributes[2].dimension, 2);
    }

    #[test]
    fn test_too_many_uv_channels() {
        let format = VertexFormat {
            uv_channels: 3,
            ..VertexFormat::default()
        };
        assert!(matches!(
            attribute_layout(format, true),
            Err(ExportError::ModelInvariant(_))
        ));
    }

    // ========================================================================
    // Row Tests
    // ========================================================================

    #[test]
    fn test_packed_row_contents() {
        let format = VertexFormat {
            uv_channels: 2,
            has_normal: true,
            ..VertexFormat::default()
        };
        for pack in [true, false] {
            let mut builder = MeshBuilder::new(format, &config(pack)).unwrap();
            builder
                .push_vertex(
                    &Vertex::new(Vec3::new(1.0, 2.0, 3.0))
                        .with_uv(Vec2::new(0.25, 0.5))
                        .with_uv1(Vec2::new(0.75, 1.0)),
                )
                .unwrap();
            let model = builder.finish().unwrap();
            // Same floats either way; only the descriptors differ
            assert_eq!(
                model.vertex_data,
                vec![1.0, 2.0, 3.0, 0.25, 0.5, 0.75, 1.0, 0.0, 1.0, 0.0]
            );
            assert_eq!(model.stride(), 10);
        }
    }

    #[test]
    fn test_missing_uv_written_as_zero() {
        let format = VertexFormat {
            uv_channels: 2,
            ..VertexFormat::default()
        };
        let mut builder = MeshBuilder::new(format, &config(false)).unwrap();
        builder.push_vertex(&Vertex::new(Vec3::ZERO)).unwrap();
        assert_eq!(builder.finish().unwrap().vertex_data, vec![0.0; 7]);
    }

    // ========================================================================
    // Skinning Tests
    // ========================================================================

    #[test]
    fn test_weights_normalised_and_padded() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder
            .push_vertex(
                &Vertex::new(Vec3::ZERO)
                    .with_influence(3, 1.0)
                    .with_influence(1, 3.0),
            )
            .unwrap();
        let model = builder.finish().unwrap();
        assert_eq!(
            model.vertex_data,
            vec![0.0, 0.0, 0.0, 3.0, 1.0, 0.0, 0.0, 0.25, 0.75, 0.0, 0.0]
        );
    }

    #[test]
    fn test_tiny_weights_dropped() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder
            .push_vertex(
                &Vertex::new(Vec3::ZERO)
                    .with_influence(0, 0.0005)
                    .with_influence(1, 0.5)
                    .with_influence(2, 0.0001)
                    .with_influence(3, 0.5)
                    .with_influence(4, 0.0)
                    .with_influence(5, 0.0009),
            )
            .unwrap();
        let model = builder.finish().unwrap();
        assert_eq!(&model.vertex_data[3..7], &[1.0, 3.0, 0.0, 0.0]);
        assert_eq!(&model.vertex_data[7..11], &[0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_no_influences_gives_zero_weights() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder.push_vertex(&Vertex::new(Vec3::ZERO)).unwrap();
        assert_eq!(builder.finish().unwrap().vertex_data, vec![0.0; 11]);
    }

    #[test]
    fn test_too_many_influences() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder.begin_group("arm", "skin");
        let vertex = (0..5).fold(Vertex::new(Vec3::ZERO), |v, j| v.with_influence(j, 0.2));

        let err = builder.push_vertex(&vertex).unwrap_err();
        assert!(matches!(err, ExportError::ModelInvariant(_)));
        assert!(err.to_string().contains("'arm'"));
        assert_eq!(builder.vertex_count(), 0);
    }

    #[test]
    fn test_influence_outside_skeleton() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder.set_skeleton(vec![Joint::root("hip")]).unwrap();
        let err = builder
            .push_vertex(&Vertex::new(Vec3::ZERO).with_influence(1, 1.0))
            .unwrap_err();
        assert!(matches!(err, ExportError::ModelInvariant(_)));
    }

    #[test]
    fn test_skin_weights_keep_vertices_distinct() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        builder
            .push_vertex(&Vertex::new(Vec3::ZERO).with_influence(0, 1.0))
            .unwrap();
        builder
            .push_vertex(&Vertex::new(Vec3::ZERO).with_influence(1, 1.0))
            .unwrap();
        builder
            .push_vertex(&Vertex::new(Vec3::ZERO).with_influence(0, 1.0))
            .unwrap();
        let model = builder.finish().unwrap();
        assert_eq!(model.vertex_count, 2);
        assert_eq!(model.indices, Some(vec![0, 1, 0]));
    }

    // ========================================================================
    // Group Tests
    // ========================================================================

    #[test]
    fn test_groups_and_materials() {
        let format = VertexFormat::default();
        let mut builder = MeshBuilder::new(format, &MeshConfig::default()).unwrap();

        let wood = builder.begin_group("table", "wood");
        builder
            .material_mut(wood)
            .unwrap()
            .add_texture("diffuse", "wood.png");
        for x in [0.0, 1.0, 2.0] {
            builder.push_vertex(&Vertex::new(Vec3::new(x, 0.0, 0.0))).unwrap();
        }
        // begin_group closes the previous one
        builder.begin_group("legs", "steel");
        for x in [0.0, 3.0, 4.0] {
            builder.push_vertex(&Vertex::new(Vec3::new(x, 0.0, 0.0))).unwrap();
        }
        assert_eq!(builder.begin_group("top", "wood"), wood);
        for x in [5.0, 6.0, 7.0] {
            builder.push_vertex(&Vertex::new(Vec3::new(x, 0.0, 0.0))).unwrap();
        }

        let model = builder.finish().unwrap();
        assert_eq!(model.materials.len(), 2);
        assert_eq!(model.materials[0].textures.len(), 1);
        assert_eq!(
            model.groups,
            vec![
                MeshGroup::new("table", 0, 0, 3),
                MeshGroup::new("legs", 1, 3, 3),
                MeshGroup::new("top", 0, 6, 3),
            ]
        );
        // (0,0,0) is shared between the first two groups
        assert_eq!(model.vertex_count, 8);
        assert_eq!(model.index_count(), 9);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_set_skeleton_sorts() {
        let mut builder = MeshBuilder::new(skinned(), &MeshConfig::default()).unwrap();
        let map = builder
            .set_skeleton(vec![Joint::child("spine", 1), Joint::root("hip")])
            .unwrap();
        assert_eq!(map, vec![1, 0]);
        assert_eq!(builder.joint_index("hip"), Some(0));
        assert_eq!(builder.joint_index("spine"), Some(1));
    }
}
