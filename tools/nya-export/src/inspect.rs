//! File inspection and re-encoding
//!
//! Both operations detect the asset kind from the 8-byte magic.

use std::path::Path;

use nya_common::{DecodeError, NyaAnimation, ANIM_MAGIC, MESH_MAGIC};

use crate::animation::{decode_animation, write_animation_file};
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::mesh::{decode_mesh, write_mesh_file, MeshFile};

/// Kind of nya asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Animation,
}

impl AssetKind {
    /// Detect the kind from the leading magic.
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        match bytes.get(..8) {
            Some(magic) if magic == MESH_MAGIC => Ok(Self::Mesh),
            Some(magic) if magic == ANIM_MAGIC => Ok(Self::Animation),
            Some(magic) => Err(DecodeError::BadMagic {
                expected: "nya mesh | nya anim".to_string(),
                found: String::from_utf8_lossy(magic).into_owned(),
            }
            .into()),
            None => Err(ExportError::Truncated {
                needed: 8,
                remaining: bytes.len(),
            }),
        }
    }
}

/// A decoded asset of either kind
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Mesh(MeshFile),
    Animation(NyaAnimation),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Mesh(_) => AssetKind::Mesh,
            Asset::Animation(_) => AssetKind::Animation,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(match AssetKind::detect(bytes)? {
            AssetKind::Mesh => Asset::Mesh(decode_mesh(bytes)?),
            AssetKind::Animation => Asset::Animation(decode_animation(bytes)?),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ExportError::io(path, e))?;
        Self::decode(&bytes)
    }
}

/// Decode a file and log a summary of its contents.
pub fn inspect(path: &Path) -> Result<Asset> {
    let asset = Asset::load(path)?;
    match &asset {
        Asset::Mesh(file) => log_mesh(path, file),
        Asset::Animation(anim) => log_animation(path, anim),
    }
    Ok(asset)
}

fn log_mesh(path: &Path, file: &MeshFile) {
    let model = &file.model;
    tracing::info!(
        "{:?}: mesh v{}, {} vertices (stride {}), {} indices",
        path,
        file.version,
        model.vertex_count,
        model.stride(),
        model.index_count()
    );
    for a in &model.attributes {
        tracing::info!("  attribute '{}': type {}, {} floats", a.name, a.semantic, a.dimension);
    }
    for g in &model.groups {
        let material = model
            .materials
            .get(g.material_index)
            .map_or("<missing>", |m| m.name.as_str());
        tracing::info!(
            "  group '{}': {}+{} material '{}'",
            g.name,
            g.offset,
            g.count,
            material
        );
    }
    for m in &model.materials {
        tracing::info!(
            "  material '{}': {} textures, {} params, {} vector params",
            m.name,
            m.textures.len(),
            m.params.len(),
            m.vec_params.len()
        );
    }
    if !model.joints.is_empty() {
        let roots = model.joints.iter().filter(|j| j.is_root()).count();
        tracing::info!("  skeleton: {} joints, {} roots", model.joints.len(), roots);
    }
}

fn log_animation(path: &Path, anim: &NyaAnimation) {
    tracing::info!(
        "{:?}: animation, {} curves, {} frames, {} ms",
        path,
        anim.curve_count(),
        anim.frame_count(),
        anim.duration_ms()
    );
    for c in &anim.position_curves {
        tracing::info!("  position '{}': {} frames", c.bone_name, c.frames.len());
    }
    for c in &anim.rotation_curves {
        tracing::info!("  rotation '{}': {} frames", c.bone_name, c.frames.len());
    }
    for c in &anim.scalar_curves {
        tracing::info!("  scalar '{}': {} frames", c.bone_name, c.frames.len());
    }
}

/// Decode `input` and write it back to `output` with the configured container
/// version and animation layout.
///
/// A mesh skeleton that is not parent-before-child is sorted on the way, with
/// the skin bone indices rewritten to match.
pub fn convert(input: &Path, output: &Path, config: &ExportConfig) -> Result<AssetKind> {
    let mut asset = Asset::load(input)?;
    if let Asset::Mesh(file) = &mut asset {
        file.model.sort_skeleton()?;
    }
    match &asset {
        Asset::Mesh(file) => write_mesh_file(output, &file.model, &config.mesh)?,
        Asset::Animation(anim) => write_animation_file(output, anim, &config.animation)?,
    }
    Ok(asset.kind())
}
