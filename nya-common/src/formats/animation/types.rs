//! Animation data types

use glam::{Quat, Vec3};
use serde::Deserialize;

/// Chunk type of the position curve section
pub const CHUNK_POSITION_CURVES: u32 = 0;
/// Chunk type of the rotation curve section
pub const CHUNK_ROTATION_CURVES: u32 = 1;
/// Chunk type of the scalar curve section
pub const CHUNK_SCALAR_CURVES: u32 = 2;

/// Version tag of the flat layout
pub const ANIM_VERSION_FLAT: u32 = 1;
/// Version tag of the chunked layout
pub const ANIM_VERSION_CHUNKED: u32 = 2;

/// On-disk layout of an animation file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationLayout {
    /// Version 1 sequential sections, the layout engine loaders read
    #[default]
    Flat,
    /// Version 2 chunked container, opt-in
    Chunked,
}

impl AnimationLayout {
    pub fn version(self) -> u32 {
        match self {
            Self::Flat => ANIM_VERSION_FLAT,
            Self::Chunked => ANIM_VERSION_CHUNKED,
        }
    }
}

/// Position keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionKey {
    pub time_ms: u32,
    pub position: Vec3,
}

/// Rotation keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationKey {
    pub time_ms: u32,
    pub rotation: Quat,
}

/// Scalar keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKey {
    pub time_ms: u32,
    pub value: f32,
}

/// Time-ordered keyframes for one bone
#[derive(Debug, Clone, PartialEq)]
pub struct Curve<K> {
    pub bone_name: String,
    pub frames: Vec<K>,
}

impl<K> Curve<K> {
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: K) -> &mut Self {
        self.frames.push(frame);
        self
    }
}

impl Curve<PositionKey> {
    pub fn key(&mut self, time_ms: u32, position: Vec3) -> &mut Self {
        self.push(PositionKey { time_ms, position })
    }
}

impl Curve<RotationKey> {
    pub fn key(&mut self, time_ms: u32, rotation: Quat) -> &mut Self {
        self.push(RotationKey { time_ms, rotation })
    }
}

impl Curve<ScalarKey> {
    pub fn key(&mut self, time_ms: u32, value: f32) -> &mut Self {
        self.push(ScalarKey { time_ms, value })
    }
}

/// Animation clip: three independent curve collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NyaAnimation {
    pub position_curves: Vec<Curve<PositionKey>>,
    pub rotation_curves: Vec<Curve<RotationKey>>,
    pub scalar_curves: Vec<Curve<ScalarKey>>,
}

impl NyaAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position curve for `bone`, created on first use
    pub fn add_position_curve(&mut self, bone: &str) -> &mut Curve<PositionKey> {
        find_or_insert(&mut self.position_curves, bone)
    }

    /// Rotation curve for `bone`, created on first use
    pub fn add_rotation_curve(&mut self, bone: &str) -> &mut Curve<RotationKey> {
        find_or_insert(&mut self.rotation_curves, bone)
    }

    /// Scalar curve for `name`, created on first use
    pub fn add_scalar_curve(&mut self, name: &str) -> &mut Curve<ScalarKey> {
        find_or_insert(&mut self.scalar_curves, name)
    }

    pub fn curve_count(&self) -> usize {
        self.position_curves.len() + self.rotation_curves.len() + self.scalar_curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curve_count() == 0
    }

    /// Total number of keyframes across all curves
    pub fn frame_count(&self) -> usize {
        self.position_curves.iter().map(|c| c.frames.len()).sum::<usize>()
            + self.rotation_curves.iter().map(|c| c.frames.len()).sum::<usize>()
            + self.scalar_curves.iter().map(|c| c.frames.len()).sum::<usize>()
    }

    /// Largest keyframe time in the clip, 0 if there are no keys
    pub fn duration_ms(&self) -> u32 {
        let pos = self.position_curves.iter().flat_map(|c| &c.frames).map(|f| f.time_ms);
        let rot = self.rotation_curves.iter().flat_map(|c| &c.frames).map(|f| f.time_ms);
        let scalar = self.scalar_curves.iter().flat_map(|c| &c.frames).map(|f| f.time_ms);
        pos.chain(rot).chain(scalar).max().unwrap_or(0)
    }
}

fn find_or_insert<'a, K>(curves: &'a mut Vec<Curve<K>>, name: &str) -> &'a mut Curve<K> {
    let index = match curves.iter().position(|c| c.bone_name == name) {
        Some(i) => i,
        None => {
            curves.push(Curve::new(name));
            curves.len() - 1
        }
    };
    &mut curves[index]
}
