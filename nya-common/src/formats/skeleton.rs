//! Skeleton chunk (type 1) of a `.nms` container
//!
//! # Layout
//! ```text
//! joint_count u32
//! joint_count × {
//!     name string
//!     rotation [f32; 4]   (x, y, z, w)
//!     position [f32; 3]
//!     parent i32          (-1 = root)
//! }
//! ```
//!
//! Joints are stored parent-before-child: every `parent` is either -1 or
//! smaller than the joint's own index.

use glam::{Quat, Vec3};

use super::{BinReader, BinWriter, ChunkPayload, DecodeError, EncodeError};

/// Chunk type of the skeleton section
pub const CHUNK_SKELETON: u32 = 1;

/// Parent index of a root joint
pub const ROOT_PARENT: i32 = -1;

/// One bone in bind pose, relative to its parent
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub rotation: Quat,
    pub position: Vec3,
    pub parent: i32,
}

impl Joint {
    pub fn new(name: impl Into<String>, rotation: Quat, position: Vec3, parent: i32) -> Self {
        Self {
            name: name.into(),
            rotation,
            position,
            parent,
        }
    }

    /// Root joint at the origin with identity rotation
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, Quat::IDENTITY, Vec3::ZERO, ROOT_PARENT)
    }

    /// Joint at the origin with identity rotation under `parent`
    pub fn child(name: impl Into<String>, parent: i32) -> Self {
        Self::new(name, Quat::IDENTITY, Vec3::ZERO, parent)
    }

    pub fn is_root(&self) -> bool {
        self.parent == ROOT_PARENT
    }
}

impl ChunkPayload for Vec<Joint> {
    const CHUNK_TYPE: u32 = CHUNK_SKELETON;

    fn write_payload(&self, w: &mut BinWriter) -> Result<(), EncodeError> {
        w.write_u32(EncodeError::check_u32("joints", self.len())?);
        for joint in self {
            w.write_string(&joint.name)?;
            w.write_f32_slice(&joint.rotation.to_array());
            w.write_f32_slice(&joint.position.to_array());
            w.write_i32(joint.parent);
        }
        Ok(())
    }

    fn read_payload(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        let count = r.read_u32()? as usize;
        // name length (2) + 7 floats + parent: at least 34 bytes per joint
        let mut joints = Vec::with_capacity(count.min(r.remaining() / 34));
        for _ in 0..count {
            let name = r.read_string()?;
            let rotation = Quat::from_xyzw(
                r.read_f32()?,
                r.read_f32()?,
                r.read_f32()?,
                r.read_f32()?,
            );
            let position = Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
            let parent = r.read_i32()?;
            joints.push(Joint::new(name, rotation, position, parent));
        }
        Ok(joints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_record_layout() {
        let joints = vec![Joint::new(
            "hip",
            Quat::from_xyzw(0.0, 0.0, 0.0, 1.0),
            Vec3::new(1.0, 2.0, 3.0),
            ROOT_PARENT,
        )];
        let chunk = joints.to_chunk().unwrap();
        let p = &chunk.payload;

        assert_eq!(chunk.chunk_type, 1);
        // count + name(2 + 3) + 7 floats + parent
        assert_eq!(p.len(), 4 + 5 + 28 + 4);
        assert_eq!(&p[0..4], &1u32.to_le_bytes());
        assert_eq!(&p[4..9], &[3, 0, b'h', b'i', b'p']);
        // w is the fourth rotation float
        assert_eq!(&p[21..25], &1.0f32.to_le_bytes());
        assert_eq!(&p[25..29], &1.0f32.to_le_bytes());
        assert_eq!(&p[37..41], &(-1i32).to_le_bytes());
    }

    #[test]
    fn test_skeleton_chunk_roundtrip() {
        let joints = vec![
            Joint::root("hip"),
            Joint::new(
                "spine",
                Quat::from_xyzw(0.1, 0.2, 0.3, 0.9),
                Vec3::new(0.0, 1.0, 0.0),
                0,
            ),
            Joint::child("chest", 1),
        ];
        let chunk = joints.to_chunk().unwrap();
        assert_eq!(Vec::<Joint>::from_chunk(&chunk).unwrap(), joints);
    }

    #[test]
    fn test_truncated_joint() {
        let chunk = vec![Joint::root("hip")].to_chunk().unwrap();
        let mut r = BinReader::new(&chunk.payload[..chunk.payload.len() - 2]);
        assert!(matches!(
            Vec::<Joint>::read_payload(&mut r),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
