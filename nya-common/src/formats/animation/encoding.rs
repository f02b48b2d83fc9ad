//! Curve section encoding for both animation layouts

use glam::{Quat, Vec3};

use super::types::*;
use crate::formats::{
    BinReader, BinWriter, ChunkPayload, Container, DecodeError, EncodeError, ANIM_MAGIC,
};

/// A keyframe type that can be stored in a curve section
pub trait Keyframe: Sized {
    /// Chunk type of this curve kind in the chunked layout
    const CHUNK_TYPE: u32;

    /// Encoded size of one frame in bytes, time included
    const FRAME_SIZE: usize;

    fn write_frame(&self, w: &mut BinWriter);

    fn read_frame(r: &mut BinReader<'_>) -> Result<Self, DecodeError>;
}

impl Keyframe for PositionKey {
    const CHUNK_TYPE: u32 = CHUNK_POSITION_CURVES;
    const FRAME_SIZE: usize = 4 + 3 * 4;

    fn write_frame(&self, w: &mut BinWriter) {
        w.write_u32(self.time_ms);
        w.write_f32_slice(&self.position.to_array());
    }

    fn read_frame(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            time_ms: r.read_u32()?,
            position: Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?),
        })
    }
}

impl Keyframe for RotationKey {
    const CHUNK_TYPE: u32 = CHUNK_ROTATION_CURVES;
    const FRAME_SIZE: usize = 4 + 4 * 4;

    fn write_frame(&self, w: &mut BinWriter) {
        w.write_u32(self.time_ms);
        w.write_f32_slice(&self.rotation.to_array());
    }

    fn read_frame(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            time_ms: r.read_u32()?,
            rotation: Quat::from_xyzw(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?),
        })
    }
}

impl Keyframe for ScalarKey {
    const CHUNK_TYPE: u32 = CHUNK_SCALAR_CURVES;
    const FRAME_SIZE: usize = 4 + 4;

    fn write_frame(&self, w: &mut BinWriter) {
        w.write_u32(self.time_ms);
        w.write_f32(self.value);
    }

    fn read_frame(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            time_ms: r.read_u32()?,
            value: r.read_f32()?,
        })
    }
}

/// A curve section is a chunk payload in the chunked layout
impl<K: Keyframe> ChunkPayload for Vec<Curve<K>> {
    const CHUNK_TYPE: u32 = K::CHUNK_TYPE;

    fn write_payload(&self, w: &mut BinWriter) -> Result<(), EncodeError> {
        w.write_u32(EncodeError::check_u32("curves", self.len())?);
        for curve in self {
            w.write_string(&curve.bone_name)?;
            w.write_u32(EncodeError::check_u32("frames", curve.frames.len())?);
            for frame in &curve.frames {
                frame.write_frame(w);
            }
        }
        Ok(())
    }

    fn read_payload(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        let count = r.read_u32()? as usize;
        // name length (2) + frame count (4)
        let mut curves = Vec::with_capacity(count.min(r.remaining() / 6));
        for _ in 0..count {
            let mut curve = Curve::new(r.read_string()?);
            let frames = r.read_u32()? as usize;
            curve.frames.reserve(frames.min(r.remaining() / K::FRAME_SIZE));
            for _ in 0..frames {
                curve.frames.push(K::read_frame(r)?);
            }
            curves.push(curve);
        }
        Ok(curves)
    }
}

impl NyaAnimation {
    pub fn encode(&self, layout: AnimationLayout) -> Result<Vec<u8>, EncodeError> {
        match layout {
            AnimationLayout::Flat => self.encode_flat(),
            AnimationLayout::Chunked => self.encode_chunked(),
        }
    }

    /// Version 1: magic, version, then the three sections back to back
    pub fn encode_flat(&self) -> Result<Vec<u8>, EncodeError> {
        let mut w = BinWriter::new();
        w.write_bytes(&ANIM_MAGIC);
        w.write_u32(ANIM_VERSION_FLAT);
        self.position_curves.write_payload(&mut w)?;
        self.rotation_curves.write_payload(&mut w)?;
        self.scalar_curves.write_payload(&mut w)?;
        Ok(w.into_bytes())
    }

    /// Version 2: one container chunk per curve kind, always all three
    pub fn encode_chunked(&self) -> Result<Vec<u8>, EncodeError> {
        let mut container = Container::new(ANIM_MAGIC, ANIM_VERSION_CHUNKED);
        container.push(self.position_curves.to_chunk()?);
        container.push(self.rotation_curves.to_chunk()?);
        container.push(self.scalar_curves.to_chunk()?);
        container.encode()
    }

    /// Decode either layout, selected by the version field.
    ///
    /// In the chunked layout, repeated chunks of one kind are concatenated and
    /// unknown chunk types are skipped.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = BinReader::new(bytes);
        r.expect_magic(&ANIM_MAGIC)?;
        match r.read_u32()? {
            ANIM_VERSION_FLAT => {
                let anim = Self {
                    position_curves: Vec::<Curve<PositionKey>>::read_payload(&mut r)?,
                    rotation_curves: Vec::<Curve<RotationKey>>::read_payload(&mut r)?,
                    scalar_curves: Vec::<Curve<ScalarKey>>::read_payload(&mut r)?,
                };
                r.finish()?;
                Ok(anim)
            }
            ANIM_VERSION_CHUNKED => {
                let container = Container::decode(bytes, &ANIM_MAGIC)?;
                let mut anim = Self::default();
                for chunk in &container.chunks {
                    match chunk.chunk_type {
                        CHUNK_POSITION_CURVES => anim
                            .position_curves
                            .extend(Vec::<Curve<PositionKey>>::from_chunk(chunk)?),
                        CHUNK_ROTATION_CURVES => anim
                            .rotation_curves
                            .extend(Vec::<Curve<RotationKey>>::from_chunk(chunk)?),
                        CHUNK_SCALAR_CURVES => anim
                            .scalar_curves
                            .extend(Vec::<Curve<ScalarKey>>::from_chunk(chunk)?),
                        _ => {}
                    }
                }
                Ok(anim)
            }
            other => Err(DecodeError::UnsupportedVersion(other)),
        }
    }

    /// Version field of an encoded animation, after checking the magic
    pub fn peek_version(bytes: &[u8]) -> Result<u32, DecodeError> {
        let mut r = BinReader::new(bytes);
        r.expect_magic(&ANIM_MAGIC)?;
        r.read_u32()
    }
}
