//! Chunk payload serialization trait.
//!
//! Every record that travels as a container chunk implements `ChunkPayload`
//! so containers can be filled and read back through one interface. The
//! chunk type is an associated constant; the payload body is written with a
//! [`BinWriter`] and read with a [`BinReader`].

use super::{BinReader, BinWriter, Chunk, DecodeError, EncodeError};

/// Trait for records stored as one container chunk.
///
/// # Example
///
/// ```
/// use nya_common::formats::{ChunkPayload, Joint};
///
/// let skeleton = vec![Joint::root("hip")];
///
/// let chunk = skeleton.to_chunk().unwrap();
/// assert_eq!(chunk.chunk_type, <Vec<Joint> as ChunkPayload>::CHUNK_TYPE);
///
/// let parsed = Vec::<Joint>::from_chunk(&chunk).unwrap();
/// assert_eq!(parsed, skeleton);
/// ```
pub trait ChunkPayload: Sized {
    /// Chunk type tag written in the container.
    const CHUNK_TYPE: u32;

    /// Append the payload body.
    fn write_payload(&self, w: &mut BinWriter) -> Result<(), EncodeError>;

    /// Parse the payload body. Must not read past the record.
    fn read_payload(r: &mut BinReader<'_>) -> Result<Self, DecodeError>;

    fn to_chunk(&self) -> Result<Chunk, EncodeError> {
        let mut w = BinWriter::new();
        self.write_payload(&mut w)?;
        Ok(Chunk::new(Self::CHUNK_TYPE, w.into_bytes()))
    }

    /// Parse a chunk; the payload must be consumed exactly.
    fn from_chunk(chunk: &Chunk) -> Result<Self, DecodeError> {
        let mut r = BinReader::new(&chunk.payload);
        let value = Self::read_payload(&mut r)?;
        r.finish()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{Joint, Material, CHUNK_MATERIALS, CHUNK_SKELETON};

    /// Demonstrates generic function using the trait
    fn chunk_type_of<T: ChunkPayload>() -> u32 {
        T::CHUNK_TYPE
    }

    #[test]
    fn test_chunk_type_tags() {
        assert_eq!(chunk_type_of::<Vec<Joint>>(), CHUNK_SKELETON);
        assert_eq!(chunk_type_of::<Vec<Material>>(), CHUNK_MATERIALS);
    }

    #[test]
    fn test_from_chunk_rejects_trailing_payload() {
        let mut chunk = vec![Joint::root("hip")].to_chunk().unwrap();
        chunk.payload.push(0);
        assert_eq!(
            Vec::<Joint>::from_chunk(&chunk),
            Err(DecodeError::TrailingBytes(1))
        );
    }
}
