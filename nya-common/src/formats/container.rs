//! Chunked container codec shared by `.nms` and `.nan` files
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 8]        - "nya mesh" or "nya anim", no NUL
//! 0x08: version u32
//! 0x0C: chunk_count u32
//! 0x10: chunks, each:
//!       type u32
//!       length u32
//!       payload [u8; length]
//! ```
//!
//! Chunks keep insertion order. Types may repeat; readers must treat the
//! chunk list as a sequence and dispatch on type.

use super::{BinReader, BinWriter, DecodeError, EncodeError};

/// Magic for mesh/material/skeleton containers
pub const MESH_MAGIC: [u8; 8] = *b"nya mesh";

/// Magic for animation files (flat and chunked layouts)
pub const ANIM_MAGIC: [u8; 8] = *b"nya anim";

/// Size of magic + version + chunk count
pub const CONTAINER_HEADER_SIZE: usize = 16;

/// Size of a chunk's type + length prefix
pub const CHUNK_HEADER_SIZE: usize = 8;

/// A typed, length-prefixed section of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: u32,
    pub payload: Vec<u8>,
}

impl Chunk {
    pub fn new(chunk_type: u32, payload: Vec<u8>) -> Self {
        Self {
            chunk_type,
            payload,
        }
    }
}

/// Decoded (or to-be-encoded) container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub magic: [u8; 8],
    pub version: u32,
    pub chunks: Vec<Chunk>,
}

impl Container {
    pub fn new(magic: [u8; 8], version: u32) -> Self {
        Self {
            magic,
            version,
            chunks: Vec::new(),
        }
    }

    /// Append a chunk. No sorting, no deduplication of types.
    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// All chunks of the given type, in file order
    pub fn chunks_of(&self, chunk_type: u32) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().filter(move |c| c.chunk_type == chunk_type)
    }

    pub fn first_chunk(&self, chunk_type: u32) -> Option<&Chunk> {
        self.chunks_of(chunk_type).next()
    }

    /// Total encoded size in bytes
    pub fn encoded_size(&self) -> usize {
        CONTAINER_HEADER_SIZE
            + self
                .chunks
                .iter()
                .map(|c| CHUNK_HEADER_SIZE + c.payload.len())
                .sum::<usize>()
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut w = BinWriter::with_capacity(self.encoded_size());
        w.write_bytes(&self.magic);
        w.write_u32(self.version);
        w.write_u32(EncodeError::check_u32("chunks", self.chunks.len())?);
        for chunk in &self.chunks {
            w.write_u32(chunk.chunk_type);
            w.write_u32(EncodeError::check_u32("chunk payload bytes", chunk.payload.len())?);
            w.write_bytes(&chunk.payload);
        }
        Ok(w.into_bytes())
    }

    /// Decode a container, requiring `magic` to match exactly.
    ///
    /// Bytes left over after the declared chunks are rejected.
    pub fn decode(bytes: &[u8], magic: &[u8; 8]) -> Result<Self, DecodeError> {
        let mut r = BinReader::new(bytes);
        r.expect_magic(magic)?;
        let version = r.read_u32()?;
        let count = r.read_u32()? as usize;

        // Each chunk needs at least its 8-byte header
        let mut chunks = Vec::with_capacity(count.min(r.remaining() / CHUNK_HEADER_SIZE));
        for _ in 0..count {
            let chunk_type = r.read_u32()?;
            let len = r.read_u32()? as usize;
            let payload = r.read_bytes(len)?.to_vec();
            chunks.push(Chunk {
                chunk_type,
                payload,
            });
        }
        r.finish()?;

        Ok(Self {
            magic: *magic,
            version,
            chunks,
        })
    }
}

/// Decode a mesh container (`"nya mesh"`) into its version and chunks.
pub fn decode_container(bytes: &[u8]) -> Result<Container, DecodeError> {
    Container::decode(bytes, &MESH_MAGIC)
}
