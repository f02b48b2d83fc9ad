//! Append-only little-endian byte writer
//!
//! Counts are never prefixed implicitly: slice writers emit raw elements and
//! the caller writes the count field the format asks for.

use super::EncodeError;

/// Growable byte buffer with typed little-endian appends.
#[derive(Debug, Clone, Default)]
pub struct BinWriter {
    data: Vec<u8>,
}

impl BinWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a string as `u16` byte length followed by raw UTF-8, no terminator.
    ///
    /// An empty string is just a zero length. Strings longer than 65535 bytes
    /// are rejected rather than truncated.
    pub fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        let len = u16::try_from(value.len())
            .map_err(|_| EncodeError::StringTooLong { len: value.len() })?;
        self.write_u16(len);
        self.data.extend_from_slice(value.as_bytes());
        Ok(())
    }

    pub fn write_f32_slice(&mut self, values: &[f32]) {
        self.data.reserve(values.len() * 4);
        for v in values {
            self.write_f32(*v);
        }
    }

    /// Write indices narrowed to `u16`. Caller guarantees every value fits.
    pub fn write_u16_slice(&mut self, values: &[u32]) {
        self.data.reserve(values.len() * 2);
        for v in values {
            debug_assert!(*v <= u16::MAX as u32);
            self.write_u16(*v as u16);
        }
    }

    pub fn write_u32_slice(&mut self, values: &[u32]) {
        self.data.reserve(values.len() * 4);
        for v in values {
            self.write_u32(*v);
        }
    }

    /// Embed already-encoded bytes (e.g. a chunk payload).
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut w = BinWriter::new();
        w.write_u8(0xAB);
        w.write_u16(0x0102);
        w.write_u32(0x0304_0506);
        w.write_i32(-1);
        w.write_f32(1.0);

        assert_eq!(
            w.as_bytes(),
            &[
                0xAB, // u8
                0x02, 0x01, // u16
                0x06, 0x05, 0x04, 0x03, // u32
                0xFF, 0xFF, 0xFF, 0xFF, // i32
                0x00, 0x00, 0x80, 0x3F, // f32 1.0
            ]
        );
    }

    #[test]
    fn test_string_prefix_and_no_terminator() {
        let mut w = BinWriter::new();
        w.write_string("hip").unwrap();
        w.write_string("").unwrap();
        assert_eq!(w.as_bytes(), &[3, 0, b'h', b'i', b'p', 0, 0]);
    }

    #[test]
    fn test_utf8_length_is_in_bytes() {
        let mut w = BinWriter::new();
        w.write_string("ä").unwrap();
        assert_eq!(w.as_bytes(), &[2, 0, 0xC3, 0xA4]);
    }

    #[test]
    fn test_oversize_string_rejected() {
        let long = "x".repeat(u16::MAX as usize + 1);
        let mut w = BinWriter::new();
        assert_eq!(
            w.write_string(&long),
            Err(EncodeError::StringTooLong {
                len: u16::MAX as usize + 1
            })
        );
        assert!(w.is_empty());
    }

    #[test]
    fn test_slices_have_no_count_prefix() {
        let mut w = BinWriter::new();
        w.write_u16_slice(&[1, 2]);
        w.write_u32_slice(&[3]);
        w.write_f32_slice(&[0.5]);
        assert_eq!(w.len(), 2 * 2 + 4 + 4);
        assert_eq!(&w.as_bytes()[0..4], &[1, 0, 2, 0]);
    }
}
