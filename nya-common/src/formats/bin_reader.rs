//! Bounds-checked little-endian reader over a borrowed byte slice

use super::DecodeError;

/// Cursor over a byte slice. Every read checks the remaining length.
#[derive(Debug, Clone)]
pub struct BinReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BinReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Fail with [`DecodeError::TrailingBytes`] unless all input was consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::Truncated {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidString)
    }

    /// Read `count` floats. The length is checked before allocating.
    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>, DecodeError> {
        let bytes = self.read_bytes(checked_size(count, 4, self.remaining())?)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u32>, DecodeError> {
        let bytes = self.read_bytes(checked_size(count, 2, self.remaining())?)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as u32)
            .collect())
    }

    pub fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>, DecodeError> {
        let bytes = self.read_bytes(checked_size(count, 4, self.remaining())?)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Consume an exact byte signature (e.g. a container magic).
    pub fn expect_magic(&mut self, magic: &[u8]) -> Result<(), DecodeError> {
        let found = self.read_bytes(magic.len())?;
        if found != magic {
            return Err(DecodeError::BadMagic {
                expected: String::from_utf8_lossy(magic).into_owned(),
                found: String::from_utf8_lossy(found).into_owned(),
            });
        }
        Ok(())
    }
}

fn checked_size(count: usize, elem: usize, remaining: usize) -> Result<usize, DecodeError> {
    count.checked_mul(elem).ok_or(DecodeError::Truncated {
        needed: usize::MAX,
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::BinWriter;

    #[test]
    fn test_reads_back_writer_output() {
        let mut w = BinWriter::new();
        w.write_u8(7);
        w.write_u16(513);
        w.write_i32(-5);
        w.write_f32(2.5);
        w.write_string("spine").unwrap();
        let bytes = w.into_bytes();

        let mut r = BinReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 513);
        assert_eq!(r.read_i32().unwrap(), -5);
        assert_eq!(r.read_f32().unwrap(), 2.5);
        assert_eq!(r.read_string().unwrap(), "spine");
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_short_read_reports_truncation() {
        let mut r = BinReader::new(&[1, 2, 3]);
        assert_eq!(
            r.read_u32(),
            Err(DecodeError::Truncated {
                needed: 4,
                remaining: 3
            })
        );
        // Failed read does not advance
        assert_eq!(r.remaining(), 3);
    }

    #[test]
    fn test_string_longer_than_input() {
        let mut r = BinReader::new(&[10, 0, b'a']);
        assert!(matches!(
            r.read_string(),
            Err(DecodeError::Truncated { needed: 10, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut r = BinReader::new(&[1, 0, 0xFF]);
        assert_eq!(r.read_string(), Err(DecodeError::InvalidString));
    }

    #[test]
    fn test_huge_count_does_not_allocate() {
        let mut r = BinReader::new(&[0; 8]);
        assert!(r.read_f32_vec(usize::MAX).is_err());
        assert!(r.read_u32_vec(1 << 20).is_err());
    }

    #[test]
    fn test_magic_mismatch() {
        let mut r = BinReader::new(b"nya animXXXX");
        let err = r.expect_magic(b"nya mesh").unwrap_err();
        assert_eq!(
            err,
            DecodeError::BadMagic {
                expected: "nya mesh".to_string(),
                found: "nya anim".to_string()
            }
        );
    }
}
