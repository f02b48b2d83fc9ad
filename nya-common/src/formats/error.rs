//! Encode and decode errors for nya binary formats

use thiserror::Error;

/// Failure while reading a nya container or record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: String, found: String },

    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("Truncated input: needed {needed} bytes, only {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid index width {0} (expected 0, 2 or 4)")]
    InvalidIndexWidth(u8),

    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),

    #[error("String is not valid UTF-8")]
    InvalidString,
}

/// A value that cannot be represented in the wire format.
///
/// The byte writer itself never fails; these come from count and length
/// fields whose width is fixed by the format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("String of {len} bytes exceeds the u16 length prefix")]
    StringTooLong { len: usize },

    #[error("Too many {what}: {count} (max {max})")]
    CountOverflow {
        what: &'static str,
        count: usize,
        max: usize,
    },
}

impl EncodeError {
    pub(crate) fn check_u8(what: &'static str, count: usize) -> Result<u8, Self> {
        u8::try_from(count).map_err(|_| Self::CountOverflow {
            what,
            count,
            max: u8::MAX as usize,
        })
    }

    pub(crate) fn check_u16(what: &'static str, count: usize) -> Result<u16, Self> {
        u16::try_from(count).map_err(|_| Self::CountOverflow {
            what,
            count,
            max: u16::MAX as usize,
        })
    }

    pub(crate) fn check_u32(what: &'static str, count: usize) -> Result<u32, Self> {
        u32::try_from(count).map_err(|_| Self::CountOverflow {
            what,
            count,
            max: u32::MAX as usize,
        })
    }
}
