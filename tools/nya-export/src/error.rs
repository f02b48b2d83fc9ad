//! Error taxonomy for export operations
//!
//! Every variant is fatal to the current export; nothing is downgraded to a
//! warning.

use std::path::PathBuf;

use nya_common::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file format: {0}")]
    Format(DecodeError),

    #[error("Truncated input: needed {needed} bytes, only {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Model invariant violated: {0}")]
    ModelInvariant(String),

    #[error("Cyclic skeleton: parent chain of joint '{joint}' never reaches a root")]
    CyclicSkeleton { joint: String },

    #[error("Invalid export config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::ModelInvariant(msg.into())
    }
}

impl From<DecodeError> for ExportError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Truncated { needed, remaining } => Self::Truncated { needed, remaining },
            other => Self::Format(other),
        }
    }
}

/// A count or string that does not fit its wire field is a model problem
impl From<EncodeError> for ExportError {
    fn from(err: EncodeError) -> Self {
        Self::ModelInvariant(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_gets_its_own_variant() {
        let err: ExportError = DecodeError::Truncated {
            needed: 8,
            remaining: 2,
        }
        .into();
        assert!(matches!(
            err,
            ExportError::Truncated {
                needed: 8,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_bad_magic_is_format_error() {
        let err: ExportError = DecodeError::BadMagic {
            expected: "nya mesh".into(),
            found: "RIFF....".into(),
        }
        .into();
        assert!(matches!(err, ExportError::Format(DecodeError::BadMagic { .. })));
    }

    #[test]
    fn test_encode_overflow_is_invariant() {
        let err: ExportError = EncodeError::StringTooLong { len: 70000 }.into();
        assert!(matches!(err, ExportError::ModelInvariant(_)));
        assert!(err.to_string().contains("70000"));
    }
}
