//! Binary format definitions for nya asset files
//!
//! Re-exports from nya-common plus the file writer shared by all encoders.

pub use nya_common::formats::*;

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ExportError, Result};

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The target is replaced only once everything is written and flushed; on
/// any error the temporary file is removed and an existing target is left
/// untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| ExportError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| ExportError::io(path, e))?;
    tmp.persist(path).map_err(|e| ExportError::io(path, e.error))?;
    Ok(())
}
