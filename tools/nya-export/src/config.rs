//! Export configuration (nya-export.toml)
//!
//! Every field is optional; a missing file section uses the defaults below.
//!
//! ```toml
//! [mesh]
//! pack_second_uv_channel = true
//! container_version = 1
//!
//! [animation]
//! layout = "flat"      # opt in to the chunked container with "chunked"
//! ```
//!
//! Engine loaders only read the flat (version 1) animation layout, so that
//! stays the default.

use std::path::Path;

use nya_common::AnimationLayout;
use serde::Deserialize;

use crate::error::{ExportError, Result};

/// Default mesh container version
pub const DEFAULT_MESH_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// Mesh encoder options
#[derive(Debug, Clone, Deserialize)]
pub struct MeshConfig {
    /// Pack the second UV channel into the zw components of the first
    /// texcoord attribute instead of emitting a separate `tc1` attribute.
    /// Default: true
    #[serde(default = "default_pack_second_uv_channel")]
    pub pack_second_uv_channel: bool,

    /// Version written in the `.nms` container header.
    /// Default: 1
    #[serde(default = "default_mesh_version")]
    pub container_version: u32,
}

fn default_pack_second_uv_channel() -> bool {
    true
}

fn default_mesh_version() -> u32 {
    DEFAULT_MESH_VERSION
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            pack_second_uv_channel: default_pack_second_uv_channel(),
            container_version: default_mesh_version(),
        }
    }
}

/// Animation encoder options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationConfig {
    /// Default: flat
    #[serde(default)]
    pub layout: AnimationLayout,
}

impl ExportConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        Self::parse(&content)
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ExportConfig::parse("").unwrap();
        assert!(config.mesh.pack_second_uv_channel);
        assert_eq!(config.mesh.container_version, 1);
        assert_eq!(config.animation.layout, AnimationLayout::Flat);
    }

    #[test]
    fn test_parse_full_config() {
        let config = ExportConfig::parse(
            r#"
            [mesh]
            pack_second_uv_channel = false
            container_version = 2

            [animation]
            layout = "chunked"
            "#,
        )
        .unwrap();
        assert!(!config.mesh.pack_second_uv_channel);
        assert_eq!(config.mesh.container_version, 2);
        assert_eq!(config.animation.layout, AnimationLayout::Chunked);
    }

    #[test]
    fn test_partial_section() {
        let config = ExportConfig::parse("[mesh]\ncontainer_version = 3\n").unwrap();
        assert!(config.mesh.pack_second_uv_channel);
        assert_eq!(config.mesh.container_version, 3);
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let err = ExportConfig::parse("[animation]\nlayout = \"zip\"\n").unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ExportConfig::load(Path::new("/nonexistent/nya-export.toml")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
