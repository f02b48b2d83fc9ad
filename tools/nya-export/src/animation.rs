//! Animation encoder (-> .nan)

use std::path::Path;

use nya_common::NyaAnimation;

use crate::config::AnimationConfig;
use crate::error::Result;
use crate::formats::write_atomic;

/// Encode an animation with the configured layout.
pub fn encode_animation(anim: &NyaAnimation, config: &AnimationConfig) -> Result<Vec<u8>> {
    let bytes = anim.encode(config.layout)?;
    tracing::debug!(
        "Encoded animation ({:?}): {} curves, {} frames, {} ms, {} bytes",
        config.layout,
        anim.curve_count(),
        anim.frame_count(),
        anim.duration_ms(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode a `.nan` file in either layout.
pub fn decode_animation(bytes: &[u8]) -> Result<NyaAnimation> {
    Ok(NyaAnimation::decode(bytes)?)
}

/// Encode and write a `.nan` file. The target is replaced atomically.
pub fn write_animation_file(
    path: &Path,
    anim: &NyaAnimation,
    config: &AnimationConfig,
) -> Result<()> {
    let bytes = encode_animation(anim, config)?;
    write_atomic(path, &bytes)?;
    tracing::info!(
        "Saved animation {:?}: {} curves, {} ms, {:.1} kb",
        path,
        anim.curve_count(),
        anim.duration_ms(),
        bytes.len() as f32 / 1024.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use glam::{Quat, Vec3};
    use nya_common::{AnimationLayout, ANIM_VERSION_CHUNKED, ANIM_VERSION_FLAT};

    fn clip() -> NyaAnimation {
        let mut anim = NyaAnimation::new();
        anim.add_position_curve("root")
            .key(0, Vec3::ZERO)
            .key(1000, Vec3::new(0.0, 1.0, 0.0));
        anim.add_rotation_curve("root").key(0, Quat::IDENTITY);
        anim.add_scalar_curve("jaw_open").key(500, 0.25);
        anim
    }

    #[test]
    fn test_default_layout_is_flat() {
        let mut anim = NyaAnimation::new();
        anim.add_position_curve("root")
            .key(0, Vec3::ZERO)
            .key(1000, Vec3::new(0.0, 1.0, 0.0));
        let bytes = encode_animation(&anim, &AnimationConfig::default()).unwrap();

        // Version 1, then the position curve count straight after the header
        assert_eq!(&bytes[..8], b"nya anim");
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 1);
        assert_eq!(bytes, anim.encode_flat().unwrap());
        assert_eq!(decode_animation(&bytes).unwrap(), anim);
    }

    #[test]
    fn test_chunked_layout_from_config() {
        let config = AnimationConfig {
            layout: AnimationLayout::Chunked,
        };
        let bytes = encode_animation(&clip(), &config).unwrap();
        assert_eq!(
            NyaAnimation::peek_version(&bytes).unwrap(),
            ANIM_VERSION_CHUNKED
        );
        assert_eq!(decode_animation(&bytes).unwrap(), clip());
    }

    #[test]
    fn test_flat_layout_from_config() {
        let config = AnimationConfig {
            layout: AnimationLayout::Flat,
        };
        let bytes = encode_animation(&clip(), &config).unwrap();
        assert_eq!(NyaAnimation::peek_version(&bytes).unwrap(), ANIM_VERSION_FLAT);
        assert_eq!(decode_animation(&bytes).unwrap(), clip());
    }

    #[test]
    fn test_decode_errors_are_mapped() {
        let bytes = clip().encode_chunked().unwrap();
        assert!(matches!(
            decode_animation(&bytes[..20]),
            Err(ExportError::Truncated { .. })
        ));
        assert!(matches!(
            decode_animation(b"nya meshxxxxxxxx"),
            Err(ExportError::Format(_))
        ));
    }

    #[test]
    fn test_oversize_bone_name_is_invariant() {
        let mut anim = NyaAnimation::new();
        anim.add_scalar_curve(&"x".repeat(70_000)).key(0, 1.0);
        assert!(matches!(
            encode_animation(&anim, &AnimationConfig::default()),
            Err(ExportError::ModelInvariant(_))
        ));
    }

    #[test]
    fn test_write_animation_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.nan");
        write_animation_file(&path, &clip(), &AnimationConfig::default()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"nya anim");
        assert_eq!(decode_animation(&bytes).unwrap(), clip());
    }
}
