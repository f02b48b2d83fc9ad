//! nya animation format (.nan)
//!
//! Keyframe curves per bone, stored verbatim (no resampling, no compression).
//! Three curve kinds exist, all linearly interpolated by the engine:
//! position (vec3), rotation (quaternion) and scalar (f32).
//!
//! # Layouts
//!
//! Version 2, chunked (opt-in):
//! ```text
//! "nya anim" | version u32 = 2 | chunk_count u32
//! chunk type 0: position curves
//! chunk type 1: rotation curves
//! chunk type 2: scalar curves
//! ```
//!
//! Version 1, flat (default, what the engine loader reads):
//! ```text
//! "nya anim" | version u32 = 1
//! position curves | rotation curves | scalar curves
//! ```
//!
//! A curve section is the same in both layouts:
//! ```text
//! curve_count u32
//! curve_count × {
//!     bone_name string
//!     frame_count u32
//!     frame_count × { time_ms u32, value [f32; 3 | 4 | 1] }
//! }
//! ```

mod encoding;
mod types;


// Re-export public API
pub use encoding::Keyframe;
pub use types::{
    AnimationLayout, Curve, NyaAnimation, PositionKey, RotationKey, ScalarKey,
    ANIM_VERSION_CHUNKED, ANIM_VERSION_FLAT, CHUNK_POSITION_CURVES, CHUNK_ROTATION_CURVES,
    CHUNK_SCALAR_CURVES,
};
