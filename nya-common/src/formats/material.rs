//! Materials chunk (type 2) of a `.nms` container
//!
//! # Layout
//! ```text
//! material_count u16
//! material_count × {
//!     name string
//!     texture_count u16, texture_count × { slot string, file string }
//!     param_count u16,   param_count × { name string, value string }
//!     vec_param_count u16, vec_param_count × { name string, x y z w f32 }
//!     int_param_count u16   (always 0, reserved)
//! }
//! ```

use super::{BinReader, BinWriter, ChunkPayload, DecodeError, EncodeError};

/// Chunk type of the materials section
pub const CHUNK_MATERIALS: u32 = 2;

/// Texture bound to a named material slot (e.g. "diffuse")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub slot: String,
    pub file: String,
}

/// Free-form string parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringParam {
    pub name: String,
    pub value: String,
}

/// Four-component parameter; unused components stay 0
#[derive(Debug, Clone, PartialEq)]
pub struct VectorParam {
    pub name: String,
    pub value: [f32; 4],
}

/// Material identified by name within one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub textures: Vec<TextureSlot>,
    pub params: Vec<StringParam>,
    pub vec_params: Vec<VectorParam>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_texture(&mut self, slot: impl Into<String>, file: impl Into<String>) {
        self.textures.push(TextureSlot {
            slot: slot.into(),
            file: file.into(),
        });
    }

    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push(StringParam {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Add a vector parameter from 0..=4 components, zero-filling the rest
    pub fn add_vec_param(&mut self, name: impl Into<String>, components: &[f32]) {
        let mut value = [0.0; 4];
        for (dst, src) in value.iter_mut().zip(components) {
            *dst = *src;
        }
        self.vec_params.push(VectorParam {
            name: name.into(),
            value,
        });
    }
}

impl ChunkPayload for Vec<Material> {
    const CHUNK_TYPE: u32 = CHUNK_MATERIALS;

    fn write_payload(&self, w: &mut BinWriter) -> Result<(), EncodeError> {
        w.write_u16(EncodeError::check_u16("materials", self.len())?);
        for m in self {
            w.write_string(&m.name)?;

            w.write_u16(EncodeError::check_u16("textures", m.textures.len())?);
            for t in &m.textures {
                w.write_string(&t.slot)?;
                w.write_string(&t.file)?;
            }

            w.write_u16(EncodeError::check_u16("params", m.params.len())?);
            for p in &m.params {
                w.write_string(&p.name)?;
                w.write_string(&p.value)?;
            }

            w.write_u16(EncodeError::check_u16("vector params", m.vec_params.len())?);
            for p in &m.vec_params {
                w.write_string(&p.name)?;
                w.write_f32_slice(&p.value);
            }

            // Integer params are reserved
            w.write_u16(0);
        }
        Ok(())
    }

    fn read_payload(r: &mut BinReader<'_>) -> Result<Self, DecodeError> {
        let count = r.read_u16()? as usize;
        let mut materials = Vec::with_capacity(count);
        for _ in 0..count {
            let mut m = Material::new(r.read_string()?);

            let textures = r.read_u16()?;
            for _ in 0..textures {
                let slot = r.read_string()?;
                let file = r.read_string()?;
                m.textures.push(TextureSlot { slot, file });
            }

            let params = r.read_u16()?;
            for _ in 0..params {
                let name = r.read_string()?;
                let value = r.read_string()?;
                m.params.push(StringParam { name, value });
            }

            let vec_params = r.read_u16()?;
            for _ in 0..vec_params {
                let name = r.read_string()?;
                let value = [r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?];
                m.vec_params.push(VectorParam { name, value });
            }

            // Skip reserved integer params (name string + i32 each)
            let int_params = r.read_u16()?;
            for _ in 0..int_params {
                r.read_string()?;
                r.read_i32()?;
            }

            materials.push(m);
        }
        Ok(materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wood() -> Material {
        let mut m = Material::new("wood");
        m.add_texture("diffuse", "wood.png");
        m.add_param("nya_material", "default.txt");
        m.add_vec_param("Kd", &[0.5, 0.25, 0.125]);
        m
    }

    #[test]
    fn test_vec_param_zero_fill() {
        let m = wood();
        assert_eq!(m.vec_params[0].value, [0.5, 0.25, 0.125, 0.0]);
    }

    #[test]
    fn test_empty_material_layout() {
        let chunk = vec![Material::new("a")].to_chunk().unwrap();
        assert_eq!(chunk.chunk_type, 2);
        assert_eq!(
            chunk.payload,
            vec![
                1, 0, // material count
                1, 0, b'a', // name
                0, 0, // textures
                0, 0, // params
                0, 0, // vec params
                0, 0, // int params (reserved)
            ]
        );
    }

    #[test]
    fn test_materials_chunk_roundtrip() {
        let materials = vec![wood(), Material::new("steel")];
        let chunk = materials.to_chunk().unwrap();
        assert_eq!(Vec::<Material>::from_chunk(&chunk).unwrap(), materials);
    }
}
