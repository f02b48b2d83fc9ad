//! Vertex deduplication

use hashbrown::HashMap;

use super::model::MeshModel;
use crate::error::{ExportError, Result};

impl MeshModel {
    /// Collapse bit-identical vertices and produce an index list.
    ///
    /// Two vertices are merged only when every float matches bit for bit, so
    /// `0.0` and `-0.0` stay distinct and NaNs with equal bits merge. Unique
    /// vertices keep their first-occurrence order.
    ///
    /// Does nothing when indices already exist or there are no vertices.
    pub fn build_indices(&mut self) -> Result<()> {
        if self.indices.is_some() || self.vertex_count == 0 {
            return Ok(());
        }

        if self.vertex_data.len() % self.vertex_count != 0 {
            return Err(ExportError::invariant(format!(
                "{} vertex floats is not a multiple of vertex count {}",
                self.vertex_data.len(),
                self.vertex_count
            )));
        }
        let stride = self.vertex_data.len() / self.vertex_count;
        if stride == 0 {
            return Err(ExportError::invariant(format!(
                "{} vertices with no vertex data",
                self.vertex_count
            )));
        }
        if u32::try_from(self.vertex_count).is_err() {
            return Err(ExportError::invariant(format!(
                "{} vertices exceed the 32-bit index range",
                self.vertex_count
            )));
        }

        let mut unique: Vec<f32> = Vec::with_capacity(self.vertex_data.len());
        let mut indices = Vec::with_capacity(self.vertex_count);
        let mut seen: HashMap<Vec<u32>, u32> = HashMap::with_capacity(self.vertex_count);

        for row in self.vertex_data.chunks_exact(stride) {
            let key: Vec<u32> = row.iter().map(|f| f.to_bits()).collect();
            let next = (unique.len() / stride) as u32;
            let index = *seen.entry(key).or_insert_with(|| {
                unique.extend_from_slice(row);
                next
            });
            indices.push(index);
        }

        let before = self.vertex_count;
        self.vertex_count = unique.len() / stride;
        self.vertex_data = unique;
        self.indices = Some(indices);

        tracing::debug!(
            "Deduplicated {} vertices to {} ({} indices)",
            before,
            self.vertex_count,
            before
        );
        Ok(())
    }
}
