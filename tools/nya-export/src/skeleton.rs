//! Skeleton ordering
//!
//! The encoded skeleton lists joints parent-before-child so a loader can
//! compute world transforms in a single forward pass. Extraction code appends
//! joints in whatever order the scene graph yields them; [`MeshModel::sort_joints`]
//! fixes that up.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nya_common::formats::SEMANTIC_BONE_INDICES;

use crate::error::{ExportError, Result};
use crate::mesh::MeshModel;

impl MeshModel {
    /// Index of the joint called `name`. Empty names never match.
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.joints.iter().position(|j| j.name == name)
    }

    /// Reorder joints so every parent precedes its children, rewriting each
    /// `parent` to the new positions.
    ///
    /// Among joints whose parent is already placed, the one earliest in the
    /// input goes first. Roots therefore keep their relative order and an
    /// already-sorted list is left untouched.
    ///
    /// Returns the old-to-new position map, for remapping skin bone indices.
    pub fn sort_joints(&mut self) -> Result<Vec<usize>> {
        let n = self.joints.len();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut ready = BinaryHeap::new();
        for (i, joint) in self.joints.iter().enumerate() {
            match joint.parent {
                -1 => ready.push(Reverse(i)),
                p if p >= 0 && (p as usize) < n => children[p as usize].push(i),
                p => {
                    return Err(ExportError::invariant(format!(
                        "joint '{}' has parent index {} outside -1..{}",
                        joint.name, p, n
                    )))
                }
            }
        }

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            ready.extend(children[i].iter().map(|&c| Reverse(c)));
        }

        if order.len() < n {
            return Err(self.cycle_error(&order));
        }

        let mut new_pos = vec![0usize; n];
        for (new, &old) in order.iter().enumerate() {
            new_pos[old] = new;
        }

        let mut joints: Vec<_> = std::mem::take(&mut self.joints)
            .into_iter()
            .enumerate()
            .map(|(old, mut joint)| {
                if joint.parent >= 0 {
                    joint.parent = new_pos[joint.parent as usize] as i32;
                }
                (new_pos[old], joint)
            })
            .collect();
        joints.sort_unstable_by_key(|(pos, _)| *pos);
        self.joints = joints.into_iter().map(|(_, joint)| joint).collect();

        let moved = new_pos.iter().enumerate().filter(|(old, new)| old != *new).count();
        tracing::debug!("Sorted {} joints ({} moved)", n, moved);

        Ok(new_pos)
    }

    /// Sort the skeleton and rewrite the bone index columns of every vertex to
    /// match. Use this on a model whose rows already reference joints.
    pub fn sort_skeleton(&mut self) -> Result<()> {
        let map = self.sort_joints()?;
        if map.iter().enumerate().all(|(old, &new)| old == new) {
            return Ok(());
        }
        self.remap_bone_indices(&map)
    }

    /// Replace every bone index `i` in the vertex data with `map[i]`.
    pub fn remap_bone_indices(&mut self, map: &[usize]) -> Result<()> {
        let stride = self.stride();
        if stride == 0 || self.vertex_count == 0 {
            return Ok(());
        }

        let mut offset = 0;
        let mut columns = Vec::new();
        for a in &self.attributes {
            if a.semantic == SEMANTIC_BONE_INDICES {
                columns.extend(offset..offset + a.dimension as usize);
            }
            offset += a.dimension as usize;
        }
        if columns.is_empty() {
            return Ok(());
        }

        for row in self.vertex_data.chunks_exact_mut(stride) {
            for &c in &columns {
                let old = row[c] as usize;
                let new = map.get(old).ok_or_else(|| {
                    ExportError::invariant(format!(
                        "bone index {} outside skeleton of {} joints",
                        row[c],
                        map.len()
                    ))
                })?;
                row[c] = *new as f32;
            }
        }
        Ok(())
    }

    /// Joints left unplaced never reach a root. Walk up from the first one
    /// until a joint repeats; that joint sits on the cycle.
    fn cycle_error(&self, placed_order: &[usize]) -> ExportError {
        let mut placed = vec![false; self.joints.len()];
        for &i in placed_order {
            placed[i] = true;
        }

        let mut seen = vec![false; self.joints.len()];
        let mut current = placed.iter().position(|&p| !p).unwrap_or(0);
        while !seen[current] {
            seen[current] = true;
            current = self.joints[current].parent as usize;
        }

        ExportError::CyclicSkeleton {
            joint: self.joints[current].name.clone(),
        }
    }
}
