// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned copy of one placed geometry, detached from engine memory.

use crate::engine::IDENTITY_TRANSFORM;

/// Raw buffers of one placement as produced by the decoder binding
#[derive(Debug, Clone, PartialEq)]
pub struct RawPart {
    /// Flat xyz triples in the geometry's local space
    pub positions: Vec<f32>,
    /// Flat triangle indices into `positions`
    pub indices: Vec<u32>,
    /// 4x4 column-major placement matrix
    pub transform: [f64; 16],
    /// RGBA as delivered by the engine (unclamped)
    pub color: [f32; 4],
    /// Product the placement belongs to
    pub owner_id: u32,
    /// Geometry definition id
    pub part_id: u32,
}

impl RawPart {
    /// Untransformed white part, mostly useful for tests and tooling
    pub fn new(owner_id: u32, part_id: u32, positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            transform: IDENTITY_TRANSFORM,
            color: [1.0, 1.0, 1.0, 1.0],
            owner_id,
            part_id,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_transform(mut self, transform: [f64; 16]) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Placeholder parts carry no triangles and are skipped silently.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        !self.positions.is_empty() && !self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderable() {
        let tri = RawPart::new(1, 2, vec![0.0; 9], vec![0, 1, 2]);
        assert!(tri.is_renderable());
        assert_eq!(tri.vertex_count(), 3);

        assert!(!RawPart::new(1, 2, vec![], vec![0, 1, 2]).is_renderable());
        assert!(!RawPart::new(1, 2, vec![0.0; 9], vec![]).is_renderable());
    }
}
