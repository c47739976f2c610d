// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial bounds of meshes and whole models, in f64 precision.

use serde::Serialize;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    /// Degenerate box around a single point
    #[inline]
    pub fn from_point(x: f64, y: f64, z: f64) -> Self {
        Self {
            min: [x, y, z],
            max: [x, y, z],
        }
    }

    /// Bounds of a flat xyz buffer; `None` when the buffer holds no vertex
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut chunks = positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut bounds = Self::from_point(first[0] as f64, first[1] as f64, first[2] as f64);
        for chunk in chunks {
            bounds.expand(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        }
        Some(bounds)
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.min[2] = self.min[2].min(z);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
        self.max[2] = self.max[2].max(z);
    }

    /// Smallest box containing both
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut merged = *self;
        merged.expand(other.min[0], other.min[1], other.min[2]);
        merged.expand(other.max[0], other.max[1], other.max[2]);
        merged
    }

    #[inline]
    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Extent along each axis
    #[inline]
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Union of every box in the iterator; `None` when it is empty
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Aabb> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<Aabb>, b| match acc {
                Some(acc) => Some(acc.union(b)),
                None => Some(*b),
            })
    }
}

/// Bounding sphere, used by the renderer for culling
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingSphere {
    pub center: [f64; 3],
    pub radius: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_positions() {
        assert!(Aabb::from_positions(&[]).is_none());
        assert!(Aabb::from_positions(&[1.0, 2.0]).is_none());

        let bounds = Aabb::from_positions(&[1.0, -2.0, 3.0, -1.0, 4.0, 0.5]).unwrap();
        assert_eq!(bounds.min, [-1.0, -2.0, 0.5]);
        assert_eq!(bounds.max, [1.0, 4.0, 3.0]);
        assert_eq!(bounds.size(), [2.0, 6.0, 2.5]);
    }

    #[test]
    fn test_union_all() {
        let a = Aabb::from_point(0.0, 0.0, 0.0);
        let b = Aabb {
            min: [5.0, -1.0, 2.0],
            max: [6.0, 1.0, 3.0],
        };
        let merged = Aabb::union_all([&a, &b]).unwrap();
        assert_eq!(merged.min, [0.0, -1.0, 0.0]);
        assert_eq!(merged.max, [6.0, 1.0, 3.0]);
        assert_eq!(merged.center(), [3.0, 0.0, 1.5]);

        assert!(Aabb::union_all(std::iter::empty()).is_none());
    }
}
