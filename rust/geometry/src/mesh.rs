// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::bounds::{Aabb, BoundingSphere};
use nalgebra::{Point3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Take ownership of position and index buffers; normals are left empty
    pub fn from_buffers(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether normals are present for every vertex
    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.positions.is_empty() && self.normals.len() == self.positions.len()
    }

    /// Reverse the winding of every triangle
    pub fn flip_winding(&mut self) {
        self.indices.chunks_exact_mut(3).for_each(|tri| tri.swap(1, 2));
    }

    /// Axis-aligned bounds of all vertices
    #[inline]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_positions(&self.positions)
    }

    /// Sphere around the AABB center enclosing every vertex
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let center = self.bounds()?.center();
        let radius_sq = self
            .positions
            .chunks_exact(3)
            .map(|p| {
                let dx = p[0] as f64 - center[0];
                let dy = p[1] as f64 - center[1];
                let dz = p[2] as f64 - center[2];
                dx * dx + dy * dy + dz * dz
            })
            .fold(0.0f64, f64::max);
        Some(BoundingSphere {
            center,
            radius: radius_sq.sqrt(),
        })
    }

    /// Clear the mesh and give its buffers back to the allocator
    #[inline]
    pub fn clear(&mut self) {
        self.positions = Vec::new();
        self.normals = Vec::new();
        self.indices = Vec::new();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute smooth vertex normals from triangle topology.
///
/// Face normals are accumulated unnormalized, so larger triangles weigh more.
/// Vertices with no usable adjacent face get +Z.
pub fn calculate_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let mut normals = vec![Vector3::<f64>::zeros(); vertex_count];
    let point = |i: usize| {
        Point3::new(
            mesh.positions[i * 3] as f64,
            mesh.positions[i * 3 + 1] as f64,
            mesh.positions[i * 3 + 2] as f64,
        )
    };

    for tri in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = point(i0);
        let normal = (point(i1) - v0).cross(&(point(i2) - v0));

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    let mut out = Vec::with_capacity(vertex_count * 3);
    for normal in normals {
        let normalized = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        out.push(normalized.x as f32);
        out.push(normalized.y as f32);
        out.push(normalized.z as f32);
    }
    mesh.normals = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[rustfmt::skip]
    fn quad() -> Mesh {
        Mesh::from_buffers(
            vec![
                0.0, 0.0, 0.0,
                2.0, 0.0, 0.0,
                2.0, 2.0, 0.0,
                0.0, 2.0, 0.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_none());
        assert!(mesh.bounding_sphere().is_none());
    }

    #[test]
    fn test_calculate_normals_flat_quad() {
        let mut mesh = quad();
        calculate_normals(&mut mesh);
        assert!(mesh.has_normals());
        for n in mesh.normals.chunks_exact(3) {
            assert_relative_eq!(n[0], 0.0);
            assert_relative_eq!(n[1], 0.0);
            assert_relative_eq!(n[2], 1.0);
        }
    }

    #[test]
    fn test_flip_winding_flips_normals() {
        let mut mesh = quad();
        mesh.flip_winding();
        assert_eq!(&mesh.indices[..3], &[0, 2, 1]);
        calculate_normals(&mut mesh);
        assert_relative_eq!(mesh.normals[2], -1.0);
    }

    #[test]
    fn test_degenerate_triangle_gets_default_normal() {
        let mut mesh = Mesh::from_buffers(vec![1.0; 9], vec![0, 1, 2]);
        calculate_normals(&mut mesh);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_bounding_sphere() {
        let sphere = quad().bounding_sphere().unwrap();
        assert_relative_eq!(sphere.center[0], 1.0);
        assert_relative_eq!(sphere.center[1], 1.0);
        assert_relative_eq!(sphere.radius, 2.0f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_clear() {
        let mut mesh = quad();
        calculate_normals(&mut mesh);
        mesh.clear();
        assert!(mesh.is_empty());
        assert!(mesh.normals.is_empty());
        assert!(mesh.indices.is_empty());
    }
}
