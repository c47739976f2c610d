// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement transforms
//!
//! Placements arrive as flat column-major 4x4 matrices. They are baked into
//! vertex positions at load time, so meshes never carry a separate transform.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3};

/// Build a matrix from 16 column-major values
pub fn matrix_from_column_major(values: &[f64; 16]) -> Result<Matrix4<f64>> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidTransform(format!(
            "non-finite element at index {}",
            pos
        )));
    }
    Ok(Matrix4::from_column_slice(values))
}

/// Whether the linear part of `matrix` mirrors geometry
#[inline]
pub fn is_mirroring(matrix: &Matrix4<f64>) -> bool {
    matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0
}

/// Transform every vertex in place, computing in f64 before narrowing to f32.
///
/// Mirroring transforms also reverse triangle winding so front faces stay front.
pub fn bake_transform(mesh: &mut Mesh, matrix: &Matrix4<f64>) {
    if *matrix == Matrix4::identity() {
        return;
    }

    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let p = matrix.transform_point(&Point3::new(
            chunk[0] as f64,
            chunk[1] as f64,
            chunk[2] as f64,
        ));
        chunk[0] = p.x as f32;
        chunk[1] = p.y as f32;
        chunk[2] = p.z as f32;
    });

    if is_mirroring(matrix) {
        mesh.flip_winding();
    }
}
