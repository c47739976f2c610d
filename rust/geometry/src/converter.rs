// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Converter
//!
//! Turns one [`RawPart`] into zero or one [`MeshUnit`]: validate buffers,
//! bake the placement transform, compute normals and bounds, and derive the
//! material. Batch conversion isolates failures per placement.

use crate::bounds::{Aabb, BoundingSphere};
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::{calculate_normals, Mesh};
use crate::transform::{bake_transform, matrix_from_column_major};
use ifc_view_core::RawPart;
use serde::Serialize;

/// One drawable triangle mesh with baked transform and material
#[derive(Debug, Clone)]
pub struct MeshUnit {
    mesh: Mesh,
    material: Material,
    bounds: Aabb,
    sphere: BoundingSphere,
    /// Product the mesh belongs to, for picking
    pub owner_id: u32,
    /// Geometry definition the mesh was built from
    pub part_id: u32,
    disposed: bool,
}

impl MeshUnit {
    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// World-space bounds, fixed at conversion time
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[inline]
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Free geometry buffers and reset the material. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.mesh.clear();
        self.material = Material::default();
        self.disposed = true;
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Convert a single placement.
///
/// Returns `Ok(None)` for placeholder parts with no positions or no indices.
/// `part_index` is only used for diagnostics.
pub fn convert_part(part: RawPart, part_index: usize) -> Result<Option<MeshUnit>> {
    if !part.is_renderable() {
        tracing::trace!(part_index, owner_id = part.owner_id, "Skipping empty part");
        return Ok(None);
    }

    validate(&part)?;
    let matrix = matrix_from_column_major(&part.transform)?;

    let RawPart {
        positions,
        indices,
        color,
        owner_id,
        part_id,
        ..
    } = part;

    let mut mesh = Mesh::from_buffers(positions, indices);
    bake_transform(&mut mesh, &matrix);
    // Narrowing to f32 can overflow for extreme placements
    if let Some(pos) = mesh.positions.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFinitePosition(pos / 3));
    }
    calculate_normals(&mut mesh);

    // Non-empty and validated, so bounds exist
    let (bounds, sphere) = match (mesh.bounds(), mesh.bounding_sphere()) {
        (Some(bounds), Some(sphere)) => (bounds, sphere),
        _ => return Ok(None),
    };

    Ok(Some(MeshUnit {
        mesh,
        material: Material::from_rgba(color),
        bounds,
        sphere,
        owner_id,
        part_id,
        disposed: false,
    }))
}

fn validate(part: &RawPart) -> Result<()> {
    if part.positions.len() % 3 != 0 {
        return Err(Error::MalformedBuffer {
            buffer: "position",
            len: part.positions.len(),
        });
    }
    if part.indices.len() % 3 != 0 {
        return Err(Error::MalformedBuffer {
            buffer: "index",
            len: part.indices.len(),
        });
    }

    let vertex_count = part.vertex_count();
    if let Some(&index) = part.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    if let Some(pos) = part.positions.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFinitePosition(pos / 3));
    }
    Ok(())
}

/// Per-batch conversion statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryStats {
    /// Placements seen
    pub placements: usize,
    /// Placements that produced a mesh unit
    pub converted: usize,
    /// Placeholder placements without triangles
    pub empty: usize,
    /// Placements that failed to extract or convert
    pub failed: usize,
}

impl GeometryStats {
    /// Placements that produced nothing
    #[inline]
    pub fn skipped(&self) -> usize {
        self.empty + self.failed
    }
}

/// A placement that failed conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionFailure {
    pub part_index: usize,
    pub owner_id: u32,
    pub part_id: u32,
    pub error: Error,
}

/// Output of [`convert_parts`]
#[derive(Debug, Default)]
pub struct ConversionBatch {
    pub meshes: Vec<MeshUnit>,
    pub failures: Vec<ConversionFailure>,
    pub stats: GeometryStats,
}

/// Convert every part, logging and skipping the ones that fail.
pub fn convert_parts(parts: impl IntoIterator<Item = RawPart>) -> ConversionBatch {
    let mut batch = ConversionBatch::default();

    for (part_index, part) in parts.into_iter().enumerate() {
        batch.stats.placements += 1;
        let (owner_id, part_id) = (part.owner_id, part.part_id);

        match convert_part(part, part_index) {
            Ok(Some(unit)) => {
                batch.stats.converted += 1;
                batch.meshes.push(unit);
            }
            Ok(None) => batch.stats.empty += 1,
            Err(error) => {
                tracing::warn!(
                    part_index,
                    owner_id,
                    part_id,
                    error = %error,
                    "Failed to convert placement, skipping"
                );
                batch.stats.failed += 1;
                batch.failures.push(ConversionFailure {
                    part_index,
                    owner_id,
                    part_id,
                    error,
                });
            }
        }
    }

    if batch.stats.failed > 0 {
        tracing::warn!(
            converted = batch.stats.converted,
            placements = batch.stats.placements,
            empty = batch.stats.empty,
            failed = batch.stats.failed,
            "Geometry conversion finished with failures"
        );
    } else {
        tracing::debug!(
            converted = batch.stats.converted,
            placements = batch.stats.placements,
            empty = batch.stats.empty,
            "Geometry conversion finished"
        );
    }

    batch
}
