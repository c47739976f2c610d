// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-View Geometry
//!
//! Converts raw placements copied out of the decoder into renderable mesh
//! units, using nalgebra for transformations.

pub mod bounds;
pub mod converter;
pub mod error;
pub mod material;
pub mod mesh;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use bounds::{Aabb, BoundingSphere};
pub use converter::{
    convert_part, convert_parts, ConversionBatch, ConversionFailure, GeometryStats, MeshUnit,
};
pub use error::{Error, Result};
pub use material::{Material, OPAQUE_ALPHA_THRESHOLD};
pub use mesh::{calculate_normals, Mesh};
pub use transform::{bake_transform, is_mirroring, matrix_from_column_major};
