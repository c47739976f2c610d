// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model Assembly
//!
//! Groups converted meshes under one container and computes the model's
//! metadata exactly once.

use crate::model::{Model, ModelGroup, ModelMetadata};
use ifc_view_geometry::{Aabb, GeometryStats, MeshUnit};

/// Build a [`Model`] from converted meshes and the original file bytes.
pub fn assemble_model(
    file_name: &str,
    raw_bytes: Vec<u8>,
    meshes: Vec<MeshUnit>,
    stats: GeometryStats,
) -> Model {
    let loaded_at_ms = now_millis();
    let metadata = ModelMetadata {
        id: generate_model_id(loaded_at_ms),
        file_name: file_name.to_string(),
        file_size: raw_bytes.len() as u64,
        loaded_at_ms,
        mesh_count: meshes.len(),
        vertex_count: meshes.iter().map(MeshUnit::vertex_count).sum(),
        triangle_count: meshes.iter().map(MeshUnit::triangle_count).sum(),
        bounds: Aabb::union_all(meshes.iter().map(MeshUnit::bounds)),
        stats,
    };

    tracing::debug!(
        model_id = %metadata.id,
        meshes = metadata.mesh_count,
        vertices = metadata.vertex_count,
        "Assembled model"
    );

    Model::new(metadata, ModelGroup::new(file_name, meshes), raw_bytes)
}

/// Time-based id with a random suffix, unique within a session
pub fn generate_model_id(timestamp_ms: u64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp_ms, &suffix[..8])
}

/// Milliseconds since the Unix epoch
pub(crate) fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
