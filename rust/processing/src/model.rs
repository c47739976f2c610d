// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded models and their disposable resources.

use ifc_view_core::{Result, ViewerError};
use ifc_view_geometry::{Aabb, GeometryStats, MeshUnit};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Container of every mesh unit of one loaded file
#[derive(Debug, Default)]
pub struct ModelGroup {
    name: String,
    meshes: Vec<MeshUnit>,
    /// owner id -> positions in `meshes`
    owner_index: FxHashMap<u32, Vec<usize>>,
}

impl ModelGroup {
    pub fn new(name: impl Into<String>, meshes: Vec<MeshUnit>) -> Self {
        let mut owner_index: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        for (i, mesh) in meshes.iter().enumerate() {
            owner_index.entry(mesh.owner_id).or_default().push(i);
        }
        Self {
            name: name.into(),
            meshes,
            owner_index,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn meshes(&self) -> &[MeshUnit] {
        &self.meshes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Visit every child mesh in insertion order
    pub fn traverse(&self, mut visit: impl FnMut(&MeshUnit)) {
        self.meshes.iter().for_each(|mesh| visit(mesh));
    }

    /// All meshes placed for one product, for picking and selection
    pub fn meshes_for_owner(&self, owner_id: u32) -> impl Iterator<Item = &MeshUnit> + '_ {
        self.owner_index
            .get(&owner_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.meshes[i])
    }

    /// Number of distinct products with geometry
    pub fn owner_count(&self) -> usize {
        self.owner_index.len()
    }

    /// Dispose every mesh and empty the container; returns how many were released
    fn dispose(&mut self) -> usize {
        let count = self.meshes.len();
        for mesh in &mut self.meshes {
            mesh.dispose();
        }
        self.meshes.clear();
        self.owner_index.clear();
        count
    }
}

/// Immutable facts about a loaded model, computed once at load completion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    /// Unix epoch milliseconds
    pub loaded_at_ms: u64,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// `None` when the model has no meshes
    pub bounds: Option<Aabb>,
    pub stats: GeometryStats,
}

#[derive(Debug)]
enum ModelState {
    Live {
        group: ModelGroup,
        raw_bytes: Vec<u8>,
    },
    Disposed,
}

/// A loaded file: sole owner of its meshes and original bytes
#[derive(Debug)]
pub struct Model {
    metadata: ModelMetadata,
    state: ModelState,
}

impl Model {
    pub(crate) fn new(metadata: ModelMetadata, group: ModelGroup, raw_bytes: Vec<u8>) -> Self {
        Self {
            metadata,
            state: ModelState::Live { group, raw_bytes },
        }
    }

    /// Readable even after [`Model::dispose`]
    #[inline]
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn group(&self) -> Result<&ModelGroup> {
        match &self.state {
            ModelState::Live { group, .. } => Ok(group),
            ModelState::Disposed => Err(self.disposed_access("group")),
        }
    }

    /// Original file bytes, retained for re-export
    pub fn raw_bytes(&self) -> Result<&[u8]> {
        match &self.state {
            ModelState::Live { raw_bytes, .. } => Ok(raw_bytes),
            ModelState::Disposed => Err(self.disposed_access("raw bytes")),
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        matches!(self.state, ModelState::Disposed)
    }

    /// Release every mesh and the retained bytes.
    ///
    /// Returns `false` when the model was already disposed.
    pub fn dispose(&mut self) -> bool {
        match std::mem::replace(&mut self.state, ModelState::Disposed) {
            ModelState::Live {
                mut group,
                raw_bytes,
            } => {
                let released = group.dispose();
                tracing::debug!(
                    model_id = %self.metadata.id,
                    meshes = released,
                    bytes = raw_bytes.len(),
                    "Disposed model"
                );
                true
            }
            ModelState::Disposed => false,
        }
    }

    fn disposed_access(&self, resource: &'static str) -> ViewerError {
        ViewerError::DisposedAccess {
            model_id: self.metadata.id.clone(),
            resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_view_core::RawPart;
    use ifc_view_geometry::convert_part;

    fn unit(owner_id: u32) -> MeshUnit {
        let part = RawPart::new(
            owner_id,
            1,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
        );
        convert_part(part, 0).unwrap().unwrap()
    }

    fn model() -> Model {
        let group = ModelGroup::new("house.ifc", vec![unit(1), unit(2), unit(1)]);
        let metadata = ModelMetadata {
            id: "m-1".into(),
            file_name: "house.ifc".into(),
            file_size: 4,
            loaded_at_ms: 0,
            mesh_count: 3,
            vertex_count: 9,
            triangle_count: 3,
            bounds: None,
            stats: GeometryStats::default(),
        };
        Model::new(metadata, group, b"IFC!".to_vec())
    }

    #[test]
    fn test_owner_lookup() {
        let model = model();
        let group = model.group().unwrap();
        assert_eq!(group.name(), "house.ifc");
        assert_eq!(group.meshes_for_owner(1).count(), 2);
        assert_eq!(group.meshes_for_owner(2).count(), 1);
        assert_eq!(group.meshes_for_owner(99).count(), 0);
        assert_eq!(group.owner_count(), 2);
    }

    #[test]
    fn test_traverse_visits_all() {
        let model = model();
        let mut vertices = 0;
        model.group().unwrap().traverse(|mesh| vertices += mesh.vertex_count());
        assert_eq!(vertices, 9);
    }

    #[test]
    fn test_dispose_guards_resources() {
        let mut model = model();
        assert_eq!(model.raw_bytes().unwrap(), b"IFC!");

        assert!(model.dispose());
        assert!(model.is_disposed());
        assert!(!model.dispose());

        let err = model.group().unwrap_err();
        assert_eq!(err.code(), "DISPOSED_ACCESS");
        assert_eq!(err.context().model_id.as_deref(), Some("m-1"));
        assert!(matches!(
            model.raw_bytes(),
            Err(ViewerError::DisposedAccess {
                resource: "raw bytes",
                ..
            })
        ));

        assert_eq!(model.metadata().mesh_count, 3);
        assert_eq!(model.metadata().file_name, "house.ifc");
    }
}
