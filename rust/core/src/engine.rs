// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Foreign engine seam
//!
//! The decoding engine lives outside this crate (a WASM module in the browser).
//! These traits describe the narrow surface the binding needs from it:
//! an asynchronous one-shot bootstrap and synchronous per-document calls.

use crate::error::EngineError;
use futures_util::future::LocalBoxFuture;
use std::fmt;
use std::ops::Deref;

/// Column-major identity matrix
#[rustfmt::skip]
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Opaque handle of a document opened in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One positioned instance of a geometry definition
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGeometry {
    /// Engine id of the geometry definition
    pub geometry_id: u32,
    /// RGBA, not guaranteed to be within [0, 1]
    pub color: [f32; 4],
    /// 4x4 column-major placement matrix
    pub transform: [f64; 16],
}

impl PlacedGeometry {
    /// Placement with identity transform and opaque white color
    pub fn new(geometry_id: u32) -> Self {
        Self {
            geometry_id,
            color: [1.0, 1.0, 1.0, 1.0],
            transform: IDENTITY_TRANSFORM,
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
}

/// A logical part of the document and all of its placements
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMesh {
    /// Id of the owning product (wall, slab, ...)
    pub owner_id: u32,
    pub placements: Vec<PlacedGeometry>,
}

/// Geometry object backed by engine-owned memory.
///
/// Copy-out accessors return owned buffers. `release` frees the native side
/// and must be called exactly once; wrap values in [`GeometryGuard`] rather
/// than calling it by hand.
pub trait NativeGeometry {
    /// Flat xyz triples
    fn positions(&self) -> Result<Vec<f32>, EngineError>;
    /// Flat triangle indices
    fn indices(&self) -> Result<Vec<u32>, EngineError>;
    fn release(&mut self);
}

/// Synchronous per-document surface of the engine
pub trait DecoderEngine {
    type Geometry: NativeGeometry;

    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError>;

    fn close_model(&mut self, handle: ModelHandle);

    /// Every part that has at least one placed geometry
    fn flat_meshes(&mut self, handle: ModelHandle) -> Result<Vec<FlatMesh>, EngineError>;

    fn geometry(
        &mut self,
        handle: ModelHandle,
        geometry_id: u32,
    ) -> Result<Self::Geometry, EngineError>;
}

/// One-shot asynchronous bootstrap of the engine from a module location
pub trait EngineLoader {
    type Engine: DecoderEngine;

    fn load<'a>(&'a self, location: &'a str)
        -> LocalBoxFuture<'a, Result<Self::Engine, EngineError>>;
}

/// Releases the wrapped native geometry when dropped.
pub struct GeometryGuard<G: NativeGeometry> {
    geometry: G,
}

impl<G: NativeGeometry> GeometryGuard<G> {
    pub fn new(geometry: G) -> Self {
        Self { geometry }
    }
}

impl<G: NativeGeometry> Deref for GeometryGuard<G> {
    type Target = G;

    fn deref(&self) -> &G {
        &self.geometry
    }
}

impl<G: NativeGeometry> Drop for GeometryGuard<G> {
    fn drop(&mut self) {
        self.geometry.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        released: Rc<Cell<usize>>,
        fail: bool,
    }

    impl NativeGeometry for Counting {
        fn positions(&self) -> Result<Vec<f32>, EngineError> {
            if self.fail {
                return Err(EngineError::Geometry {
                    geometry_id: 1,
                    reason: "bad vertex buffer".into(),
                });
            }
            Ok(vec![0.0; 9])
        }

        fn indices(&self) -> Result<Vec<u32>, EngineError> {
            Ok(vec![0, 1, 2])
        }

        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn copy_out(geometry: Counting) -> Result<usize, EngineError> {
        let guard = GeometryGuard::new(geometry);
        let positions = guard.positions()?;
        Ok(positions.len())
    }

    #[test]
    fn test_guard_releases_on_success() {
        let released = Rc::new(Cell::new(0));
        let len = copy_out(Counting {
            released: released.clone(),
            fail: false,
        })
        .unwrap();
        assert_eq!(len, 9);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_guard_releases_on_early_return() {
        let released = Rc::new(Cell::new(0));
        assert!(copy_out(Counting {
            released: released.clone(),
            fail: true,
        })
        .is_err());
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_placement_builder() {
        let placed = PlacedGeometry::new(7).with_color([0.5, 0.5, 0.5, 0.3]);
        assert_eq!(placed.geometry_id, 7);
        assert_eq!(placed.transform, IDENTITY_TRANSFORM);
        assert_eq!(placed.color[3], 0.3);
    }
}
